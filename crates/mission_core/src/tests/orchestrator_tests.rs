use super::{spawn_orchestrator, MissionError, MissionSnapshot, OrchestratorOptions};
use crate::state::MissionState;

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use analysis_integration::{AnalysisService, MissingAnalysisService};
use async_trait::async_trait;
use registry::CityRegistry;
use shared::{
    domain::{AppMode, CityId, CityRecord, Intervention},
    error::AnalysisError,
    protocol::{AnalysisResult, RequestContext},
};
use tokio::{
    sync::watch,
    time::{sleep, timeout},
};

type Reply = (Duration, Result<String, AnalysisError>);

/// Answers call `n` with `script[n]`, repeating the last entry once the
/// script runs out.
struct ScriptedService {
    calls: AtomicUsize,
    script: Vec<Reply>,
    seen: Mutex<Vec<(RequestContext, CityId)>>,
}

impl ScriptedService {
    fn new(script: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            script,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn seen(&self) -> Vec<(RequestContext, CityId)> {
        self.seen.lock().expect("seen lock").clone()
    }
}

#[async_trait]
impl AnalysisService for ScriptedService {
    async fn analyze(
        &self,
        context: &RequestContext,
        baseline: &CityRecord,
    ) -> Result<String, AnalysisError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .expect("seen lock")
            .push((context.clone(), baseline.id.clone()));
        let (delay, reply) = self
            .script
            .get(index)
            .or_else(|| self.script.last())
            .cloned()
            .expect("non-empty script");
        sleep(delay).await;
        reply
    }
}

fn payload(title: &str) -> String {
    serde_json::json!({
        "ui_text": { "title": title, "narrative": "Particulates everywhere." },
        "analysis": { "key_drivers": ["traffic"], "health_impact": "Severe" }
    })
    .to_string()
}

fn quick(title: &str) -> Reply {
    (Duration::from_millis(10), Ok(payload(title)))
}

fn mission_state() -> MissionState {
    MissionState::new(Arc::new(CityRegistry::builtin()), CityId::from("delhi"))
}

fn options(analyze_on_start: bool) -> OrchestratorOptions {
    OrchestratorOptions {
        debounce: Duration::from_millis(600),
        reference_city: CityId::from("north_pole"),
        analyze_on_start,
    }
}

async fn wait_for(
    rx: &mut watch::Receiver<MissionSnapshot>,
    done: impl FnMut(&MissionSnapshot) -> bool,
) -> MissionSnapshot {
    timeout(Duration::from_secs(30), rx.wait_for(done))
        .await
        .expect("snapshot condition timed out")
        .expect("orchestrator alive")
        .clone()
}

#[tokio::test(start_paused = true)]
async fn burst_of_changes_produces_single_request_with_final_state() {
    let service = ScriptedService::new(vec![quick("final")]);
    let (handle, _task) =
        spawn_orchestrator(mission_state(), service.clone(), options(false)).expect("spawn");

    for query in ["q1", "q2", "q3", "q4", "q5"] {
        handle.set_custom_query(query).await.expect("send");
        sleep(Duration::from_millis(20)).await;
    }
    sleep(Duration::from_secs(3)).await;

    assert_eq!(service.calls(), 1);
    let seen = service.seen();
    assert_eq!(seen[0].0.custom_query.as_deref(), Some("q5"));
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.request_token, 1);
    assert_eq!(snapshot.applied_token, Some(1));
    assert_eq!(snapshot.result.map(|r| r.title), Some("final".to_string()));
}

#[tokio::test(start_paused = true)]
async fn initial_analysis_runs_after_debounce_when_enabled() {
    let service = ScriptedService::new(vec![quick("welcome")]);
    let (handle, _task) =
        spawn_orchestrator(mission_state(), service.clone(), options(true)).expect("spawn");
    let mut rx = handle.subscribe();

    sleep(Duration::from_millis(500)).await;
    assert_eq!(service.calls(), 0);

    let snapshot = wait_for(&mut rx, |s| s.applied_token == Some(1)).await;
    assert_eq!(snapshot.mode, AppMode::GlobalOverview);
    assert!(snapshot.updated_at.is_some());
    assert_eq!(service.seen()[0].1.as_str(), "north_pole");
}

#[tokio::test(start_paused = true)]
async fn no_request_without_changes_when_initial_analysis_disabled() {
    let service = ScriptedService::new(vec![quick("unused")]);
    let (handle, _task) =
        spawn_orchestrator(mission_state(), service.clone(), options(false)).expect("spawn");

    // Re-selecting the current primary is not a change.
    handle
        .activate_primary(CityId::from("delhi"))
        .await
        .expect("send");
    sleep(Duration::from_secs(5)).await;

    assert_eq!(service.calls(), 0);
    assert_eq!(handle.snapshot().request_token, 0);
}

#[tokio::test(start_paused = true)]
async fn late_result_of_superseded_request_is_discarded() {
    let service = ScriptedService::new(vec![
        (Duration::from_millis(2_000), Ok(payload("first"))),
        quick("second"),
    ]);
    let (handle, _task) =
        spawn_orchestrator(mission_state(), service.clone(), options(true)).expect("spawn");
    let mut rx = handle.subscribe();

    // Token 1 goes out at 600ms and resolves at 2600ms.
    sleep(Duration::from_millis(700)).await;
    assert!(handle.snapshot().loading);
    handle.set_mode(AppMode::CityDeepDive).await.expect("send");

    let applied = wait_for(&mut rx, |s| s.applied_token == Some(2)).await;
    assert_eq!(applied.result.map(|r| r.title), Some("second".to_string()));
    assert!(!applied.loading);

    sleep(Duration::from_secs(5)).await;
    let snapshot = handle.snapshot();
    assert_eq!(service.calls(), 2);
    assert_eq!(snapshot.applied_token, Some(2));
    assert_eq!(snapshot.result.map(|r| r.title), Some("second".to_string()));
    assert!(!snapshot.loading);
}

#[tokio::test(start_paused = true)]
async fn stale_result_does_not_clear_loading() {
    let service = ScriptedService::new(vec![
        (Duration::from_millis(2_000), Ok(payload("first"))),
        (Duration::from_millis(3_000), Ok(payload("second"))),
    ]);
    let (handle, _task) =
        spawn_orchestrator(mission_state(), service.clone(), options(true)).expect("spawn");

    sleep(Duration::from_millis(700)).await;
    handle.set_mode(AppMode::CityDeepDive).await.expect("send");

    // Token 1 resolved at 2600ms; token 2 is outstanding until 4300ms.
    sleep(Duration::from_millis(2_300)).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.request_token, 2);
    assert!(snapshot.loading);
    assert_eq!(snapshot.result, None);
    assert_eq!(snapshot.applied_token, None);

    sleep(Duration::from_millis(2_000)).await;
    let snapshot = handle.snapshot();
    assert!(!snapshot.loading);
    assert_eq!(snapshot.applied_token, Some(2));
}

#[tokio::test(start_paused = true)]
async fn loading_tracks_outstanding_request_only() {
    let service = ScriptedService::new(vec![(Duration::from_millis(500), Ok(payload("done")))]);
    let (handle, _task) =
        spawn_orchestrator(mission_state(), service.clone(), options(false)).expect("spawn");
    let mut rx = handle.subscribe();

    handle.set_mode(AppMode::CityDeepDive).await.expect("send");
    sleep(Duration::from_millis(100)).await;
    let pending = handle.snapshot();
    assert_eq!(pending.mode, AppMode::CityDeepDive);
    assert!(!pending.loading);
    assert_eq!(pending.request_token, 0);

    sleep(Duration::from_millis(600)).await;
    let in_flight = handle.snapshot();
    assert!(in_flight.loading);
    assert_eq!(in_flight.request_token, 1);

    let done = wait_for(&mut rx, |s| !s.loading && s.applied_token.is_some()).await;
    assert_eq!(done.result.map(|r| r.title), Some("done".to_string()));
}

#[tokio::test(start_paused = true)]
async fn malformed_payload_resolves_to_fallback() {
    let missing_health_impact = serde_json::json!({
        "ui_text": { "title": "Half", "narrative": "Only half a payload." },
        "analysis": { "key_drivers": [] }
    })
    .to_string();
    let service = ScriptedService::new(vec![(
        Duration::from_millis(10),
        Ok(missing_health_impact),
    )]);
    let (handle, _task) =
        spawn_orchestrator(mission_state(), service, options(true)).expect("spawn");
    let mut rx = handle.subscribe();

    let snapshot = wait_for(&mut rx, |s| s.applied_token == Some(1)).await;
    assert_eq!(snapshot.result, Some(AnalysisResult::fallback()));
    assert!(!snapshot.loading);
}

#[tokio::test(start_paused = true)]
async fn transport_failure_resolves_to_fallback() {
    let service = ScriptedService::new(vec![(
        Duration::from_millis(10),
        Err(AnalysisError::Transport("connection reset".to_string())),
    )]);
    let (handle, _task) =
        spawn_orchestrator(mission_state(), service, options(true)).expect("spawn");
    let mut rx = handle.subscribe();

    let snapshot = wait_for(&mut rx, |s| s.applied_token == Some(1)).await;
    assert_eq!(snapshot.result, Some(AnalysisResult::fallback()));
}

#[tokio::test(start_paused = true)]
async fn missing_service_resolves_to_fallback() {
    let (handle, _task) = spawn_orchestrator(
        mission_state(),
        Arc::new(MissingAnalysisService),
        options(true),
    )
    .expect("spawn");
    let mut rx = handle.subscribe();

    let snapshot = wait_for(&mut rx, |s| s.applied_token == Some(1)).await;
    assert_eq!(snapshot.result, Some(AnalysisResult::fallback()));
}

#[tokio::test(start_paused = true)]
async fn interventions_travel_only_in_scenario_mode() {
    let service = ScriptedService::new(vec![quick("scenario")]);
    let (handle, _task) =
        spawn_orchestrator(mission_state(), service.clone(), options(false)).expect("spawn");
    let mut rx = handle.subscribe();

    handle
        .toggle_intervention(Intervention::new("vehicles", 30.0, "Deploy EV Fleet"))
        .await
        .expect("send");
    wait_for(&mut rx, |s| s.applied_token == Some(1)).await;

    handle
        .set_mode(AppMode::ScenarioNarrative)
        .await
        .expect("send");
    wait_for(&mut rx, |s| s.applied_token == Some(2)).await;

    let seen = service.seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].0.mode, AppMode::GlobalOverview);
    assert_eq!(seen[0].0.interventions, None);
    assert_eq!(seen[1].0.mode, AppMode::ScenarioNarrative);
    let interventions = seen[1].0.interventions.clone().expect("interventions");
    assert_eq!(interventions.len(), 1);
    assert_eq!(interventions[0].kind.as_str(), "vehicles");
    assert!(seen.iter().all(|(_, baseline)| baseline.as_str() == "north_pole"));
}

#[tokio::test(start_paused = true)]
async fn compare_mode_snapshot_carries_adopted_secondary() {
    let service = ScriptedService::new(vec![quick("compare")]);
    let (handle, _task) =
        spawn_orchestrator(mission_state(), service.clone(), options(false)).expect("spawn");
    let mut rx = handle.subscribe();

    handle.set_mode(AppMode::CompareCities).await.expect("send");
    let snapshot = wait_for(&mut rx, |s| s.mode == AppMode::CompareCities).await;
    assert_eq!(
        snapshot.secondary_city_id.as_ref().map(CityId::as_str),
        Some("mexico_city")
    );

    wait_for(&mut rx, |s| s.applied_token == Some(1)).await;
    assert_eq!(
        service.seen()[0].0.secondary_city_id.as_ref().map(CityId::as_str),
        Some("mexico_city")
    );
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_task_and_closes_the_queue() {
    let service = ScriptedService::new(vec![quick("unused")]);
    let (handle, task) =
        spawn_orchestrator(mission_state(), service, options(false)).expect("spawn");

    handle.shutdown().await.expect("send");
    timeout(Duration::from_secs(1), task)
        .await
        .expect("task stops")
        .expect("task completes");

    assert_eq!(
        handle.set_mode(AppMode::CityDeepDive).await,
        Err(MissionError::Closed)
    );
    assert_eq!(
        handle.try_send(super::MissionCommand::FindOpposite),
        Err(MissionError::Closed)
    );
}

#[tokio::test]
async fn spawn_requires_reference_baseline() {
    let builtin = CityRegistry::builtin();
    let delhi = builtin
        .get(&CityId::from("delhi"))
        .cloned()
        .expect("delhi");
    let registry = Arc::new(CityRegistry::from_records(vec![delhi]).expect("registry"));
    let state = MissionState::new(registry, CityId::from("delhi"));

    let err = spawn_orchestrator(state, Arc::new(MissingAnalysisService), options(false))
        .err()
        .expect("missing baseline");
    assert_eq!(err, MissionError::MissingBaseline(CityId::from("north_pole")));
}
