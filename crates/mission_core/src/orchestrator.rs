//! Debounced analysis pipeline.
//!
//! One task owns the mission state. User commands arrive over a bounded
//! queue; each command that changes state pushes the debounce deadline out.
//! When the deadline passes, the current request context is sent to the
//! analysis service on a separate task tagged with a fresh token. Completions
//! come back to the owning task and are applied only when their token is the
//! latest one dispatched.

use std::{sync::Arc, time::Duration};

use analysis_integration::AnalysisService;
use chrono::{DateTime, Utc};
use shared::{
    domain::{AppMode, CityId, CityRecord, Intervention},
    protocol::{parse_analysis_payload, AnalysisResult, RequestContext},
};
use thiserror::Error;
use tokio::{
    sync::{
        mpsc::{self, error::TrySendError},
        watch,
    },
    task::JoinHandle,
    time::{sleep_until, Instant},
};
use tracing::{debug, info, warn};

use crate::{config::Settings, state::MissionState};

const COMMAND_QUEUE_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum MissionCommand {
    SetMode(AppMode),
    ActivateCity(CityId),
    ActivatePrimary(CityId),
    SetSecondary(Option<CityId>),
    FindOpposite,
    ToggleIntervention(Intervention),
    SetCustomQuery(String),
    Shutdown,
}

impl MissionCommand {
    pub fn name(&self) -> &'static str {
        match self {
            MissionCommand::SetMode(_) => "set_mode",
            MissionCommand::ActivateCity(_) => "activate_city",
            MissionCommand::ActivatePrimary(_) => "activate_primary",
            MissionCommand::SetSecondary(_) => "set_secondary",
            MissionCommand::FindOpposite => "find_opposite",
            MissionCommand::ToggleIntervention(_) => "toggle_intervention",
            MissionCommand::SetCustomQuery(_) => "set_custom_query",
            MissionCommand::Shutdown => "shutdown",
        }
    }
}

/// Observable state for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionSnapshot {
    pub mode: AppMode,
    pub primary_city_id: CityId,
    pub secondary_city_id: Option<CityId>,
    pub interventions: Vec<Intervention>,
    pub custom_query: Option<String>,
    /// The most recently dispatched call has not resolved yet.
    pub loading: bool,
    pub result: Option<AnalysisResult>,
    /// Token of the most recently dispatched call, 0 before the first one.
    pub request_token: u64,
    pub applied_token: Option<u64>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MissionError {
    #[error("mission orchestrator is no longer running")]
    Closed,
    #[error("mission command queue is full")]
    QueueFull,
    #[error("no reference baseline city available (requested '{0}')")]
    MissingBaseline(CityId),
}

#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    pub debounce: Duration,
    pub reference_city: CityId,
    pub analyze_on_start: bool,
}

impl OrchestratorOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            debounce: settings.debounce(),
            reference_city: CityId::new(settings.reference_city.clone()),
            analyze_on_start: settings.analyze_on_start,
        }
    }
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Cloneable mutation surface plus read access to the latest snapshot.
#[derive(Clone)]
pub struct MissionHandle {
    commands: mpsc::Sender<MissionCommand>,
    snapshots: watch::Receiver<MissionSnapshot>,
}

impl MissionHandle {
    pub async fn send(&self, cmd: MissionCommand) -> Result<(), MissionError> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| MissionError::Closed)
    }

    pub fn try_send(&self, cmd: MissionCommand) -> Result<(), MissionError> {
        self.commands.try_send(cmd).map_err(|err| match err {
            TrySendError::Full(_) => MissionError::QueueFull,
            TrySendError::Closed(_) => MissionError::Closed,
        })
    }

    pub async fn set_mode(&self, mode: AppMode) -> Result<(), MissionError> {
        self.send(MissionCommand::SetMode(mode)).await
    }

    pub async fn activate_city(&self, id: CityId) -> Result<(), MissionError> {
        self.send(MissionCommand::ActivateCity(id)).await
    }

    pub async fn activate_primary(&self, id: CityId) -> Result<(), MissionError> {
        self.send(MissionCommand::ActivatePrimary(id)).await
    }

    pub async fn set_secondary(&self, id: Option<CityId>) -> Result<(), MissionError> {
        self.send(MissionCommand::SetSecondary(id)).await
    }

    pub async fn find_opposite(&self) -> Result<(), MissionError> {
        self.send(MissionCommand::FindOpposite).await
    }

    pub async fn toggle_intervention(
        &self,
        intervention: Intervention,
    ) -> Result<(), MissionError> {
        self.send(MissionCommand::ToggleIntervention(intervention))
            .await
    }

    pub async fn set_custom_query(&self, text: impl Into<String>) -> Result<(), MissionError> {
        self.send(MissionCommand::SetCustomQuery(text.into())).await
    }

    pub async fn shutdown(&self) -> Result<(), MissionError> {
        self.send(MissionCommand::Shutdown).await
    }

    pub fn snapshot(&self) -> MissionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MissionSnapshot> {
        self.snapshots.clone()
    }
}

struct Completion {
    token: u64,
    result: AnalysisResult,
}

struct AnalysisOrchestrator {
    state: MissionState,
    service: Arc<dyn AnalysisService>,
    baseline: Arc<CityRecord>,
    debounce: Duration,
    deadline: Option<Instant>,
    latest_token: u64,
    applied_token: Option<u64>,
    loading: bool,
    result: Option<AnalysisResult>,
    updated_at: Option<DateTime<Utc>>,
    completions: mpsc::UnboundedSender<Completion>,
    snapshots: watch::Sender<MissionSnapshot>,
}

/// Starts the orchestrator task on the current tokio runtime.
pub fn spawn_orchestrator(
    state: MissionState,
    service: Arc<dyn AnalysisService>,
    options: OrchestratorOptions,
) -> Result<(MissionHandle, JoinHandle<()>), MissionError> {
    let baseline = state
        .registry()
        .reference_baseline(&options.reference_city)
        .cloned()
        .ok_or_else(|| MissionError::MissingBaseline(options.reference_city.clone()))?;
    if baseline.id != options.reference_city {
        warn!(
            requested = %options.reference_city,
            using = %baseline.id,
            "requested reference city is not a reference record"
        );
    }

    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
    let (completion_tx, completion_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(empty_snapshot());

    let mut orchestrator = AnalysisOrchestrator {
        state,
        service,
        baseline: Arc::new(baseline),
        debounce: options.debounce,
        deadline: None,
        latest_token: 0,
        applied_token: None,
        loading: false,
        result: None,
        updated_at: None,
        completions: completion_tx,
        snapshots: snapshot_tx,
    };
    orchestrator.publish();
    if options.analyze_on_start {
        orchestrator.schedule();
    }

    let task = tokio::spawn(orchestrator.run(command_rx, completion_rx));
    Ok((
        MissionHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        },
        task,
    ))
}

fn empty_snapshot() -> MissionSnapshot {
    MissionSnapshot {
        mode: AppMode::default(),
        primary_city_id: CityId::new(String::new()),
        secondary_city_id: None,
        interventions: Vec::new(),
        custom_query: None,
        loading: false,
        result: None,
        request_token: 0,
        applied_token: None,
        updated_at: None,
    }
}

impl AnalysisOrchestrator {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<MissionCommand>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) {
        loop {
            let deadline = self.deadline;
            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(MissionCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                Some(done) = completions.recv() => self.complete(done),
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.dispatch();
                }
            }
        }
        debug!(
            latest_token = self.latest_token,
            "mission orchestrator stopped"
        );
    }

    fn handle_command(&mut self, cmd: MissionCommand) {
        let command = cmd.name();
        let changed = match cmd {
            MissionCommand::SetMode(mode) => self.state.set_mode(mode),
            MissionCommand::ActivateCity(id) => self.state.activate_city(id),
            MissionCommand::ActivatePrimary(id) => self.state.activate_primary(id),
            MissionCommand::SetSecondary(id) => self.state.set_secondary(id),
            MissionCommand::FindOpposite => self.state.find_opposite(),
            MissionCommand::ToggleIntervention(intervention) => {
                self.state.toggle_intervention(intervention)
            }
            MissionCommand::SetCustomQuery(text) => self.state.set_custom_query(text),
            MissionCommand::Shutdown => false,
        };
        debug!(command, changed, "applied mission command");
        if changed {
            self.schedule();
        }
        self.publish();
    }

    /// Replaces any pending deadline; only the last trigger in a quiet window
    /// reaches the service.
    fn schedule(&mut self) {
        self.deadline = Some(Instant::now() + self.debounce);
    }

    fn dispatch(&mut self) {
        self.deadline = None;
        self.latest_token += 1;
        let token = self.latest_token;
        let context = self.state.request_context();
        info!(
            token,
            mode = %context.mode,
            primary = %context.primary_city_id,
            "dispatching analysis request"
        );

        let service = Arc::clone(&self.service);
        let baseline = Arc::clone(&self.baseline);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = run_analysis(service.as_ref(), &context, &baseline, token).await;
            let _ = completions.send(Completion { token, result });
        });

        self.loading = true;
        self.publish();
    }

    fn complete(&mut self, done: Completion) {
        if done.token != self.latest_token {
            debug!(
                token = done.token,
                latest_token = self.latest_token,
                "discarding stale analysis result"
            );
            return;
        }
        info!(token = done.token, title = %done.result.title, "analysis result applied");
        self.result = Some(done.result);
        self.applied_token = Some(done.token);
        self.loading = false;
        self.updated_at = Some(Utc::now());
        self.publish();
    }

    fn snapshot(&self) -> MissionSnapshot {
        let selection = self.state.selection();
        MissionSnapshot {
            mode: self.state.mode(),
            primary_city_id: selection.primary().clone(),
            secondary_city_id: selection.secondary().cloned(),
            interventions: self.state.interventions().to_vec(),
            custom_query: self.state.custom_query().map(str::to_string),
            loading: self.loading,
            result: self.result.clone(),
            request_token: self.latest_token,
            applied_token: self.applied_token,
            updated_at: self.updated_at,
        }
    }

    fn publish(&self) {
        let next = self.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}

/// Never fails: transport errors and invalid payloads become the fallback.
async fn run_analysis(
    service: &dyn AnalysisService,
    context: &RequestContext,
    baseline: &CityRecord,
    token: u64,
) -> AnalysisResult {
    let outcome = match service.analyze(context, baseline).await {
        Ok(raw) => parse_analysis_payload(&raw),
        Err(err) => Err(err),
    };
    match outcome {
        Ok(result) => result,
        Err(err) => {
            warn!(token, kind = ?err.kind(), error = %err, "analysis failed, showing fallback");
            AnalysisResult::fallback()
        }
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
