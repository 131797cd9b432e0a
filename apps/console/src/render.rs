//! Plain-text presentation of mission snapshots.

use std::fmt::Write as _;

use mission_core::MissionSnapshot;
use registry::CityRegistry;
use shared::{
    domain::{CityId, CityRecord, Intervention},
    protocol::AnalysisResult,
};

fn city_label(registry: &CityRegistry, id: &CityId) -> String {
    match registry.get(id) {
        Some(city) => format!("{} ({}, AQI {:.0})", city.name, city.country, city.aqi),
        None => format!("{id} (unknown)"),
    }
}

pub fn render_status(snapshot: &MissionSnapshot, registry: &CityRegistry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "mode:      {} ({})", snapshot.mode.label(), snapshot.mode);
    let _ = writeln!(out, "primary:   {}", city_label(registry, &snapshot.primary_city_id));
    match &snapshot.secondary_city_id {
        Some(id) => {
            let _ = writeln!(out, "secondary: {}", city_label(registry, id));
        }
        None => {
            let _ = writeln!(out, "secondary: none");
        }
    }
    if !snapshot.interventions.is_empty() {
        let labels: Vec<&str> = snapshot
            .interventions
            .iter()
            .map(|item| item.label.as_str())
            .collect();
        let _ = writeln!(out, "active:    {}", labels.join(", "));
    }
    if let Some(query) = &snapshot.custom_query {
        let _ = writeln!(out, "question:  {query}");
    }
    let updated = snapshot
        .updated_at
        .map(|at| at.format("%H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string());
    let _ = write!(
        out,
        "analysis:  {} (request #{}, last update {updated})",
        if snapshot.loading { "running" } else { "idle" },
        snapshot.request_token,
    );
    out
}

pub fn render_result(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", result.title);
    if let Some(highlight) = &result.highlight {
        let _ = writeln!(out, ">> {highlight}");
    }
    let _ = writeln!(out, "{}", result.narrative);
    let _ = writeln!(out, "drivers: {}", result.key_drivers.join(", "));
    let _ = write!(out, "health:  {}", result.health_impact);
    for row in result.comparisons.iter().flatten() {
        let _ = write!(
            out,
            "\n  {:<16} {:>10.1} vs {:<10.1} {}",
            row.metric, row.primary_value, row.secondary_value, row.unit
        );
    }
    for warning in result.warnings.iter().flatten() {
        let _ = write!(out, "\n  ! {warning}");
    }
    out
}

pub fn render_cities(cities: &[&CityRecord]) -> String {
    if cities.is_empty() {
        return "no matching cities".to_string();
    }
    cities
        .iter()
        .map(|city| {
            format!(
                "{:<16} {:<22} {:<16} AQI {:>5.0}  {}",
                city.id.as_str(),
                city.name,
                city.country,
                city.aqi,
                city.severity.label()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_interventions(catalog: &[Intervention], active: &[Intervention]) -> String {
    catalog
        .iter()
        .map(|item| {
            let mark = if active.iter().any(|a| a.kind == item.kind) {
                "x"
            } else {
                " "
            };
            format!(
                "[{mark}] {:<14} -{:>3.0}%  {}",
                item.kind.as_str(),
                item.reduction_pct,
                item.label
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remembers what has been printed so each snapshot change yields at most one
/// frame: a loading line when a request goes out, the card when it lands.
#[derive(Debug, Default)]
pub struct FrameTracker {
    shown_request: u64,
    shown_applied: Option<u64>,
}

impl FrameTracker {
    pub fn next_frame(&mut self, snapshot: &MissionSnapshot) -> Option<String> {
        if snapshot.applied_token != self.shown_applied {
            self.shown_applied = snapshot.applied_token;
            self.shown_request = snapshot.request_token;
            return snapshot.result.as_ref().map(render_result);
        }
        if snapshot.loading && snapshot.request_token != self.shown_request {
            self.shown_request = snapshot.request_token;
            return Some(format!(
                "... analyzing {} in {} mode",
                snapshot.primary_city_id,
                snapshot.mode.label()
            ));
        }
        None
    }
}
