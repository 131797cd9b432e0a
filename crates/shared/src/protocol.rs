use serde::{Deserialize, Serialize};

use crate::{
    domain::{AppMode, CityId, Intervention},
    error::AnalysisError,
};

pub const FALLBACK_TITLE: &str = "Atmospheric Data Unavailable";
pub const FALLBACK_NARRATIVE: &str =
    "Unable to reach the intelligence core. Displaying cached simulation data.";
pub const FALLBACK_HIGHLIGHT: &str = "System Offline";
pub const FALLBACK_HEALTH_IMPACT: &str = "Data Link Severed";

/// Snapshot of user intent handed to the analysis service for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    pub mode: AppMode,
    pub primary_city_id: CityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_city_id: Option<CityId>,
    /// Only present in scenario mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interventions: Option<Vec<Intervention>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_query: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub metric: String,
    #[serde(rename = "primaryValue")]
    pub primary_value: f64,
    #[serde(rename = "secondaryValue")]
    pub secondary_value: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiText {
    pub title: String,
    pub narrative: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSection {
    pub key_drivers: Vec<String>,
    pub health_impact: String,
}

/// Wire shape the analysis service must produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPayload {
    pub ui_text: UiText,
    pub analysis: AnalysisSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparisons: Option<Vec<Comparison>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub title: String,
    pub narrative: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    pub key_drivers: Vec<String>,
    pub health_impact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparisons: Option<Vec<Comparison>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

impl AnalysisResult {
    /// Degraded-service result shown whenever a call fails, regardless of mode.
    pub fn fallback() -> Self {
        Self {
            title: FALLBACK_TITLE.to_string(),
            narrative: FALLBACK_NARRATIVE.to_string(),
            highlight: Some(FALLBACK_HIGHLIGHT.to_string()),
            key_drivers: vec!["N/A".to_string()],
            health_impact: FALLBACK_HEALTH_IMPACT.to_string(),
            comparisons: Some(Vec::new()),
            warnings: None,
        }
    }
}

impl From<AnalysisPayload> for AnalysisResult {
    fn from(value: AnalysisPayload) -> Self {
        Self {
            title: value.ui_text.title,
            narrative: value.ui_text.narrative,
            highlight: value.ui_text.highlight,
            key_drivers: value.analysis.key_drivers,
            health_impact: value.analysis.health_impact,
            comparisons: value.comparisons,
            warnings: value.warnings,
        }
    }
}

/// Validates a raw service body. Any missing required field rejects the whole
/// payload; unknown fields are ignored.
pub fn parse_analysis_payload(raw: &str) -> Result<AnalysisResult, AnalysisError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AnalysisError::EmptyBody);
    }
    let payload: AnalysisPayload = serde_json::from_str(raw)?;
    Ok(payload.into())
}
