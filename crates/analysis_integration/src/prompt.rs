//! Prompt and schema material sent with every analysis call.

use registry::CityRegistry;
use serde::Serialize;
use serde_json::{json, Value};
use shared::{
    domain::{AppMode, CityRecord, Intervention},
    protocol::RequestContext,
};

pub const SYSTEM_INSTRUCTION: &str = r#"You are the Intelligence Core for "Twin Skies".

Role:
Analyze global air quality data with a high-tech, slightly gamified "Mission Control" persona.

Key directive:
Always use the "North Pole" or "South Pole" as the gold standard for comparison (AQI ~1).
When describing pollution in Delhi or Beijing, scale it against these pristine benchmarks.

Examples:
- "Delhi's PM2.5 load is currently 210x higher than the North Pole baseline."
- "San Antonio offers 45% cleaner air than Delhi, but is still 40x denser than the Antarctic standard."

Modes:
1. "global_overview": Summarize the planetary state. Highlight the gap between industrial zones and the Poles.
2. "city_deep_dive": Detailed breakdown of a specific city.
3. "compare_cities": Direct versus match.
4. "scenario_narrative": Future simulation.

Output JSON strictly."#;

#[derive(Debug, Serialize)]
struct DataContext<'a> {
    mode: AppMode,
    primary_city: Option<&'a CityRecord>,
    secondary_city: Option<&'a CityRecord>,
    reference_baseline: &'a CityRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    active_interventions: Option<&'a [Intervention]>,
}

/// Unknown city ids serialize as `null` rather than failing the call.
pub fn build_user_prompt(
    context: &RequestContext,
    baseline: &CityRecord,
    registry: &CityRegistry,
) -> Result<String, serde_json::Error> {
    let data = DataContext {
        mode: context.mode,
        primary_city: registry.get(&context.primary_city_id),
        secondary_city: context
            .secondary_city_id
            .as_ref()
            .and_then(|id| registry.get(id)),
        reference_baseline: baseline,
        active_interventions: context.interventions.as_deref(),
    };
    let data_json = serde_json::to_string(&data)?;
    let custom = context
        .custom_query
        .as_deref()
        .filter(|query| !query.trim().is_empty())
        .unwrap_or("None");

    Ok(format!(
        "Current Data Context: {data_json}\n\
         User Custom Input: {custom}\n\n\
         Generate response. Be authoritative. Use the Reference Baseline (Poles) to contextualize the severity of the primary city's pollution."
    ))
}

/// Structured-output schema mirroring `shared::protocol::AnalysisPayload`.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "ui_text": {
                "type": "OBJECT",
                "properties": {
                    "title": { "type": "STRING" },
                    "narrative": { "type": "STRING" },
                    "highlight": { "type": "STRING" }
                },
                "required": ["title", "narrative"]
            },
            "analysis": {
                "type": "OBJECT",
                "properties": {
                    "key_drivers": { "type": "ARRAY", "items": { "type": "STRING" } },
                    "health_impact": { "type": "STRING" }
                },
                "required": ["key_drivers", "health_impact"]
            },
            "comparisons": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "metric": { "type": "STRING" },
                        "primaryValue": { "type": "NUMBER" },
                        "secondaryValue": { "type": "NUMBER" },
                        "unit": { "type": "STRING" }
                    },
                    "required": ["metric", "primaryValue", "secondaryValue", "unit"]
                }
            },
            "warnings": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["ui_text", "analysis"]
    })
}
