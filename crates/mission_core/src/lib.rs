use std::sync::Arc;

use analysis_integration::{
    AnalysisService, GeminiAnalysisService, GeminiConfig, MissingAnalysisService,
};
use registry::CityRegistry;
use tracing::{info, warn};

pub mod antipode;
pub mod config;
pub mod interventions;
pub mod mode;
pub mod orchestrator;
pub mod selection;
pub mod state;

pub use config::{load_settings, AnalysisSettings, Settings};
pub use orchestrator::{
    spawn_orchestrator, MissionCommand, MissionError, MissionHandle, MissionSnapshot,
    OrchestratorOptions,
};
pub use state::MissionState;

/// Gemini when an API key is configured, otherwise a service that always
/// fails so every request resolves to the fallback result.
pub fn analysis_service_from_settings(
    settings: &AnalysisSettings,
    registry: Arc<CityRegistry>,
) -> Arc<dyn AnalysisService> {
    match settings.api_key.as_deref() {
        Some(api_key) => {
            info!(model = %settings.model, endpoint = %settings.endpoint, "using Gemini analysis service");
            Arc::new(GeminiAnalysisService::new(
                GeminiConfig {
                    endpoint: settings.endpoint.clone(),
                    model: settings.model.clone(),
                    api_key: api_key.to_string(),
                    temperature: settings.temperature,
                },
                registry,
            ))
        }
        None => {
            warn!("no analysis API key configured; narratives will use the fallback");
            Arc::new(MissingAnalysisService)
        }
    }
}
