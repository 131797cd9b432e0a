use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use analysis_integration::{DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use anyhow::Context;
use registry::{DEFAULT_PRIMARY_CITY_ID, NORTH_POLE_ID};
use serde::Deserialize;

pub const DEFAULT_SETTINGS_FILE: &str = "twin_skies.toml";
pub const DEFAULT_DEBOUNCE_MS: u64 = 600;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub debounce_ms: u64,
    pub default_city: String,
    pub reference_city: String,
    pub analyze_on_start: bool,
    pub analysis: AnalysisSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub api_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            default_city: DEFAULT_PRIMARY_CITY_ID.into(),
            reference_city: NORTH_POLE_ID.into(),
            analyze_on_start: true,
            analysis: AnalysisSettings {
                endpoint: DEFAULT_ENDPOINT.into(),
                model: DEFAULT_MODEL.into(),
                temperature: DEFAULT_TEMPERATURE,
                api_key: None,
            },
        }
    }
}

impl Settings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    debounce_ms: Option<u64>,
    default_city: Option<String>,
    reference_city: Option<String>,
    analyze_on_start: Option<bool>,
    analysis: FileAnalysisSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileAnalysisSettings {
    endpoint: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    api_key: Option<String>,
}

/// Defaults, then the settings file (explicit path, or `twin_skies.toml` in
/// the working directory when present), then environment variables.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let file = match path {
        Some(path) => Some(path.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_SETTINGS_FILE)).filter(|path| path.exists()),
    };
    if let Some(file) = file {
        let raw = fs::read_to_string(&file)
            .with_context(|| format!("failed to read settings file '{}'", file.display()))?;
        apply_file_settings(&mut settings, &raw)
            .with_context(|| format!("invalid settings file '{}'", file.display()))?;
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file_settings(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.debounce_ms {
        settings.debounce_ms = v;
    }
    if let Some(v) = file_cfg.default_city {
        settings.default_city = v;
    }
    if let Some(v) = file_cfg.reference_city {
        settings.reference_city = v;
    }
    if let Some(v) = file_cfg.analyze_on_start {
        settings.analyze_on_start = v;
    }
    if let Some(v) = file_cfg.analysis.endpoint {
        settings.analysis.endpoint = v;
    }
    if let Some(v) = file_cfg.analysis.model {
        settings.analysis.model = v;
    }
    if let Some(v) = file_cfg.analysis.temperature {
        settings.analysis.temperature = v;
    }
    if let Some(v) = file_cfg.analysis.api_key {
        settings.analysis.api_key = Some(v);
    }
    Ok(())
}

/// Unparseable numeric or boolean values are ignored.
fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("APP__DEBOUNCE_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.debounce_ms = parsed;
        }
    }
    if let Some(v) = var("APP__DEFAULT_CITY") {
        settings.default_city = v;
    }
    if let Some(v) = var("APP__REFERENCE_CITY") {
        settings.reference_city = v;
    }
    if let Some(v) = var("APP__ANALYZE_ON_START") {
        if let Ok(parsed) = v.parse::<bool>() {
            settings.analyze_on_start = parsed;
        }
    }

    if let Some(v) = var("APP__ANALYSIS_ENDPOINT") {
        settings.analysis.endpoint = v;
    }
    if let Some(v) = var("APP__ANALYSIS_MODEL") {
        settings.analysis.model = v;
    }
    if let Some(v) = var("APP__ANALYSIS_TEMPERATURE") {
        if let Ok(parsed) = v.parse::<f32>() {
            settings.analysis.temperature = parsed;
        }
    }

    for key in ["API_KEY", "GEMINI_API_KEY", "APP__ANALYSIS_API_KEY"] {
        if let Some(v) = var(key).filter(|v| !v.trim().is_empty()) {
            settings.analysis.api_key = Some(v);
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
