use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(CityId);
id_newtype!(InterventionKind);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppMode {
    #[default]
    GlobalOverview,
    CityDeepDive,
    CompareCities,
    ScenarioNarrative,
}

impl AppMode {
    pub const ALL: [AppMode; 4] = [
        AppMode::GlobalOverview,
        AppMode::CityDeepDive,
        AppMode::CompareCities,
        AppMode::ScenarioNarrative,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AppMode::GlobalOverview => "global_overview",
            AppMode::CityDeepDive => "city_deep_dive",
            AppMode::CompareCities => "compare_cities",
            AppMode::ScenarioNarrative => "scenario_narrative",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AppMode::GlobalOverview => "Global Intel",
            AppMode::CityDeepDive => "City Analytics",
            AppMode::CompareCities => "Versus Mode",
            AppMode::ScenarioNarrative => "Future Sim",
        }
    }
}

impl fmt::Display for AppMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode '{0}'")]
pub struct UnknownMode(pub String);

impl FromStr for AppMode {
    type Err = UnknownMode;

    /// Accepts the wire names plus the short forms typed at the console.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global_overview" | "global" | "overview" => Ok(AppMode::GlobalOverview),
            "city_deep_dive" | "city" | "deep_dive" => Ok(AppMode::CityDeepDive),
            "compare_cities" | "compare" | "versus" => Ok(AppMode::CompareCities),
            "scenario_narrative" | "scenario" | "sim" => Ok(AppMode::ScenarioNarrative),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    Pristine,
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl SeverityLevel {
    pub fn from_aqi(aqi: f64) -> Self {
        if aqi <= 20.0 {
            SeverityLevel::Pristine
        } else if aqi <= 50.0 {
            SeverityLevel::Good
        } else if aqi <= 100.0 {
            SeverityLevel::Moderate
        } else if aqi <= 150.0 {
            SeverityLevel::UnhealthySensitive
        } else if aqi <= 200.0 {
            SeverityLevel::Unhealthy
        } else if aqi <= 300.0 {
            SeverityLevel::VeryUnhealthy
        } else {
            SeverityLevel::Hazardous
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SeverityLevel::Pristine => "Pristine",
            SeverityLevel::Good => "Good",
            SeverityLevel::Moderate => "Moderate",
            SeverityLevel::UnhealthySensitive => "Unhealthy for Sensitive",
            SeverityLevel::Unhealthy => "Unhealthy",
            SeverityLevel::VeryUnhealthy => "Very Unhealthy",
            SeverityLevel::Hazardous => "Hazardous",
        }
    }
}

/// Health bar for a city: 100 is pristine air, 0 is fully depleted.
pub fn health_score(aqi: f64) -> f64 {
    (100.0 - aqi / 3.5).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub id: CityId,
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
    pub population: u64,
    pub aqi: f64,
    pub pm25: f64,
    pub description: String,
    pub health_score: f64,
    pub severity: SeverityLevel,
    #[serde(default)]
    pub is_reference: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    #[serde(rename = "type")]
    pub kind: InterventionKind,
    pub reduction_pct: f64,
    pub label: String,
}

impl Intervention {
    pub fn new(kind: impl Into<String>, reduction_pct: f64, label: impl Into<String>) -> Self {
        Self {
            kind: InterventionKind::new(kind),
            reduction_pct: reduction_pct.clamp(0.0, 100.0),
            label: label.into(),
        }
    }
}
