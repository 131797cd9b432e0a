use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    Malformed,
}

/// Every way an analysis call can fail. All of them are recovered into the
/// fallback result before reaching the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("analysis service unavailable: {0}")]
    Unavailable(String),
    #[error("analysis transport failure: {0}")]
    Transport(String),
    #[error("analysis service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("analysis service returned an empty body")]
    EmptyBody,
    #[error("malformed analysis payload: {0}")]
    Malformed(String),
}

impl AnalysisError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AnalysisError::Unavailable(_)
            | AnalysisError::Transport(_)
            | AnalysisError::Status { .. } => FailureKind::Transport,
            AnalysisError::EmptyBody | AnalysisError::Malformed(_) => FailureKind::Malformed,
        }
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(value: serde_json::Error) -> Self {
        AnalysisError::Malformed(value.to_string())
    }
}
