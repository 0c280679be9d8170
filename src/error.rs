//! Error types for dockroute

use std::collections::HashMap;
use thiserror::Error;

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Provider error types
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Label not found: {0}")]
    LabelNotFound(String),

    #[error("Invalid value {value:?} for label {key}")]
    LabelParse { key: String, value: String },

    #[error("Orchestrator query failed: {0}")]
    OrchestratorQuery(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("YAML error: {0}")]
    Yaml(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<serde_yaml::Error> for ProviderError {
    fn from(e: serde_yaml::Error) -> Self {
        ProviderError::Yaml(e.to_string())
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::OrchestratorQuery(e.to_string())
    }
}

/// Labels found by a multi-key lookup that stopped on a missing key
#[derive(Debug)]
pub struct PartialLabels {
    /// Every requested key that was present
    pub found: HashMap<String, String>,
    /// `LabelNotFound` for the first missing key
    pub error: ProviderError,
}

impl std::fmt::Display for PartialLabels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} labels found)", self.error, self.found.len())
    }
}

impl std::error::Error for PartialLabels {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
