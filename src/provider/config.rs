//! Provider settings

use crate::error::{ProviderError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default Docker Engine API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:2375";

/// Default label namespace
pub const DEFAULT_LABEL_PREFIX: &str = "traefik";

/// Provider-wide settings
///
/// Read-only during a synthesis pass; every extractor, the eligibility
/// filter and the synthesizer take it as an explicit argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Domain appended to the default `Host:` rule
    pub domain: String,
    /// Expose units without an `enable` label
    pub exposed_by_default: bool,
    /// Namespace of routing labels (`<prefix>.<key>`)
    pub label_prefix: String,
    /// Discover Swarm services instead of containers
    pub swarm_mode: bool,
    /// Docker Engine API base URL
    pub endpoint: String,
    /// Engine API version, e.g. `1.41`
    pub api_version: Option<String>,
    /// Keep polling after the first cycle
    pub watch: bool,
    /// Seconds between polls
    pub refresh_interval_secs: u64,
    /// Deadline for one inventory snapshot
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            exposed_by_default: true,
            label_prefix: DEFAULT_LABEL_PREFIX.to_string(),
            swarm_mode: false,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_version: None,
            watch: true,
            refresh_interval_secs: 15,
            request_timeout_secs: 10,
        }
    }
}

impl ProviderConfig {
    /// Create settings with a default domain
    pub fn new(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            ..Self::default()
        }
    }

    /// Set exposed-by-default
    pub fn exposed_by_default(mut self, exposed: bool) -> Self {
        self.exposed_by_default = exposed;
        self
    }

    /// Set endpoint
    pub fn endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    /// Load settings from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        Self::parse_str(&content)
    }

    /// Parse settings from a YAML string
    pub fn parse_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validated()
    }

    /// Check settings and normalize the endpoint
    pub fn validated(mut self) -> Result<Self> {
        if self.refresh_interval_secs == 0 {
            return Err(ProviderError::InvalidConfig(
                "refresh_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ProviderError::InvalidConfig(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        if let Some(rest) = self.endpoint.strip_prefix("tcp://") {
            self.endpoint = format!("http://{}", rest);
        } else if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ProviderError::InvalidConfig(format!(
                "Invalid endpoint '{}': expected http://, https:// or tcp://",
                self.endpoint
            )));
        }
        self.endpoint = self.endpoint.trim_end_matches('/').to_string();

        Ok(self)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
