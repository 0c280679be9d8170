//! Label access
//!
//! Typed reads over a unit's label set. Missing labels are an explicit
//! `LabelNotFound`; malformed values fall back to the caller's default.

use super::Unit;
use crate::error::{PartialLabels, ProviderError, Result};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

pub const ENABLE: &str = "enable";
pub const BACKEND: &str = "backend";
pub const DOMAIN: &str = "domain";
pub const PROTOCOL: &str = "protocol";
pub const PORT: &str = "port";
pub const WEIGHT: &str = "weight";
pub const DOCKER_NETWORK: &str = "docker.network";
pub const FRONTEND_RULE: &str = "frontend.rule";
pub const FRONTEND_PRIORITY: &str = "frontend.priority";
pub const FRONTEND_PASS_HOST_HEADER: &str = "frontend.passHostHeader";
pub const FRONTEND_ENTRY_POINTS: &str = "frontend.entryPoints";
pub const FRONTEND_AUTH_BASIC: &str = "frontend.auth.basic";
pub const BACKEND_LOADBALANCER_METHOD: &str = "backend.loadbalancer.method";
pub const BACKEND_LOADBALANCER_STICKY: &str = "backend.loadbalancer.sticky";
pub const BACKEND_LOADBALANCER_SWARM: &str = "backend.loadbalancer.swarm";
pub const BACKEND_CIRCUITBREAKER_EXPRESSION: &str = "backend.circuitbreaker.expression";
pub const BACKEND_MAXCONN_AMOUNT: &str = "backend.maxconn.amount";
pub const BACKEND_MAXCONN_EXTRACTORFUNC: &str = "backend.maxconn.extractorfunc";

impl Unit {
    /// Get a label value, failing when the key is absent
    pub fn get_label(&self, key: &str) -> Result<&str> {
        self.labels
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ProviderError::LabelNotFound(key.to_string()))
    }

    /// Get several labels at once
    ///
    /// On failure the error names the first missing key and still carries
    /// every key that was found.
    pub fn get_labels(
        &self,
        keys: &[&str],
    ) -> std::result::Result<HashMap<String, String>, PartialLabels> {
        let mut found = HashMap::new();
        let mut missing = None;

        for key in keys {
            match self.labels.get(*key) {
                Some(value) => {
                    found.insert(key.to_string(), value.clone());
                }
                None if missing.is_none() => missing = Some(key.to_string()),
                None => {}
            }
        }

        match missing {
            None => Ok(found),
            Some(key) => Err(PartialLabels {
                found,
                error: ProviderError::LabelNotFound(key),
            }),
        }
    }

    /// Get a label value or a fallback
    pub fn get_label_or_default<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        self.get_label(key).unwrap_or(fallback)
    }

    /// Get a boolean label, falling back when absent or malformed
    pub fn get_bool_label_or_default(&self, key: &str, fallback: bool) -> bool {
        match self.labels.get(key) {
            Some(value) => parse_bool(value).unwrap_or_else(|| {
                log_parse_error(key, value);
                fallback
            }),
            None => fallback,
        }
    }

    /// Get an integer label, falling back when absent or malformed
    pub fn get_int_label_or_default<T: FromStr>(&self, key: &str, fallback: T) -> T {
        match self.labels.get(key) {
            Some(value) => value.trim().parse().unwrap_or_else(|_| {
                log_parse_error(key, value);
                fallback
            }),
            None => fallback,
        }
    }
}

fn log_parse_error(key: &str, value: &str) {
    let err = ProviderError::LabelParse {
        key: key.to_string(),
        value: value.to_string(),
    };
    debug!("{}, using default", err);
}

/// Parse the boolean spellings orchestrator labels use in practice
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Keep only `<prefix>.<key>` labels, with the prefix stripped
///
/// An empty prefix keeps every label unchanged.
pub fn scoped_labels(raw: &HashMap<String, String>, prefix: &str) -> HashMap<String, String> {
    if prefix.is_empty() {
        return raw.clone();
    }

    let prefix = format!("{}.", prefix.trim_end_matches('.'));
    raw.iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(&prefix)
                .filter(|k| !k.is_empty())
                .map(|k| (k.to_string(), value.clone()))
        })
        .collect()
}
