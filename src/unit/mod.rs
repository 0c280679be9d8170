//! Normalized discoverable units
//!
//! A [`Unit`] is one container, one Swarm task, or one Swarm service used
//! through its virtual IP. Every orchestrator source produces units, and
//! everything downstream (filtering, attribute extraction, synthesis) only
//! ever sees units.

pub mod labels;

pub use labels::scoped_labels;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One discoverable unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Identity name, unique within one synthesis pass
    pub name: String,
    /// Name shared by every unit of the same service
    pub service_name: String,
    /// Routing labels, already stripped of the provider label prefix
    pub labels: HashMap<String, String>,
    /// Network name to address
    pub networks: BTreeMap<String, String>,
    /// Declared ports
    pub ports: Vec<u16>,
    /// Shares the host's network namespace
    pub host_network: bool,
    /// Health status, when the orchestrator reports one
    pub health: Option<String>,
}

impl Unit {
    /// Create a unit whose service name is its own identity
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            service_name: name.to_string(),
            ..Self::default()
        }
    }

    /// Set the service name
    pub fn service_name(mut self, service_name: &str) -> Self {
        self.service_name = service_name.to_string();
        self
    }

    /// Add label
    pub fn label(mut self, key: &str, value: &str) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }

    /// Replace all labels
    pub fn labels(mut self, labels: HashMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    /// Attach to a network
    pub fn network(mut self, name: &str, addr: &str) -> Self {
        self.networks.insert(name.to_string(), addr.to_string());
        self
    }

    /// Declare a port
    pub fn port(mut self, port: u16) -> Self {
        self.ports.push(port);
        self
    }

    /// Set host networking
    pub fn host_network(mut self, host_network: bool) -> Self {
        self.host_network = host_network;
        self
    }

    /// Set health status
    pub fn health(mut self, status: &str) -> Self {
        self.health = Some(status.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_unit_uses_own_name_as_service() {
        let unit = Unit::new("web");
        assert_eq!(unit.name, "web");
        assert_eq!(unit.service_name, "web");
        assert!(unit.labels.is_empty());
        assert!(unit.networks.is_empty());
        assert!(unit.ports.is_empty());
        assert!(!unit.host_network);
    }

    #[test]
    fn test_builder() {
        let unit = Unit::new("web.1")
            .service_name("web")
            .label("port", "8080")
            .network("front", "10.0.0.2")
            .port(80)
            .port(443)
            .health("healthy");

        assert_eq!(unit.service_name, "web");
        assert_eq!(unit.labels.get("port").map(String::as_str), Some("8080"));
        assert_eq!(unit.networks.get("front").map(String::as_str), Some("10.0.0.2"));
        assert_eq!(unit.ports, vec![80, 443]);
        assert_eq!(unit.health.as_deref(), Some("healthy"));
    }
}
