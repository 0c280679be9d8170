//! Network records

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Network driver types
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkDriver {
    /// Bridge network (default)
    #[default]
    Bridge,
    /// Host network
    Host,
    /// No networking
    Null,
    /// Overlay network (for Swarm)
    Overlay,
    /// Macvlan network
    Macvlan,
    /// IPvlan network
    Ipvlan,
    /// Any driver plugin
    #[serde(other)]
    Other,
}

/// Network scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkScope {
    /// Local to this node
    #[default]
    Local,
    /// Swarm-wide
    Swarm,
    /// Global
    Global,
    #[serde(other)]
    Other,
}

/// Network, as returned by the network list call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NetworkResource {
    pub id: String,
    pub name: String,
    pub driver: NetworkDriver,
    pub scope: NetworkScope,
    pub ingress: bool,
}

impl NetworkResource {
    /// Create a network record
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Set network driver
    pub fn driver(mut self, driver: NetworkDriver) -> Self {
        self.driver = driver;
        self
    }
}

/// Networks by ID
///
/// Swarm endpoints and task attachments reference networks by ID; units
/// carry network names.
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    networks: HashMap<String, NetworkResource>,
}

impl NetworkRegistry {
    pub fn new(networks: impl IntoIterator<Item = NetworkResource>) -> Self {
        Self {
            networks: networks.into_iter().map(|n| (n.id.clone(), n)).collect(),
        }
    }

    /// Look up a network by ID
    pub fn get(&self, id: &str) -> Option<&NetworkResource> {
        self.networks.get(id)
    }

    /// Name of a network by ID
    pub fn name(&self, id: &str) -> Option<&str> {
        self.get(id).map(|n| n.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

/// Strip the prefix length from an address such as `10.0.0.3/24`
pub fn strip_cidr(addr: &str) -> &str {
    addr.split('/').next().unwrap_or(addr)
}
