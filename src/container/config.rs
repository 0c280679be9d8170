//! Container inspect records

use crate::docker::nullable;
use crate::unit::{scoped_labels, Unit};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Network mode of containers sharing the host's network namespace
pub const HOST_NETWORK_MODE: &str = "host";

/// Container summary, as returned by the container list call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContainerSummary {
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub names: Vec<String>,
    pub state: String,
}

/// Full container description, as returned by container inspect
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContainerJson {
    pub id: String,
    /// Name as reported by the engine, with a leading `/`
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub config: ContainerConfig,
    #[serde(deserialize_with = "nullable")]
    pub host_config: HostConfig,
    #[serde(deserialize_with = "nullable")]
    pub network_settings: NetworkSettings,
    #[serde(deserialize_with = "nullable")]
    pub state: ContainerState,
}

/// Container configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContainerConfig {
    pub image: String,
    #[serde(deserialize_with = "nullable")]
    pub labels: HashMap<String, String>,
}

/// Host configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct HostConfig {
    pub network_mode: String,
}

/// Network settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NetworkSettings {
    /// `"<port>/<proto>"` to host bindings
    #[serde(deserialize_with = "nullable")]
    pub ports: HashMap<String, Option<Vec<PortBinding>>>,
    #[serde(deserialize_with = "nullable")]
    pub networks: HashMap<String, EndpointSettings>,
}

/// Host port binding
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PortBinding {
    pub host_ip: String,
    pub host_port: String,
}

/// Endpoint on one network
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSettings {
    #[serde(rename = "NetworkID")]
    pub network_id: String,
    #[serde(rename = "IPAddress")]
    pub ip_address: String,
}

/// Container state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContainerState {
    pub status: String,
    pub running: bool,
    pub health: Option<Health>,
}

/// Health check state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Health {
    pub status: String,
}

impl ContainerJson {
    /// Create an inspect record
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Add label
    pub fn label(mut self, key: &str, value: &str) -> Self {
        self.config.labels.insert(key.to_string(), value.to_string());
        self
    }

    /// Declare a port, e.g. `80/tcp`
    pub fn port(mut self, port: &str) -> Self {
        self.network_settings.ports.insert(port.to_string(), None);
        self
    }

    /// Attach to a network
    pub fn network(mut self, name: &str, ip: &str) -> Self {
        self.network_settings.networks.insert(
            name.to_string(),
            EndpointSettings {
                network_id: String::new(),
                ip_address: ip.to_string(),
            },
        );
        self
    }

    /// Set network mode
    pub fn network_mode(mut self, mode: &str) -> Self {
        self.host_config.network_mode = mode.to_string();
        self
    }

    /// Normalize into a unit, keeping only labels under `label_prefix`
    pub fn to_unit(&self, label_prefix: &str) -> Unit {
        let name = self.name.trim_start_matches('/');

        let mut ports: Vec<u16> = self
            .network_settings
            .ports
            .keys()
            .filter_map(|spec| spec.split('/').next()?.parse().ok())
            .collect();
        ports.sort_unstable();
        ports.dedup();

        let mut unit = Unit::new(name)
            .labels(scoped_labels(&self.config.labels, label_prefix))
            .host_network(self.host_config.network_mode == HOST_NETWORK_MODE);
        unit.ports = ports;

        for (network, endpoint) in &self.network_settings.networks {
            if !endpoint.ip_address.is_empty() {
                unit = unit.network(network, &endpoint.ip_address);
            }
        }

        if let Some(health) = self.state.health.as_ref().filter(|h| !h.status.is_empty()) {
            unit = unit.health(&health.status);
        }

        unit
    }
}
