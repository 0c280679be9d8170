//! Swarm service records

use crate::docker::nullable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Swarm service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Service {
    /// Service ID
    #[serde(rename = "ID")]
    pub id: String,
    /// Service specification
    pub spec: ServiceSpec,
    /// Service endpoint
    pub endpoint: Endpoint,
    /// Created timestamp
    pub created_at: Option<DateTime<Utc>>,
    /// Updated timestamp
    pub updated_at: Option<DateTime<Utc>>,
}

impl Service {
    /// Create a service record
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            spec: ServiceSpec {
                name: name.to_string(),
                ..ServiceSpec::default()
            },
            ..Self::default()
        }
    }

    /// Add label
    pub fn label(mut self, key: &str, value: &str) -> Self {
        self.spec.labels.insert(key.to_string(), value.to_string());
        self
    }

    /// Set service mode
    pub fn mode(mut self, mode: ServiceMode) -> Self {
        self.spec.mode = Some(mode);
        self
    }

    /// Set endpoint resolution mode
    pub fn endpoint_mode(mut self, mode: ResolutionMode) -> Self {
        self.spec.endpoint_spec = Some(EndpointSpec { mode: Some(mode) });
        self
    }

    /// Add a virtual IP on a network
    pub fn virtual_ip(mut self, network_id: &str, addr: &str) -> Self {
        self.endpoint.virtual_ips.push(VirtualIP {
            network_id: network_id.to_string(),
            addr: addr.to_string(),
        });
        self
    }

    /// One task per node rather than numbered replicas
    pub fn is_global(&self) -> bool {
        matches!(
            self.spec.mode,
            Some(ServiceMode::Global {}) | Some(ServiceMode::GlobalJob {})
        )
    }

    /// Endpoint resolution mode, from the spec or the live endpoint
    pub fn resolution_mode(&self) -> ResolutionMode {
        self.spec
            .endpoint_spec
            .as_ref()
            .and_then(|spec| spec.mode)
            .or_else(|| self.endpoint.spec.as_ref().and_then(|spec| spec.mode))
            .unwrap_or_default()
    }
}

/// Service specification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceSpec {
    /// Service name
    pub name: String,
    /// Labels
    #[serde(deserialize_with = "nullable")]
    pub labels: HashMap<String, String>,
    /// Service mode
    pub mode: Option<ServiceMode>,
    /// Endpoint specification
    pub endpoint_spec: Option<EndpointSpec>,
}

/// Service mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceMode {
    /// Replicated service
    Replicated {
        #[serde(rename = "Replicas", default)]
        replicas: u64,
    },
    /// Global service (one per node)
    Global {},
    /// Replicated job
    ReplicatedJob {
        #[serde(rename = "MaxConcurrent", default)]
        max_concurrent: u64,
        #[serde(rename = "TotalCompletions", default)]
        total_completions: u64,
    },
    /// Global job
    GlobalJob {},
}

/// How the service name resolves for clients
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    /// One virtual IP per network
    #[default]
    Vip,
    /// DNS round-robin over task addresses, no virtual IP
    Dnsrr,
}

/// Endpoint specification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EndpointSpec {
    /// Mode (vip, dnsrr)
    pub mode: Option<ResolutionMode>,
}

/// Endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Endpoint {
    /// Spec
    pub spec: Option<EndpointSpec>,
    /// Virtual IPs
    #[serde(rename = "VirtualIPs", deserialize_with = "nullable")]
    pub virtual_ips: Vec<VirtualIP>,
}

/// Virtual IP
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualIP {
    /// Network ID
    #[serde(rename = "NetworkID")]
    pub network_id: String,
    /// Address in CIDR notation
    #[serde(rename = "Addr")]
    pub addr: String,
}
