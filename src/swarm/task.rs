//! Swarm task records

use crate::docker::nullable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Task is new
    #[default]
    New,
    /// Task is pending
    Pending,
    /// Task is assigned
    Assigned,
    /// Task is accepted
    Accepted,
    /// Task is preparing
    Preparing,
    /// Task is ready
    Ready,
    /// Task is starting
    Starting,
    /// Task is running
    Running,
    /// Task completed
    Complete,
    /// Task shutdown
    Shutdown,
    /// Task failed
    Failed,
    /// Task rejected
    Rejected,
    /// Task removed
    Remove,
    /// Task is orphaned
    Orphaned,
    /// Empty or unrecognized state
    #[serde(other)]
    Unknown,
}

/// Swarm task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Task {
    /// Task ID
    #[serde(rename = "ID")]
    pub id: String,
    /// Service ID
    #[serde(rename = "ServiceID")]
    pub service_id: String,
    /// Slot (for replicated services)
    pub slot: Option<u64>,
    /// Node ID
    #[serde(rename = "NodeID")]
    pub node_id: Option<String>,
    /// Task status
    pub status: TaskStatus,
    /// Desired state
    pub desired_state: TaskState,
    /// Network attachments
    #[serde(deserialize_with = "nullable")]
    pub networks_attachments: Vec<NetworkAttachment>,
    /// Created timestamp
    pub created_at: Option<DateTime<Utc>>,
    /// Updated timestamp
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a task record
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    /// Set slot
    pub fn slot(mut self, slot: u64) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Set current state
    pub fn state(mut self, state: TaskState) -> Self {
        self.status.state = state;
        self
    }

    /// Attach to a network
    pub fn attachment(mut self, network_id: &str, addr: &str) -> Self {
        self.networks_attachments.push(NetworkAttachment {
            network: NetworkRef {
                id: network_id.to_string(),
                spec: None,
            },
            addresses: vec![addr.to_string()],
        });
        self
    }

    /// Check if task is running
    pub fn is_running(&self) -> bool {
        self.status.state == TaskState::Running
    }
}

/// Task status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TaskStatus {
    /// Timestamp
    pub timestamp: Option<DateTime<Utc>>,
    /// State
    pub state: TaskState,
    /// Message
    pub message: String,
    /// Error
    pub err: Option<String>,
}

/// Network attachment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NetworkAttachment {
    /// Network
    pub network: NetworkRef,
    /// Addresses in CIDR notation
    #[serde(deserialize_with = "nullable")]
    pub addresses: Vec<String>,
}

/// Network reference
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NetworkRef {
    /// ID
    #[serde(rename = "ID")]
    pub id: String,
    /// Embedded network spec, when the engine includes it
    pub spec: Option<NetworkSpecRef>,
}

/// Embedded network spec
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NetworkSpecRef {
    /// Name
    pub name: String,
}
