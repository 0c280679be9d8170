//! Orchestrator client
//!
//! The inventory queries the provider needs from the Docker engine, and an
//! HTTP implementation of them against the Engine API.

pub mod client;

pub use client::DockerClient;

use crate::container::ContainerJson;
use crate::error::Result;
use crate::network::NetworkResource;
use crate::swarm::{Service, Task};
use serde::{Deserialize, Deserializer};
use std::future::Future;

/// Inventory queries against a container orchestrator
///
/// Calls carry no timeout or retry of their own; the polling loop bounds
/// each snapshot with a deadline.
pub trait OrchestratorClient: Send + Sync {
    /// Inspect every running container
    fn list_containers(&self) -> impl Future<Output = Result<Vec<ContainerJson>>> + Send;

    /// List Swarm services
    fn list_services(&self) -> impl Future<Output = Result<Vec<Service>>> + Send;

    /// List the tasks of one service
    fn list_tasks(&self, service_id: &str) -> impl Future<Output = Result<Vec<Task>>> + Send;

    /// List networks
    fn list_networks(&self) -> impl Future<Output = Result<Vec<NetworkResource>>> + Send;
}

/// Deserialize `null` as the type's default
pub fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
