//! Inventory sources
//!
//! Each source turns one orchestrator inventory snapshot into units. The
//! container and Swarm sources are chosen once, when the provider is built.

use crate::docker::OrchestratorClient;
use crate::error::Result;
use crate::network::NetworkRegistry;
use crate::provider::extract;
use crate::swarm::{list_tasks, parse_service};
use crate::unit::Unit;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Produces the units of one inventory snapshot
pub trait UnitSource: Send + Sync {
    fn units(&self) -> impl Future<Output = Result<Vec<Unit>>> + Send;
}

/// One unit per container
pub struct ContainerSource<C> {
    client: Arc<C>,
    label_prefix: String,
}

impl<C: OrchestratorClient> ContainerSource<C> {
    pub fn new(client: Arc<C>, label_prefix: &str) -> Self {
        Self {
            client,
            label_prefix: label_prefix.to_string(),
        }
    }
}

impl<C: OrchestratorClient> UnitSource for ContainerSource<C> {
    async fn units(&self) -> Result<Vec<Unit>> {
        let containers = self.client.list_containers().await?;
        debug!("Listed {} containers", containers.len());

        Ok(containers
            .iter()
            .map(|container| container.to_unit(&self.label_prefix))
            .collect())
    }
}

/// One unit per running task, or per service when the Swarm load
/// balancer is requested
pub struct SwarmSource<C> {
    client: Arc<C>,
    label_prefix: String,
}

impl<C: OrchestratorClient> SwarmSource<C> {
    pub fn new(client: Arc<C>, label_prefix: &str) -> Self {
        Self {
            client,
            label_prefix: label_prefix.to_string(),
        }
    }
}

impl<C: OrchestratorClient> UnitSource for SwarmSource<C> {
    async fn units(&self) -> Result<Vec<Unit>> {
        let networks = NetworkRegistry::new(self.client.list_networks().await?);
        let services = self.client.list_services().await?;
        debug!(
            "Listed {} services across {} networks",
            services.len(),
            networks.len()
        );

        let mut units = Vec::new();
        for service in &services {
            let service_unit = parse_service(service, &networks, &self.label_prefix);

            if extract::use_swarm_lb(&service_unit) {
                units.push(service_unit);
                continue;
            }

            let tasks = list_tasks(
                self.client.as_ref(),
                &service.id,
                &service_unit,
                &networks,
                service.is_global(),
            )
            .await?;
            units.extend(tasks);
        }

        Ok(units)
    }
}

/// The source selected for this provider
pub enum Discovery<C> {
    Containers(ContainerSource<C>),
    Swarm(SwarmSource<C>),
}

impl<C: OrchestratorClient> Discovery<C> {
    pub fn new(client: Arc<C>, swarm_mode: bool, label_prefix: &str) -> Self {
        if swarm_mode {
            Discovery::Swarm(SwarmSource::new(client, label_prefix))
        } else {
            Discovery::Containers(ContainerSource::new(client, label_prefix))
        }
    }
}

impl<C: OrchestratorClient> UnitSource for Discovery<C> {
    async fn units(&self) -> Result<Vec<Unit>> {
        match self {
            Discovery::Containers(source) => source.units().await,
            Discovery::Swarm(source) => source.units().await,
        }
    }
}
