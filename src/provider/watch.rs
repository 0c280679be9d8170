//! Polling loop
//!
//! Each cycle takes a full inventory snapshot under a deadline and
//! synthesizes a fresh configuration. A new configuration replaces the
//! published one atomically; a failed cycle publishes nothing.

use super::config::ProviderConfig;
use super::source::{Discovery, UnitSource};
use super::synth::load_config;
use crate::docker::DockerClient;
use crate::dynamic::Configuration;
use crate::error::{ProviderError, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Turns inventory snapshots into published configurations
pub struct Provider<S> {
    source: S,
    config: ProviderConfig,
}

impl Provider<Discovery<DockerClient>> {
    /// Provider talking to the configured Docker endpoint
    pub fn from_config(config: ProviderConfig) -> Result<Self> {
        let client = Arc::new(DockerClient::new(&config)?);
        let source = Discovery::new(client, config.swarm_mode, &config.label_prefix);
        Ok(Self::new(source, config))
    }
}

impl<S: UnitSource> Provider<S> {
    pub fn new(source: S, config: ProviderConfig) -> Self {
        Self { source, config }
    }

    /// Build the configuration for the current inventory
    pub async fn snapshot(&self) -> Result<Configuration> {
        let timeout = self.config.request_timeout();
        let units = tokio::time::timeout(timeout, self.source.units())
            .await
            .map_err(|_| {
                ProviderError::Timeout(format!("inventory snapshot exceeded {:?}", timeout))
            })??;

        debug!("Synthesizing configuration from {} units", units.len());
        Ok(load_config(&units, &self.config))
    }

    /// Poll until shutdown, publishing every configuration that differs
    /// from the last one published
    ///
    /// With `watch` disabled a single cycle runs.
    pub async fn run(
        &self,
        tx: &watch::Sender<Arc<Configuration>>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            let result = tokio::select! {
                _ = shutdown.changed() => break,
                result = self.snapshot() => result,
            };

            match result {
                Ok(config) => publish(tx, config),
                Err(e) => warn!("Skipping provider cycle, keeping previous configuration: {}", e),
            }

            if !self.config.watch {
                break;
            }

            tokio::select! {
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(self.config.refresh_interval()) => {}
            }
        }

        info!("Provider stopped");
    }
}

fn publish(tx: &watch::Sender<Arc<Configuration>>, config: Configuration) {
    let changed = **tx.borrow() != config;
    if !changed {
        debug!("Configuration unchanged");
        return;
    }

    info!(
        frontends = config.frontends.len(),
        backends = config.backends.len(),
        "Publishing new configuration"
    );
    tx.send_replace(Arc::new(config));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerJson;
    use crate::docker::OrchestratorClient;
    use crate::network::NetworkResource;
    use crate::provider::source::ContainerSource;
    use crate::swarm::resolver::tests::FakeClient;
    use crate::swarm::{Service, Task};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn settings() -> ProviderConfig {
        let mut config = ProviderConfig::new("docker.localhost");
        config.watch = false;
        config
    }

    fn provider(client: FakeClient, config: ProviderConfig) -> Provider<ContainerSource<FakeClient>> {
        Provider::new(ContainerSource::new(Arc::new(client), "traefik"), config)
    }

    #[tokio::test]
    async fn test_snapshot_end_to_end() {
        let client = FakeClient {
            containers: vec![ContainerJson::new("/test")
                .port("80/tcp")
                .network("bridge", "127.0.0.1")],
            ..FakeClient::default()
        };

        let config = provider(client, settings()).snapshot().await.unwrap();

        let frontend = &config.frontends["frontend-Host-test-docker-localhost"];
        assert_eq!(frontend.backend, "backend-test");
        assert_eq!(
            frontend.routes["route-frontend-Host-test-docker-localhost"].rule,
            "Host:test.docker.localhost"
        );
        let server = &config.backends["backend-test"].servers["server-test"];
        assert_eq!(server.url, "http://127.0.0.1:80");
        assert_eq!(server.weight, 0);
    }

    #[tokio::test]
    async fn test_run_once_publishes() {
        let client = FakeClient {
            containers: vec![ContainerJson::new("/web")
                .port("8080/tcp")
                .network("bridge", "172.17.0.2")],
            ..FakeClient::default()
        };
        let (tx, rx) = watch::channel(Arc::new(Configuration::default()));
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        provider(client, settings()).run(&tx, shutdown_rx).await;

        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow().backends.contains_key("backend-web"));
    }

    #[tokio::test]
    async fn test_failed_cycle_keeps_previous_configuration() {
        let mut previous = Configuration::default();
        previous
            .backends
            .insert("backend-old".to_string(), Default::default());
        let (tx, rx) = watch::channel(Arc::new(previous));
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let client = FakeClient {
            fail: true,
            ..FakeClient::default()
        };
        provider(client, settings()).run(&tx, shutdown_rx).await;

        assert!(!rx.has_changed().unwrap());
        assert!(rx.borrow().backends.contains_key("backend-old"));
    }

    /// Client whose container listing never answers in time
    struct SlowClient {
        calls: AtomicUsize,
    }

    impl OrchestratorClient for SlowClient {
        async fn list_containers(&self) -> Result<Vec<ContainerJson>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }

        async fn list_services(&self) -> Result<Vec<Service>> {
            Ok(Vec::new())
        }

        async fn list_tasks(&self, _service_id: &str) -> Result<Vec<Task>> {
            Ok(Vec::new())
        }

        async fn list_networks(&self) -> Result<Vec<NetworkResource>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_snapshot_deadline() {
        let mut config = settings();
        config.request_timeout_secs = 1;
        let client = Arc::new(SlowClient {
            calls: AtomicUsize::new(0),
        });
        let provider = Provider::new(ContainerSource::new(client.clone(), "traefik"), config);

        let result = provider.snapshot().await;
        assert!(matches!(result, Err(ProviderError::Timeout(_))));
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_in_flight_cycle() {
        let mut config = settings();
        config.watch = true;
        let client = Arc::new(SlowClient {
            calls: AtomicUsize::new(0),
        });
        let provider = Provider::new(ContainerSource::new(client, "traefik"), config);
        let (tx, rx) = watch::channel(Arc::new(Configuration::default()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let stopper = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            shutdown_tx.send(true).unwrap();
        };
        tokio::join!(provider.run(&tx, shutdown_rx), stopper);

        assert!(!rx.has_changed().unwrap());
    }
}
