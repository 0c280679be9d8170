//! Engine API client

use super::OrchestratorClient;
use crate::container::{ContainerJson, ContainerSummary};
use crate::error::{ProviderError, Result};
use crate::network::NetworkResource;
use crate::provider::ProviderConfig;
use crate::swarm::{Service, Task};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

/// Docker Engine API client over HTTP
#[derive(Clone)]
pub struct DockerClient {
    /// Base URL including the optional version segment
    base_url: String,
    /// HTTP client
    client: reqwest::Client,
}

impl DockerClient {
    /// Create a client for the configured endpoint
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("dockroute/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::OrchestratorQuery(e.to_string()))?;

        let base_url = match &config.api_version {
            Some(version) => format!(
                "{}/v{}",
                config.endpoint.trim_end_matches('/'),
                version.trim_start_matches('v')
            ),
            None => config.endpoint.trim_end_matches('/').to_string(),
        };

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, path: &str, query: &[(&str, String)]) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        Ok(self.client.get(&url).query(query).send().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self.send(path, query).await?;
        read_json(path, response).await
    }

    /// Inspect one container, `None` when it no longer exists
    async fn inspect_container(&self, id: &str) -> Result<Option<ContainerJson>> {
        let path = format!("/containers/{}/json", id);
        let response = self.send(&path, &[]).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(&path, response).await.map(Some)
    }
}

async fn read_json<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::OrchestratorQuery(format!(
            "GET {} returned {}: {}",
            path,
            status,
            body.trim()
        )));
    }

    Ok(response.json().await?)
}

impl OrchestratorClient for DockerClient {
    async fn list_containers(&self) -> Result<Vec<ContainerJson>> {
        let summaries: Vec<ContainerSummary> = self.get_json("/containers/json", &[]).await?;

        let mut containers = Vec::with_capacity(summaries.len());
        for summary in summaries {
            match self.inspect_container(&summary.id).await? {
                Some(container) => containers.push(container),
                // Removed between list and inspect.
                None => warn!(container = %summary.id, "Container vanished before inspect"),
            }
        }

        Ok(containers)
    }

    async fn list_services(&self) -> Result<Vec<Service>> {
        self.get_json("/services", &[]).await
    }

    async fn list_tasks(&self, service_id: &str) -> Result<Vec<Task>> {
        let filters = json!({
            "service": [service_id],
            "desired-state": ["running"],
        });
        self.get_json("/tasks", &[("filters", filters.to_string())])
            .await
    }

    async fn list_networks(&self) -> Result<Vec<NetworkResource>> {
        self.get_json("/networks", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Minimal Engine API stand-in answering fixed `(path, status, body)` routes
    async fn serve(routes: Vec<(&'static str, u16, &'static str)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let routes = routes.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let mut read = 0;
                    loop {
                        let n = stream.read(&mut buf[read..]).await.unwrap();
                        if n == 0 {
                            return;
                        }
                        read += n;
                        if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }

                    let request = String::from_utf8_lossy(&buf[..read]).to_string();
                    let target = request.split_whitespace().nth(1).unwrap_or("");
                    let path = target.split('?').next().unwrap_or("");
                    let (status, body) = routes
                        .iter()
                        .find(|(route, _, _)| *route == path)
                        .map(|(_, status, body)| (*status, *body))
                        .unwrap_or((404, r#"{"message":"no such route"}"#));

                    let response = format!(
                        "HTTP/1.1 {} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    stream.write_all(response.as_bytes()).await.unwrap();
                    let _ = stream.shutdown().await;
                });
            }
        });

        format!("http://{}", addr)
    }

    const LIST: &str = r#"[{"Id": "a", "Names": ["/a"], "State": "running"}, {"Id": "b", "Names": ["/b"], "State": "running"}]"#;
    const INSPECT_A: &str = r#"{"Id": "a", "Name": "/a", "Config": {"Labels": {"traefik.port": "80"}}}"#;

    #[test]
    fn test_base_url() {
        let config = ProviderConfig::default().endpoint("http://docker:2375/");
        let client = DockerClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://docker:2375");

        let mut versioned = config.clone();
        versioned.api_version = Some("v1.41".to_string());
        let client = DockerClient::new(&versioned).unwrap();
        assert_eq!(client.base_url(), "http://docker:2375/v1.41");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_query_error() {
        let config = ProviderConfig::default().endpoint("http://127.0.0.1:1");
        let client = DockerClient::new(&config).unwrap();

        let result = client.list_networks().await;
        assert!(matches!(result, Err(ProviderError::OrchestratorQuery(_))));
    }

    #[tokio::test]
    async fn test_inspect_failure_fails_listing() {
        let endpoint = serve(vec![
            ("/containers/json", 200, LIST),
            ("/containers/a/json", 200, INSPECT_A),
            ("/containers/b/json", 500, r#"{"message":"server error"}"#),
        ])
        .await;
        let client = DockerClient::new(&ProviderConfig::default().endpoint(&endpoint)).unwrap();

        let result = client.list_containers().await;
        assert!(matches!(result, Err(ProviderError::OrchestratorQuery(_))));
    }

    #[tokio::test]
    async fn test_vanished_container_is_skipped() {
        let endpoint = serve(vec![
            ("/containers/json", 200, LIST),
            ("/containers/a/json", 200, INSPECT_A),
            ("/containers/b/json", 404, r#"{"message":"No such container: b"}"#),
        ])
        .await;
        let client = DockerClient::new(&ProviderConfig::default().endpoint(&endpoint)).unwrap();

        let containers = client.list_containers().await.unwrap();
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].id, "a");
        assert_eq!(containers[0].config.labels["traefik.port"], "80");
    }
}
