//! Swarm task resolution
//!
//! Expands a Swarm service into one unit per running task. Replicated
//! tasks are named `<service>.<slot>`, global tasks `<service>.<task id>`.

use super::service::{ResolutionMode, Service};
use super::task::Task;
use crate::docker::OrchestratorClient;
use crate::error::Result;
use crate::network::{strip_cidr, NetworkRegistry};
use crate::unit::{scoped_labels, Unit};
use tracing::debug;

/// Build the service-level unit
///
/// In VIP mode the unit carries the service's virtual IP on every known
/// network; in DNS round-robin mode it has no address of its own.
pub fn parse_service(service: &Service, networks: &NetworkRegistry, label_prefix: &str) -> Unit {
    let mut unit =
        Unit::new(&service.spec.name).labels(scoped_labels(&service.spec.labels, label_prefix));

    match service.resolution_mode() {
        ResolutionMode::Vip => {
            for vip in &service.endpoint.virtual_ips {
                match networks.name(&vip.network_id) {
                    Some(name) => unit = unit.network(name, strip_cidr(&vip.addr)),
                    None => debug!(
                        service = %service.spec.name,
                        network = %vip.network_id,
                        "Virtual IP on unknown network"
                    ),
                }
            }
        }
        ResolutionMode::Dnsrr => {
            debug!(service = %service.spec.name, "DNS round-robin service has no virtual IP");
        }
    }

    unit
}

/// Build the unit for one task of a service
pub fn parse_task(
    task: &Task,
    service_unit: &Unit,
    networks: &NetworkRegistry,
    is_global: bool,
) -> Unit {
    let name = match (is_global, task.slot) {
        (false, Some(slot)) => format!("{}.{}", service_unit.name, slot),
        _ => format!("{}.{}", service_unit.name, task.id),
    };

    let mut unit = Unit::new(&name)
        .service_name(&service_unit.name)
        .labels(service_unit.labels.clone());
    unit.ports = service_unit.ports.clone();

    for attachment in &task.networks_attachments {
        let Some(addr) = attachment.addresses.first() else {
            continue;
        };
        let network_name = networks.name(&attachment.network.id).or_else(|| {
            attachment
                .network
                .spec
                .as_ref()
                .map(|spec| spec.name.as_str())
                .filter(|name| !name.is_empty())
        });
        if let Some(network_name) = network_name {
            unit = unit.network(network_name, strip_cidr(addr));
        }
    }

    unit
}

/// Units for the running tasks of a service, in the client's order
///
/// Tasks in any other state are dropped. Client errors are returned as-is.
pub async fn list_tasks<C: OrchestratorClient>(
    client: &C,
    service_id: &str,
    service_unit: &Unit,
    networks: &NetworkRegistry,
    is_global: bool,
) -> Result<Vec<Unit>> {
    let tasks = client.list_tasks(service_id).await?;

    Ok(tasks
        .iter()
        .filter(|task| {
            if !task.is_running() {
                debug!(
                    service = %service_unit.name,
                    task = %task.id,
                    state = ?task.status.state,
                    "Skipping task that is not running"
                );
            }
            task.is_running()
        })
        .map(|task| parse_task(task, service_unit, networks, is_global))
        .collect())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::container::ContainerJson;
    use crate::error::ProviderError;
    use crate::network::NetworkResource;
    use crate::swarm::task::TaskState;
    use crate::swarm::ServiceMode;

    /// In-memory orchestrator
    #[derive(Default)]
    pub(crate) struct FakeClient {
        pub containers: Vec<ContainerJson>,
        pub services: Vec<Service>,
        pub tasks: Vec<Task>,
        pub networks: Vec<NetworkResource>,
        pub fail: bool,
    }

    impl FakeClient {
        fn check(&self) -> Result<()> {
            if self.fail {
                return Err(ProviderError::OrchestratorQuery("engine unavailable".to_string()));
            }
            Ok(())
        }
    }

    impl OrchestratorClient for FakeClient {
        async fn list_containers(&self) -> Result<Vec<ContainerJson>> {
            self.check()?;
            Ok(self.containers.clone())
        }

        async fn list_services(&self) -> Result<Vec<Service>> {
            self.check()?;
            Ok(self.services.clone())
        }

        async fn list_tasks(&self, service_id: &str) -> Result<Vec<Task>> {
            self.check()?;
            Ok(self
                .tasks
                .iter()
                .filter(|t| t.service_id.is_empty() || t.service_id == service_id)
                .cloned()
                .collect())
        }

        async fn list_networks(&self) -> Result<Vec<NetworkResource>> {
            self.check()?;
            Ok(self.networks.clone())
        }
    }

    fn registry(entries: &[(&str, &str)]) -> NetworkRegistry {
        NetworkRegistry::new(
            entries
                .iter()
                .map(|(id, name)| NetworkResource::new(id, name)),
        )
    }

    #[test]
    fn test_parse_service_ip_address() {
        let dnsrr = Service::new("s", "svc").endpoint_mode(ResolutionMode::Dnsrr);
        let unit = parse_service(&dnsrr, &registry(&[]), "traefik");
        assert!(unit.networks.is_empty());

        let vip = Service::new("s", "svc")
            .endpoint_mode(ResolutionMode::Vip)
            .virtual_ip("1", "10.11.12.13/24");
        let unit = parse_service(&vip, &registry(&[("1", "foo")]), "traefik");
        assert_eq!(unit.networks["foo"], "10.11.12.13");

        let labelled = Service::new("s", "svc")
            .label("traefik.docker.network", "barnet")
            .endpoint_mode(ResolutionMode::Vip)
            .virtual_ip("1", "10.11.12.13/24")
            .virtual_ip("2", "10.11.12.99/24");
        let unit = parse_service(
            &labelled,
            &registry(&[("1", "foonet"), ("2", "barnet")]),
            "traefik",
        );
        assert_eq!(unit.labels["docker.network"], "barnet");
        assert_eq!(
            crate::provider::extract::ip_address(&unit).as_deref(),
            Some("10.11.12.99")
        );
    }

    #[test]
    fn test_parse_service_skips_unknown_networks() {
        let service = Service::new("s", "svc").virtual_ip("9", "10.0.0.9/24");
        let unit = parse_service(&service, &registry(&[("1", "foo")]), "traefik");
        assert!(unit.networks.is_empty());
    }

    #[test]
    fn test_task_names() {
        let service = Service::new("s", "container");
        let service_unit = parse_service(&service, &registry(&[("1", "foo")]), "traefik");
        let empty = registry(&[]);

        for slot in 1..=3 {
            let task = Task::new(&format!("id{}", slot)).slot(slot);
            let unit = parse_task(&task, &service_unit, &empty, false);
            assert_eq!(unit.name, format!("container.{}", slot));
            assert_eq!(unit.service_name, "container");
        }

        for id in ["id1", "id2", "id3"] {
            let unit = parse_task(&Task::new(id), &service_unit, &empty, true);
            assert_eq!(unit.name, format!("container.{}", id));
        }
    }

    #[test]
    fn test_task_inherits_labels_and_gets_own_address() {
        let service = Service::new("s", "web").label("traefik.port", "8080");
        let networks = registry(&[("n1", "front")]);
        let service_unit = parse_service(&service, &networks, "traefik");

        let task = Task::new("t1")
            .slot(2)
            .attachment("n1", "10.0.1.7/24")
            .attachment("unknown", "10.9.9.9/24");
        let unit = parse_task(&task, &service_unit, &networks, false);

        assert_eq!(unit.name, "web.2");
        assert_eq!(unit.labels["port"], "8080");
        assert_eq!(unit.networks.len(), 1);
        assert_eq!(unit.networks["front"], "10.0.1.7");
    }

    #[tokio::test]
    async fn test_list_tasks_keeps_running_only() {
        let service = Service::new("s", "container").mode(ServiceMode::Replicated { replicas: 5 });
        let networks = registry(&[("1", "foo")]);
        let service_unit = parse_service(&service, &networks, "traefik");

        let client = FakeClient {
            tasks: vec![
                Task::new("id1").slot(1).state(TaskState::Running),
                Task::new("id2").slot(2).state(TaskState::Pending),
                Task::new("id3").slot(3).state(TaskState::Unknown),
                Task::new("id4").slot(4).state(TaskState::Running),
                Task::new("id5").slot(5).state(TaskState::Failed),
            ],
            ..FakeClient::default()
        };

        let units = list_tasks(&client, &service.id, &service_unit, &registry(&[]), false)
            .await
            .unwrap();
        let names: Vec<&str> = units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["container.1", "container.4"]);
    }

    #[tokio::test]
    async fn test_list_tasks_surfaces_client_error() {
        let service_unit = Unit::new("container");
        let client = FakeClient {
            fail: true,
            ..FakeClient::default()
        };

        let result = list_tasks(&client, "s", &service_unit, &registry(&[]), false).await;
        assert!(matches!(result, Err(ProviderError::OrchestratorQuery(_))));
    }
}
