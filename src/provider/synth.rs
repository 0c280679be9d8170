//! Configuration synthesis
//!
//! Folds eligible units into frontends and backends. Every pass builds a
//! fresh [`Configuration`]; nothing is carried over between passes.

use super::config::ProviderConfig;
use super::extract;
use super::filter::container_filter;
use crate::dynamic::{Backend, Configuration, Frontend, Route, Server};
use crate::unit::Unit;
use std::collections::BTreeMap;
use std::fmt::Debug;
use tracing::{debug, warn};

/// Build the routing configuration for one inventory snapshot
///
/// Units are filtered here; the input order decides which unit defines the
/// policy of a shared backend.
pub fn load_config(units: &[Unit], config: &ProviderConfig) -> Configuration {
    let mut frontends = BTreeMap::new();
    let mut backends: BTreeMap<String, Backend> = BTreeMap::new();

    for unit in units.iter().filter(|unit| container_filter(unit, config)) {
        let Some(url) = extract::server_url(unit) else {
            warn!(unit = %unit.name, "Skipping unit without a reachable address");
            continue;
        };

        let frontend_name = extract::frontend_name(unit, config);
        let backend_key = format!("backend-{}", extract::backend_name(unit));

        let mut routes = BTreeMap::new();
        routes.insert(
            format!("route-frontend-{}", frontend_name),
            Route {
                rule: extract::frontend_rule(unit, config),
            },
        );

        let frontend_key = format!("frontend-{}", frontend_name);
        let frontend = Frontend {
            backend: backend_key.clone(),
            pass_host_header: extract::pass_host_header(unit),
            priority: extract::priority(unit),
            entry_points: extract::entry_points(unit),
            basic_auth: extract::basic_auth(unit),
            routes,
        };
        if frontends.insert(frontend_key.clone(), frontend).is_some() {
            debug!(unit = %unit.name, frontend = %frontend_key, "Frontend replaced by later unit");
        }

        let server = Server {
            url,
            weight: extract::weight(unit),
        };

        match backends.get_mut(&backend_key) {
            Some(backend) => {
                merge_policy(
                    unit,
                    &backend_key,
                    "circuit breaker",
                    &mut backend.circuit_breaker,
                    extract::circuit_breaker(unit),
                );
                merge_policy(
                    unit,
                    &backend_key,
                    "load balancer",
                    &mut backend.load_balancer,
                    extract::load_balancer(unit),
                );
                merge_policy(
                    unit,
                    &backend_key,
                    "max connections",
                    &mut backend.max_conn,
                    extract::max_conn(unit),
                );
                backend.servers.insert(format!("server-{}", unit.name), server);
            }
            None => {
                let mut servers = BTreeMap::new();
                servers.insert(format!("server-{}", unit.name), server);
                backends.insert(
                    backend_key,
                    Backend {
                        servers,
                        circuit_breaker: extract::circuit_breaker(unit),
                        load_balancer: extract::load_balancer(unit),
                        max_conn: extract::max_conn(unit),
                    },
                );
            }
        }
    }

    Configuration {
        frontends,
        backends,
    }
}

/// Backend policy comes from whichever contributing unit declares it
/// first; later declarations that disagree are reported and ignored.
fn merge_policy<T: PartialEq + Debug>(
    unit: &Unit,
    backend: &str,
    kind: &str,
    current: &mut Option<T>,
    declared: Option<T>,
) {
    let Some(declared) = declared else {
        return;
    };

    match current {
        None => *current = Some(declared),
        Some(existing) if *existing != declared => warn!(
            unit = %unit.name,
            backend,
            "Ignoring conflicting {} {:?}, keeping {:?}",
            kind,
            declared,
            existing
        ),
        Some(_) => {}
    }
}
