//! Routing attribute extraction
//!
//! One function per attribute. Precedence is always: label on the unit,
//! then the provider setting, then the built-in default.

use super::config::ProviderConfig;
use crate::dynamic::{CircuitBreaker, LoadBalancer, MaxConn};
use crate::unit::labels::*;
use crate::unit::Unit;
use tracing::debug;

/// Address used for units sharing the host's network namespace
pub const LOOPBACK: &str = "127.0.0.1";

/// Load-balancing method when only stickiness is requested
pub const DEFAULT_LB_METHOD: &str = "wrr";

/// Backend name, without the `backend-` key prefix
pub fn backend_name(unit: &Unit) -> String {
    unit.get_label_or_default(BACKEND, &unit.service_name).to_string()
}

pub fn domain<'a>(unit: &'a Unit, config: &'a ProviderConfig) -> &'a str {
    unit.get_label_or_default(DOMAIN, &config.domain)
}

/// Routing rule, `Host:<service>.<domain>` unless a label sets one
pub fn frontend_rule(unit: &Unit, config: &ProviderConfig) -> String {
    match unit.get_label(FRONTEND_RULE) {
        Ok(rule) => rule.to_string(),
        Err(_) => format!(
            "Host:{}.{}",
            sub_domain(&unit.service_name),
            domain(unit, config)
        ),
    }
}

/// Frontend name, without the `frontend-` key prefix
pub fn frontend_name(unit: &Unit, config: &ProviderConfig) -> String {
    normalize(&frontend_rule(unit, config))
}

/// Reduce a rule to a name made of alphanumeric runs joined by `-`
///
/// Applying it to its own output returns the same string.
pub fn normalize(rule: &str) -> String {
    rule.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn sub_domain(name: &str) -> String {
    name.trim_start_matches('/').replace('_', "-")
}

pub fn protocol(unit: &Unit) -> &str {
    unit.get_label_or_default(PROTOCOL, "http")
}

pub fn pass_host_header(unit: &Unit) -> bool {
    unit.get_bool_label_or_default(FRONTEND_PASS_HOST_HEADER, true)
}

pub fn priority(unit: &Unit) -> i64 {
    unit.get_int_label_or_default(FRONTEND_PRIORITY, 0)
}

pub fn weight(unit: &Unit) -> u32 {
    unit.get_int_label_or_default(WEIGHT, 0)
}

pub fn entry_points(unit: &Unit) -> Vec<String> {
    split_list(unit, FRONTEND_ENTRY_POINTS)
}

pub fn basic_auth(unit: &Unit) -> Vec<String> {
    split_list(unit, FRONTEND_AUTH_BASIC)
}

/// Comma-separated label as a list without blanks or repeats, in
/// first-seen order
fn split_list(unit: &Unit, key: &str) -> Vec<String> {
    let Ok(value) = unit.get_label(key) else {
        return Vec::new();
    };

    let mut items: Vec<String> = Vec::new();
    for item in value.split(',').map(str::trim) {
        if !item.is_empty() && !items.iter().any(|seen| seen == item) {
            items.push(item.to_string());
        }
    }
    items
}

/// Load-balancer policy, present when a method or stickiness label is set
pub fn load_balancer(unit: &Unit) -> Option<LoadBalancer> {
    let method = unit.get_label(BACKEND_LOADBALANCER_METHOD).ok();
    let sticky = unit.get_label(BACKEND_LOADBALANCER_STICKY).ok();
    if method.is_none() && sticky.is_none() {
        return None;
    }

    Some(LoadBalancer {
        method: method.unwrap_or(DEFAULT_LB_METHOD).to_string(),
        sticky: unit.get_bool_label_or_default(BACKEND_LOADBALANCER_STICKY, false),
    })
}

pub fn circuit_breaker(unit: &Unit) -> Option<CircuitBreaker> {
    unit.get_label(BACKEND_CIRCUITBREAKER_EXPRESSION)
        .ok()
        .map(|expression| CircuitBreaker {
            expression: expression.to_string(),
        })
}

/// Connection limit, present only when amount and extractor are both set
pub fn max_conn(unit: &Unit) -> Option<MaxConn> {
    let labels = unit
        .get_labels(&[BACKEND_MAXCONN_AMOUNT, BACKEND_MAXCONN_EXTRACTORFUNC])
        .ok()?;

    match labels[BACKEND_MAXCONN_AMOUNT].trim().parse::<i64>() {
        Ok(amount) => Some(MaxConn {
            amount,
            extractor_func: labels[BACKEND_MAXCONN_EXTRACTORFUNC].clone(),
        }),
        Err(_) => {
            debug!(
                unit = %unit.name,
                "Ignoring max connections with non-numeric amount {:?}",
                labels[BACKEND_MAXCONN_AMOUNT]
            );
            None
        }
    }
}

/// Use the Swarm virtual IP rather than one server per task
pub fn use_swarm_lb(unit: &Unit) -> bool {
    unit.get_bool_label_or_default(BACKEND_LOADBALANCER_SWARM, false)
}

/// Upstream port
///
/// A numeric `port` label wins; otherwise the lowest declared port. Port 0
/// never resolves.
pub fn port(unit: &Unit) -> Option<u16> {
    if let Ok(value) = unit.get_label(PORT) {
        match value.trim().parse::<u16>() {
            Ok(port) if port != 0 => return Some(port),
            _ => debug!(unit = %unit.name, "Ignoring invalid port label {:?}", value),
        }
    }

    unit.ports.iter().copied().filter(|port| *port != 0).min()
}

/// Upstream address
///
/// Host-networked units always use the loopback address. Otherwise the
/// network named by `docker.network`, then the only network, then the
/// lexicographically first network.
pub fn ip_address(unit: &Unit) -> Option<String> {
    if unit.host_network {
        return Some(LOOPBACK.to_string());
    }

    if let Ok(network) = unit.get_label(DOCKER_NETWORK) {
        if let Some(addr) = unit.networks.get(network) {
            return Some(addr.clone());
        }
        debug!(unit = %unit.name, network, "Labelled network not attached");
    }

    // BTreeMap iteration is sorted, so this covers both the single-network
    // case and the tie-break.
    unit.networks.values().next().cloned()
}

/// `protocol://ip:port`, when both address and port resolve
pub fn server_url(unit: &Unit) -> Option<String> {
    let ip = ip_address(unit)?;
    let port = port(unit)?;
    Some(format!("{}://{}:{}", protocol(unit), ip, port))
}
