//! Eligibility of units for exposure

use super::config::ProviderConfig;
use super::extract;
use crate::unit::labels::{parse_bool, ENABLE, FRONTEND_RULE};
use crate::unit::Unit;
use tracing::debug;

/// Health status of a container that may receive traffic
const HEALTHY: &str = "healthy";

/// Decide whether a unit is exposed at all
pub fn container_filter(unit: &Unit, config: &ProviderConfig) -> bool {
    if extract::port(unit).is_none() {
        debug!(unit = %unit.name, "Filtering unit without port and no port label");
        return false;
    }

    if !is_enabled(unit, config.exposed_by_default) {
        debug!(unit = %unit.name, "Filtering disabled unit");
        return false;
    }

    if let Some(health) = unit.health.as_deref() {
        if health != HEALTHY {
            debug!(unit = %unit.name, health, "Filtering unhealthy or starting unit");
            return false;
        }
    }

    if unit.get_label(FRONTEND_RULE).is_err() && extract::domain(unit, config).is_empty() {
        debug!(unit = %unit.name, "Filtering unit without frontend rule and no domain");
        return false;
    }

    true
}

/// Exposure gate: an `enable` label decides on its own, only an explicit
/// false excludes; without the label the provider default applies.
fn is_enabled(unit: &Unit, exposed_by_default: bool) -> bool {
    match unit.get_label(ENABLE) {
        Ok(value) => parse_bool(value) != Some(false),
        Err(_) => exposed_by_default,
    }
}
