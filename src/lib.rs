//! Dockroute - label-driven routing configuration for Docker and Swarm
//!
//! Dockroute watches a Docker Engine (or Swarm manager) and turns the
//! routing labels on containers and services into a reverse-proxy
//! configuration of frontends and backends:
//!
//! - Container discovery, one unit per container
//! - Swarm discovery, one unit per running task or per service VIP
//! - Eligibility filtering (enable label, ports, health, routing rule)
//! - Deterministic frontend/backend synthesis
//! - Polling with change-only publication

pub mod container;
pub mod docker;
pub mod dynamic;
pub mod error;
pub mod network;
pub mod provider;
pub mod swarm;
pub mod unit;

pub use error::{ProviderError, Result};
