//! Network records
//!
//! This module resolves the network IDs used by Swarm to network names.

pub mod config;

pub use config::{strip_cidr, NetworkDriver, NetworkRegistry, NetworkResource};
