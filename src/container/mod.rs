//! Container records
//!
//! Engine API container descriptions and their normalization into units.

pub mod config;

pub use config::{ContainerJson, ContainerSummary};
