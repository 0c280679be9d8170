//! Label-driven configuration provider
//!
//! Units discovered by a [`UnitSource`] are filtered, interpreted through
//! their routing labels and merged into one [`Configuration`]. The
//! [`Provider`] repeats this on a polling interval and publishes each
//! changed result.
//!
//! [`Configuration`]: crate::dynamic::Configuration

pub mod config;
pub mod extract;
pub mod filter;
pub mod source;
pub mod synth;
pub mod watch;

pub use config::ProviderConfig;
pub use filter::container_filter;
pub use source::{ContainerSource, Discovery, SwarmSource, UnitSource};
pub use synth::load_config;
pub use watch::Provider;
