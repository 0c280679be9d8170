//! Docker Swarm discovery
//!
//! Service and task records, and the expansion of services into one unit
//! per running task.

pub mod resolver;
pub mod service;
pub mod task;

pub use resolver::{list_tasks, parse_service, parse_task};
pub use service::{ResolutionMode, Service, ServiceMode};
pub use task::{Task, TaskState};
