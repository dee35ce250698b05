pub mod scheduler;
pub mod service;

pub use scheduler::MonitorScheduler;
pub use service::{ServiceConfig, StatsService, StatsUpdate};
