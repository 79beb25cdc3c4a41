pub mod backend;
pub mod collector;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod monitor;

pub use collector::FieldValue;
pub use collector::MetricReport;
pub use domain::MonitorError;
pub use monitor::Monitor;
