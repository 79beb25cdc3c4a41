//! Plugin-style metric collectors
//!
//! Each collector is a plain function over a [`MetricContext`]; the
//! [`CollectorRegistry`] fixes the order in which their outputs are merged.

pub mod context;
pub mod cpu;
pub mod disk;
pub mod identity;
pub mod memory;
pub mod network;
pub mod registry;
pub mod value;

pub use context::DomainDescriptor;
pub use context::MetricContext;
pub use registry::Collector;
pub use registry::CollectorRegistry;
pub use registry::BUILTIN_COLLECTORS;
pub use value::FieldValue;
pub use value::MetricMap;
pub use value::MetricReport;
