//! Ordered registry of collectors

use std::fmt;
use std::sync::LazyLock;

use error_stack::Report;
use error_stack::ResultExt;

use super::context::MetricContext;
use super::value::MetricMap;
use super::{cpu, disk, identity, memory, network};
use crate::domain::MonitorError;
use crate::domain::QueryError;

/// Signature shared by every collector implementation.
pub type CollectFn = fn(&MetricContext<'_>) -> Result<MetricMap, Report<QueryError>>;

/// A named, stateless collector.
#[derive(Clone, Copy)]
pub struct Collector {
    name: &'static str,
    collect: CollectFn,
}

impl Collector {
    pub const fn new(name: &'static str, collect: CollectFn) -> Self {
        Self { name, collect }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Run the collector against `context`.
    ///
    /// # Errors
    ///
    /// - [`MonitorError::CollectorFailed`] wrapping the underlying query error
    pub fn collect(&self, context: &MetricContext<'_>) -> Result<MetricMap, Report<MonitorError>> {
        (self.collect)(context).change_context(MonitorError::CollectorFailed {
            collector: self.name,
        })
    }
}

impl fmt::Debug for Collector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collector").field("name", &self.name).finish()
    }
}

/// Append-only list of collectors. Registration order is merge order.
#[derive(Debug, Default, Clone)]
pub struct CollectorRegistry {
    collectors: Vec<Collector>,
}

impl CollectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `collector` and hand it back unchanged.
    pub fn register(&mut self, collector: Collector) -> Collector {
        self.collectors.push(collector);
        collector
    }

    pub fn all(&self) -> &[Collector] {
        &self.collectors
    }

    /// Registry holding the built-in collectors in their fixed order.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(identity::COLLECTOR);
        registry.register(cpu::COLLECTOR);
        registry.register(memory::COLLECTOR);
        registry.register(network::COLLECTOR);
        registry.register(disk::COLLECTOR);
        registry
    }
}

/// Process-wide built-in registry, assembled on first use and never mutated.
pub static BUILTIN_COLLECTORS: LazyLock<CollectorRegistry> = LazyLock::new(CollectorRegistry::builtin);
