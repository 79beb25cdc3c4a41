//! One collection cycle against a single domain

use error_stack::Report;
use error_stack::ResultExt;

use crate::collector::CollectorRegistry;
use crate::collector::DomainDescriptor;
use crate::collector::MetricContext;
use crate::collector::MetricReport;
use crate::collector::BUILTIN_COLLECTORS;
use crate::domain::ConnectionProvider;
use crate::domain::MonitorError;

/// Samples one domain through every registered collector.
pub struct Monitor<'r, P> {
    provider: P,
    target_id: String,
    registry: &'r CollectorRegistry,
}

impl<P: ConnectionProvider> Monitor<'static, P> {
    /// Monitor using the built-in collectors.
    pub fn new(provider: P, target_id: impl Into<String>) -> Self {
        Self::with_registry(provider, target_id, &BUILTIN_COLLECTORS)
    }
}

impl<'r, P: ConnectionProvider> Monitor<'r, P> {
    pub fn with_registry(
        provider: P,
        target_id: impl Into<String>,
        registry: &'r CollectorRegistry,
    ) -> Self {
        Self {
            provider,
            target_id: target_id.into(),
            registry,
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Run a full cycle and return the merged report.
    ///
    /// A fresh connection is opened for the cycle and dropped before this
    /// returns, whichever step fails.
    ///
    /// # Errors
    ///
    /// - [`MonitorError::ConnectionFailed`] if the connection cannot be opened
    /// - [`MonitorError::NotFound`] if the target does not resolve
    /// - [`MonitorError::MalformedDescriptor`] if the descriptor cannot be
    ///   fetched or parsed
    /// - [`MonitorError::CollectorFailed`] if any collector fails; no partial
    ///   report is returned
    pub fn collect(&self) -> Result<MetricReport, Report<MonitorError>> {
        let connection = self.provider.open()?;
        tracing::debug!(target_id = %self.target_id, "connection opened");

        let domain = connection.lookup(&self.target_id)?;
        let xml = domain
            .descriptor_xml()
            .change_context(MonitorError::MalformedDescriptor {
                target_id: self.target_id.clone(),
            })?;
        let descriptor = DomainDescriptor::parse(&self.target_id, &xml)?;
        let context = MetricContext::new(&self.target_id, domain.as_ref(), &descriptor);
        tracing::debug!(target_id = %self.target_id, "context built");

        let mut report = MetricReport::new();
        for collector in self.registry.all() {
            let metrics = collector.collect(&context)?;
            tracing::trace!(
                collector = collector.name(),
                metrics = metrics.len(),
                "collector finished"
            );
            report.merge(metrics);
        }

        tracing::debug!(
            target_id = %self.target_id,
            metrics = report.len(),
            "collection finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use error_stack::Report;
    use similar_asserts::assert_eq;
    use test_log::test;

    use super::*;
    use crate::collector::Collector;
    use crate::collector::FieldValue;
    use crate::collector::MetricMap;
    use crate::domain::mock::FakeDomain;
    use crate::domain::mock::FakeHypervisor;
    use crate::domain::QueryError;

    fn first(_: &MetricContext<'_>) -> Result<MetricMap, Report<QueryError>> {
        Ok(MetricMap::from([
            ("a".to_string(), Some(FieldValue::Integer(1))),
            ("k".to_string(), Some(FieldValue::from("from-a"))),
        ]))
    }

    fn second(_: &MetricContext<'_>) -> Result<MetricMap, Report<QueryError>> {
        Ok(MetricMap::from([
            ("b".to_string(), Some(FieldValue::Integer(2))),
            ("k".to_string(), Some(FieldValue::from("from-b"))),
        ]))
    }

    fn failing(_: &MetricContext<'_>) -> Result<MetricMap, Report<QueryError>> {
        Err(Report::new(QueryError::Unavailable {
            message: "boom".to_string(),
        }))
    }

    fn hypervisor() -> FakeHypervisor {
        FakeHypervisor::new().with_domain("vm", FakeDomain::new("<domain/>"))
    }

    #[test]
    fn later_collector_overwrites_in_place() {
        let mut registry = CollectorRegistry::new();
        registry.register(Collector::new("first", first));
        registry.register(Collector::new("second", second));

        let report = Monitor::with_registry(hypervisor(), "vm", &registry)
            .collect()
            .expect("should collect");

        assert_eq!(report.keys().collect::<Vec<_>>(), vec!["a", "k", "b"]);
        assert_eq!(report.get("k"), Some(Some(&FieldValue::from("from-b"))));
    }

    #[test]
    fn collector_failure_aborts_cycle_and_releases_connection() {
        let mut registry = CollectorRegistry::new();
        registry.register(Collector::new("first", first));
        registry.register(Collector::new("failing", failing));
        let hypervisor = hypervisor();

        let err = Monitor::with_registry(hypervisor.clone(), "vm", &registry)
            .collect()
            .err()
            .expect("should fail");

        assert!(matches!(
            err.current_context(),
            MonitorError::CollectorFailed { collector: "failing" }
        ));
        assert_eq!(hypervisor.opened_connections(), 1);
        assert_eq!(hypervisor.live_connections(), 0);
    }

    #[test]
    fn empty_registry_yields_empty_report() {
        let registry = CollectorRegistry::new();
        let report = Monitor::with_registry(hypervisor(), "vm", &registry)
            .collect()
            .expect("should collect");
        assert!(report.is_empty());
    }
}
