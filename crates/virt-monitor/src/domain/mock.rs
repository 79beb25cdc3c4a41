//! In-memory hypervisor used by tests
//!
//! [`FakeHypervisor`] serves [`FakeDomain`]s by identifier and counts how many
//! connections were opened and released, so callers can check that every
//! exit path closes its connection.

use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use error_stack::Report;

use super::error::MonitorError;
use super::error::QueryError;
use super::traits::BlockStats;
use super::traits::Connection;
use super::traits::ConnectionProvider;
use super::traits::CpuStats;
use super::traits::DomainHandle;
use super::traits::InterfaceStats;
use super::traits::MemoryStats;

const FAKE_URI: &str = "fake:///system";

/// Canned answers for one domain.
#[derive(Debug, Clone, Default)]
pub struct FakeDomain {
    pub xml: String,
    pub cpu_stats: Vec<CpuStats>,
    /// `None` makes the vcpu query fail, like an inactive domain.
    pub vcpu_count: Option<u32>,
    pub memory_stats: MemoryStats,
    pub interface_stats: HashMap<String, InterfaceStats>,
    pub block_stats: HashMap<String, BlockStats>,
}

impl FakeDomain {
    pub fn new(xml: impl Into<String>) -> Self {
        Self {
            xml: xml.into(),
            ..Default::default()
        }
    }

    pub fn with_cpu_stats(mut self, stats: CpuStats) -> Self {
        self.cpu_stats.push(stats);
        self
    }

    pub fn with_vcpu_count(mut self, count: u32) -> Self {
        self.vcpu_count = Some(count);
        self
    }

    pub fn with_memory_stat(mut self, name: &str, value: u64) -> Self {
        self.memory_stats.insert(name.to_string(), value);
        self
    }

    pub fn with_interface_stats(mut self, device: &str, stats: InterfaceStats) -> Self {
        self.interface_stats.insert(device.to_string(), stats);
        self
    }

    pub fn with_block_stats(mut self, device: &str, stats: BlockStats) -> Self {
        self.block_stats.insert(device.to_string(), stats);
        self
    }
}

impl DomainHandle for FakeDomain {
    fn descriptor_xml(&self) -> Result<String, Report<QueryError>> {
        Ok(self.xml.clone())
    }

    fn cpu_stats(&self) -> Result<Vec<CpuStats>, Report<QueryError>> {
        Ok(self.cpu_stats.clone())
    }

    fn vcpu_count(&self) -> Result<u32, Report<QueryError>> {
        self.vcpu_count.ok_or_else(|| {
            Report::new(QueryError::Unavailable {
                message: "vcpu count requires an active domain".to_string(),
            })
        })
    }

    fn memory_stats(&self) -> Result<MemoryStats, Report<QueryError>> {
        Ok(self.memory_stats.clone())
    }

    fn interface_stats(&self, device: &str) -> Result<InterfaceStats, Report<QueryError>> {
        self.interface_stats.get(device).copied().ok_or_else(|| {
            Report::new(QueryError::Unavailable {
                message: format!("no interface {device}"),
            })
        })
    }

    fn block_stats(&self, device: &str) -> Result<BlockStats, Report<QueryError>> {
        self.block_stats.get(device).copied().ok_or_else(|| {
            Report::new(QueryError::Unavailable {
                message: format!("no block device {device}"),
            })
        })
    }
}

/// Connection provider backed by a map of [`FakeDomain`]s.
#[derive(Debug, Clone, Default)]
pub struct FakeHypervisor {
    domains: Arc<Mutex<HashMap<String, FakeDomain>>>,
    unreachable: Arc<Mutex<bool>>,
    opened: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl FakeHypervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain(self, target_id: &str, domain: FakeDomain) -> Self {
        self.insert_domain(target_id, domain);
        self
    }

    pub fn insert_domain(&self, target_id: &str, domain: FakeDomain) {
        let mut domains = self.domains.lock().expect("poisoned");
        domains.insert(target_id.to_string(), domain);
    }

    /// Make every subsequent `open` fail.
    pub fn set_unreachable(&self, unreachable: bool) {
        *self.unreachable.lock().expect("poisoned") = unreachable;
    }

    pub fn opened_connections(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released_connections(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Connections opened and not yet dropped.
    pub fn live_connections(&self) -> usize {
        self.opened_connections() - self.released_connections()
    }
}

impl ConnectionProvider for FakeHypervisor {
    fn open(&self) -> Result<Box<dyn Connection>, Report<MonitorError>> {
        if *self.unreachable.lock().expect("poisoned") {
            return Err(Report::new(MonitorError::ConnectionFailed {
                uri: FAKE_URI.to_string(),
            }));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeConnection {
            domains: Arc::clone(&self.domains),
            released: Arc::clone(&self.released),
        }))
    }
}

struct FakeConnection {
    domains: Arc<Mutex<HashMap<String, FakeDomain>>>,
    released: Arc<AtomicUsize>,
}

impl Connection for FakeConnection {
    fn lookup(&self, target_id: &str) -> Result<Box<dyn DomainHandle + '_>, Report<MonitorError>> {
        let domains = self.domains.lock().expect("poisoned");
        match domains.get(target_id) {
            Some(domain) => Ok(Box::new(domain.clone())),
            None => Err(Report::new(MonitorError::NotFound {
                target_id: target_id.to_string(),
            })),
        }
    }
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;
    use test_log::test;

    use super::*;

    #[test]
    fn counts_open_and_release() {
        let hypervisor = FakeHypervisor::new().with_domain("vm-1", FakeDomain::new("<domain/>"));

        {
            let conn = hypervisor.open().expect("should open");
            assert_eq!(hypervisor.live_connections(), 1);
            conn.lookup("vm-1").expect("should resolve");
        }

        assert_eq!(hypervisor.opened_connections(), 1);
        assert_eq!(hypervisor.released_connections(), 1);
    }

    #[test]
    fn unknown_domain_is_not_found() {
        let hypervisor = FakeHypervisor::new();
        let conn = hypervisor.open().expect("should open");

        let err = conn.lookup("missing").err().expect("should fail");
        assert!(matches!(
            err.current_context(),
            MonitorError::NotFound { target_id } if target_id == "missing"
        ));
    }

    #[test]
    fn unreachable_rejects_open() {
        let hypervisor = FakeHypervisor::new();
        hypervisor.set_unreachable(true);

        assert!(hypervisor.open().is_err());
        assert_eq!(hypervisor.opened_connections(), 0);
    }

    #[test]
    fn missing_vcpu_count_is_an_error() {
        let domain = FakeDomain::new("<domain/>");
        assert!(domain.vcpu_count().is_err());
        assert_eq!(domain.with_vcpu_count(4).vcpu_count().expect("count"), 4);
    }
}
