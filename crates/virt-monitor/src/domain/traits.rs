//! Traits for hypervisor connections and domain queries

use std::collections::HashMap;

use error_stack::Report;

use super::error::MonitorError;
use super::error::QueryError;

/// One aggregate CPU statistics snapshot, in nanoseconds.
pub type CpuStats = HashMap<String, u64>;

/// Named memory counters, as reported by the balloon driver.
pub type MemoryStats = HashMap<String, u64>;

/// Interface counters in fixed order:
/// rx bytes, rx packets, rx errors, rx drops,
/// tx bytes, tx packets, tx errors, tx drops.
pub type InterfaceStats = [i64; 8];

/// Block device counters in fixed order:
/// read requests, read bytes, write requests, write bytes, errors.
pub type BlockStats = [i64; 5];

/// Opens connections to a hypervisor management endpoint.
pub trait ConnectionProvider {
    /// Open a new, independent connection.
    ///
    /// The connection is released when the returned value is dropped.
    ///
    /// # Errors
    ///
    /// - [`MonitorError::ConnectionFailed`] if the endpoint is unreachable
    fn open(&self) -> Result<Box<dyn Connection>, Report<MonitorError>>;
}

/// A live hypervisor connection.
pub trait Connection {
    /// Resolve a domain by identifier.
    ///
    /// # Errors
    ///
    /// - [`MonitorError::NotFound`] if the identifier does not resolve
    fn lookup(&self, target_id: &str) -> Result<Box<dyn DomainHandle + '_>, Report<MonitorError>>;
}

/// Read-only queries against one resolved domain.
pub trait DomainHandle {
    /// Raw XML descriptor document.
    fn descriptor_xml(&self) -> Result<String, Report<QueryError>>;

    /// Aggregate CPU statistics; may be empty for an inactive domain.
    fn cpu_stats(&self) -> Result<Vec<CpuStats>, Report<QueryError>>;

    /// Current virtual CPU count.
    fn vcpu_count(&self) -> Result<u32, Report<QueryError>>;

    fn memory_stats(&self) -> Result<MemoryStats, Report<QueryError>>;

    fn interface_stats(&self, device: &str) -> Result<InterfaceStats, Report<QueryError>>;

    fn block_stats(&self, device: &str) -> Result<BlockStats, Report<QueryError>>;
}
