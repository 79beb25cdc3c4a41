//! Concrete hypervisor backends

pub mod virsh;

pub use virsh::VirshProvider;
