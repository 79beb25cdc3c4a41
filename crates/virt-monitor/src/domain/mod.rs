//! Boundary between the collection pipeline and the hypervisor
//!
//! The pipeline only talks to the traits in [`traits`]; concrete backends
//! live in `crate::backend`, and [`mock`] provides an in-memory one.

pub mod error;
pub mod mock;
pub mod traits;

pub use error::*;
pub use traits::*;
