//! Error types for a collection cycle

use thiserror::Error;

/// Errors that abort a collection cycle.
///
/// Every variant is fatal; the monitor never retries or returns a partial
/// report.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Failed to open hypervisor connection: {uri}")]
    ConnectionFailed { uri: String },
    #[error("Domain not found: {target_id}")]
    NotFound { target_id: String },
    #[error("Malformed domain descriptor for {target_id}")]
    MalformedDescriptor { target_id: String },
    #[error("Collector `{collector}` failed")]
    CollectorFailed { collector: &'static str },
}

/// Errors raised by a single query against a domain.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Command `{command}` failed: {message}")]
    CommandFailed { command: String, message: String },
    #[error("Unexpected output from `{command}`: {message}")]
    UnexpectedOutput { command: String, message: String },
    #[error("Query unavailable: {message}")]
    Unavailable { message: String },
    #[error("Unexpected descriptor structure: {message}")]
    InvalidDescriptor { message: String },
}
