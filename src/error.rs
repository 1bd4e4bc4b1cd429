//! Domain error types for the Kinesis emitter
//!
//! Structured thiserror types for navigable diagnostics and compile-time
//! exhaustive handling. Every variant carries context fields so a failure
//! can be understood without parsing the message string.
//!
//! Publish failures are deliberately NOT here: a failed record is a value
//! (`PublishOutcome::Failure`) delivered to its completion handler, never an
//! error that can abort the pool.

use std::time::Duration;
use thiserror::Error;

/// Boxed source error from the service client.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Emitter domain errors
///
/// Lifecycle errors (`Config`, `Timeout`) are fatal to initialization: the
/// process must not accept publish calls without a confirmed-active stream
/// handle.
#[derive(Error, Debug)]
pub enum EmitterError {
    /// Configuration error (inconsistent credential tokens, bad env value)
    #[error("configuration error: {0}")]
    Config(String),

    /// A deadline-bounded lifecycle call exceeded its deadline
    #[error("timed out after {waited:?} during {operation} for stream '{stream}'")]
    Timeout {
        stream: String,
        operation: &'static str,
        waited: Duration,
    },

    /// Stream service call failed (anything other than the mapped
    /// not-found / already-exists conditions)
    #[error("stream service {operation} failed for stream '{stream}'")]
    Service {
        stream: String,
        operation: &'static str,
        #[source]
        source: BoxError,
    },
}

impl EmitterError {
    /// Returns a static label string suitable for Prometheus metrics.
    ///
    /// Used as the `error_type` label on `emitter_errors_total`, enabling
    /// per-error-type monitoring and alerting.
    pub fn error_type_label(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Timeout { .. } => "timeout",
            Self::Service { .. } => "service",
        }
    }
}
