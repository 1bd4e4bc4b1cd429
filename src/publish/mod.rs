//! Asynchronous publish path
//!
//! Worker-pool publisher and the per-record completion outcome.

mod publisher;

pub use publisher::{AsyncPublisher, PublishOutcome};
