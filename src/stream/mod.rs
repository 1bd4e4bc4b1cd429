//! Stream service integration
//!
//! The client seam to the stream service plus the startup-time lifecycle
//! step that guarantees the target stream is active before publishing.

mod client;
mod lifecycle;

pub use client::{PutAck, StreamApi, StreamClient, StreamState};
pub use lifecycle::{StreamHandle, StreamLifecycle};
