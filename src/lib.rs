//! kinesis-emitter - producer-side Kinesis adapter
//!
//! Publishes opaque event records to a Kinesis stream, guaranteeing the
//! stream exists and is ACTIVE before the first publish:
//! - Resolves one of four credential strategies from the configured key pair
//! - Ensures the target stream exists (creating and polling it if absent)
//! - Publishes records on a bounded worker pool with per-record completion
//!   callbacks
//!
//! Event serialization, the ingestion front-end, and metric export are the
//! host application's concern: payloads arrive here as [`bytes::Bytes`] and
//! metrics go through the `metrics` facade.
//!
//! ```no_run
//! use kinesis_emitter::{bootstrap, EmitterConfig, PublishOutcome};
//!
//! # async fn run() -> Result<(), kinesis_emitter::EmitterError> {
//! let config = EmitterConfig::from_env()?;
//! let (_handle, publisher) = bootstrap(&config).await?;
//!
//! publisher.publish(
//!     bytes::Bytes::from_static(b"{\"kind\":\"signup\"}"),
//!     "user-1234",
//!     |outcome| {
//!         if let PublishOutcome::Failure { message } = outcome {
//!             tracing::warn!(message, "record dropped");
//!         }
//!     },
//! );
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

pub mod config;
pub mod credentials;
pub mod error;
pub mod metrics;
pub mod publish;
pub mod stream;

pub use config::EmitterConfig;
pub use credentials::CredentialMode;
pub use error::EmitterError;
pub use publish::{AsyncPublisher, PublishOutcome};
pub use stream::{PutAck, StreamApi, StreamClient, StreamHandle, StreamLifecycle, StreamState};

/// Wire up the full publish path from configuration.
///
/// Resolves credentials, connects the service client, ensures the configured
/// stream is active (creating it if absent), and starts the publisher pool.
/// Fails fatally on configuration errors and on a missed activation
/// deadline — the process must not accept publish calls without a
/// confirmed-active handle.
pub async fn bootstrap(
    config: &EmitterConfig,
) -> Result<(StreamHandle, AsyncPublisher), EmitterError> {
    metrics::describe();

    let client = Arc::new(StreamClient::connect(config).await?);
    let lifecycle = StreamLifecycle::new(client, config.endpoint.clone(), config.poll_interval);

    let handle = lifecycle
        .ensure_active(&config.stream_name, config.shard_count, config.activation_timeout)
        .await?;

    let publisher = AsyncPublisher::new(handle.clone(), config.pool_size);

    Ok((handle, publisher))
}
