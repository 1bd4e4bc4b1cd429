//! Stream lifecycle management
//!
//! Stream creation on the service side is asynchronous and eventually
//! consistent. [`StreamLifecycle::ensure_active`] hides that latency behind
//! one blocking call with a single caller-supplied deadline: when it returns
//! a [`StreamHandle`], the stream is confirmed ACTIVE and publish-ready.
//! There is no retry above this layer — a deadline miss is fatal to
//! initialization and the caller must restart it.

use crate::error::EmitterError;
use crate::metrics;
use crate::stream::client::{PutAck, StreamApi, StreamState};
use bytes::Bytes;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Handle to a confirmed-active stream
///
/// Only [`StreamLifecycle::ensure_active`] constructs one, so holding a
/// handle is proof the readiness check passed. Cheap to clone; immutable.
#[derive(Clone)]
pub struct StreamHandle {
    stream_name: Arc<str>,
    endpoint: Option<Arc<str>>,
    api: Arc<dyn StreamApi>,
}

impl StreamHandle {
    /// Name of the bound stream
    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Endpoint override the underlying client uses, if any
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub(crate) async fn put_record(
        &self,
        partition_key: &str,
        payload: Bytes,
    ) -> Result<PutAck, EmitterError> {
        self.api
            .put_record(&self.stream_name, partition_key, payload)
            .await
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle")
            .field("stream_name", &self.stream_name)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// Ensures a named stream exists and is active before anything publishes
pub struct StreamLifecycle {
    api: Arc<dyn StreamApi>,
    endpoint: Option<String>,
    poll_interval: Duration,
}

impl StreamLifecycle {
    /// Create a lifecycle manager over a service client.
    ///
    /// `poll_interval` is the pause between readiness polls; the deadline is
    /// supplied per call so both knobs stay observable.
    pub fn new(api: Arc<dyn StreamApi>, endpoint: Option<String>, poll_interval: Duration) -> Self {
        Self {
            api,
            endpoint,
            poll_interval,
        }
    }

    /// Check whether the stream exists and is active.
    ///
    /// Absence is `Ok(false)`, never an error. Exceeding `timeout` is a
    /// `Timeout` error, distinct from absence.
    pub async fn exists(&self, stream: &str, timeout: Duration) -> Result<bool, EmitterError> {
        let deadline = Instant::now() + timeout;
        let state = self
            .bounded(stream, "describe", deadline, self.api.describe(stream))
            .await?;

        let active = state.map(StreamState::is_active).unwrap_or(false);
        debug!(stream, ?state, active, "Stream existence check");
        Ok(active)
    }

    /// Ensure the stream exists and is active, creating it if absent.
    ///
    /// One deadline covers the whole operation: existence check, the single
    /// creation request, and the readiness poll loop. On success the
    /// returned handle is bound to a confirmed-active stream.
    pub async fn ensure_active(
        &self,
        stream: &str,
        shard_count: u32,
        timeout: Duration,
    ) -> Result<StreamHandle, EmitterError> {
        let started = Instant::now();
        let deadline = started + timeout;

        if self
            .bounded(stream, "describe", deadline, self.api.describe(stream))
            .await?
            .map(StreamState::is_active)
            .unwrap_or(false)
        {
            info!(stream, "Stream already active");
            return Ok(self.handle(stream));
        }

        info!(stream, shard_count, "Creating stream");
        self.bounded(stream, "create", deadline, self.api.create(stream, shard_count))
            .await?;
        metrics::record_stream_created();

        loop {
            let state = self
                .bounded(stream, "readiness poll", deadline, self.api.describe(stream))
                .await?;

            if state.map(StreamState::is_active).unwrap_or(false) {
                info!(
                    stream,
                    waited_ms = started.elapsed().as_millis() as u64,
                    "Stream active"
                );
                return Ok(self.handle(stream));
            }

            debug!(stream, ?state, "Stream not yet active");

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }

        let err = EmitterError::Timeout {
            stream: stream.to_string(),
            operation: "stream activation",
            waited: started.elapsed(),
        };
        metrics::record_error(err.error_type_label());
        Err(err)
    }

    fn handle(&self, stream: &str) -> StreamHandle {
        StreamHandle {
            stream_name: Arc::from(stream),
            endpoint: self.endpoint.as_deref().map(Arc::from),
            api: Arc::clone(&self.api),
        }
    }

    /// Run one service call bounded by what remains of the deadline.
    async fn bounded<T>(
        &self,
        stream: &str,
        operation: &'static str,
        deadline: Instant,
        call: impl Future<Output = Result<T, EmitterError>>,
    ) -> Result<T, EmitterError> {
        let timeout_err = |waited| {
            let err = EmitterError::Timeout {
                stream: stream.to_string(),
                operation,
                waited,
            };
            metrics::record_error(err.error_type_label());
            err
        };

        let now = Instant::now();
        if now >= deadline {
            return Err(timeout_err(Duration::ZERO));
        }

        match tokio::time::timeout(deadline - now, call).await {
            Ok(result) => result,
            Err(_) => Err(timeout_err(now.elapsed())),
        }
    }
}
