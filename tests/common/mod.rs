//! Shared scripted mock of the stream service for integration tests.

use async_trait::async_trait;
use bytes::Bytes;
use kinesis_emitter::{EmitterError, PutAck, StreamApi, StreamState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a tracing subscriber once per test binary; verbosity is driven
/// by `RUST_LOG` as in the host application.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Scripted stream service mock.
///
/// Describe answers come from a fixed script indexed by call number, with
/// the last entry repeating. Creation and put calls are counted; puts can be
/// gated on a [`Notify`] or forced to fail.
pub struct MockStreamApi {
    describe_script: Vec<Option<StreamState>>,
    pub describe_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub put_calls: AtomicUsize,
    put_gate: Option<Arc<Notify>>,
    fail_puts: bool,
}

impl MockStreamApi {
    fn build(script: Vec<Option<StreamState>>) -> Self {
        Self {
            describe_script: script,
            describe_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            put_calls: AtomicUsize::new(0),
            put_gate: None,
            fail_puts: false,
        }
    }

    /// Stream absent at the existence check, then Creating for `polls`
    /// readiness polls, then Active.
    pub fn absent_until_created(polls: usize) -> Arc<Self> {
        let mut script = vec![None];
        script.extend(vec![Some(StreamState::Creating); polls]);
        script.push(Some(StreamState::Active));
        Arc::new(Self::build(script))
    }

    /// Stream already active.
    pub fn active() -> Arc<Self> {
        Arc::new(Self::build(vec![Some(StreamState::Active)]))
    }

    /// Active stream whose put calls wait on `gate` before answering.
    pub fn active_gated(gate: Arc<Notify>) -> Arc<Self> {
        let mut api = Self::build(vec![Some(StreamState::Active)]);
        api.put_gate = Some(gate);
        Arc::new(api)
    }

    /// Active stream whose put calls all fail.
    pub fn active_failing_puts() -> Arc<Self> {
        let mut api = Self::build(vec![Some(StreamState::Active)]);
        api.fail_puts = true;
        Arc::new(api)
    }

    pub fn total_network_calls(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
            + self.create_calls.load(Ordering::SeqCst)
            + self.put_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamApi for MockStreamApi {
    async fn describe(&self, _stream: &str) -> Result<Option<StreamState>, EmitterError> {
        let call = self.describe_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.describe_script[call.min(self.describe_script.len() - 1)])
    }

    async fn create(&self, _stream: &str, _shard_count: u32) -> Result<(), EmitterError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn put_record(
        &self,
        stream: &str,
        partition_key: &str,
        _payload: Bytes,
    ) -> Result<PutAck, EmitterError> {
        if let Some(ref gate) = self.put_gate {
            gate.notified().await;
        }
        let seq = self.put_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_puts {
            return Err(EmitterError::Service {
                stream: stream.to_string(),
                operation: "put_record",
                source: "provisioned throughput exceeded".into(),
            });
        }

        // Small latency so completion order is decoupled from submission order
        tokio::time::sleep(Duration::from_millis(1)).await;

        Ok(PutAck {
            shard_id: format!("shardId-{:012}", partition_key.len() % 2),
            sequence_number: format!("{seq}"),
        })
    }
}
