//! Asynchronous record publisher
//!
//! A fixed pool of worker tasks drains a bounded queue of publish jobs.
//! `publish` hands a record to the pool and returns immediately; the only
//! success signal is the completion handler, invoked exactly once per record
//! with a [`PublishOutcome`]. Nothing here retries: a failed record is
//! counted, logged, and dropped — retry policy belongs to whoever observes
//! the outcome. Records complete in no particular order.

use crate::metrics;
use crate::stream::StreamHandle;
use bytes::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Queue slots per worker
const QUEUE_DEPTH_PER_WORKER: usize = 32;

/// Result of one publish attempt, delivered to the completion handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Record accepted by the service
    Success {
        shard_id: String,
        sequence_number: String,
    },
    /// Record dropped by this layer
    Failure { message: String },
}

/// Completion handler invoked exactly once per published record
type CompletionHandler = Box<dyn FnOnce(PublishOutcome) + Send + 'static>;

struct PublishJob {
    payload: Bytes,
    partition_key: String,
    on_complete: CompletionHandler,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
}

/// Publisher with a fixed-size worker pool over one stream handle
pub struct AsyncPublisher {
    tx: mpsc::Sender<PublishJob>,
    workers: Vec<JoinHandle<()>>,
    counters: Arc<Counters>,
}

impl AsyncPublisher {
    /// Spawn `pool_size` workers publishing to the handle's stream.
    ///
    /// Must be called within a tokio runtime. The pool size is fixed for
    /// the publisher's lifetime.
    pub fn new(handle: StreamHandle, pool_size: usize) -> Self {
        assert!(pool_size > 0, "publisher pool requires at least one worker");

        let (tx, rx) = mpsc::channel::<PublishJob>(pool_size * QUEUE_DEPTH_PER_WORKER);
        let rx = Arc::new(Mutex::new(rx));
        let counters = Arc::new(Counters::default());

        let workers = (0..pool_size)
            .map(|worker_id| {
                let rx = Arc::clone(&rx);
                let handle = handle.clone();
                let counters = Arc::clone(&counters);
                tokio::spawn(worker_loop(worker_id, rx, handle, counters))
            })
            .collect();

        info!(
            stream = handle.stream_name(),
            pool_size, "Publisher worker pool started"
        );

        Self {
            tx,
            workers,
            counters,
        }
    }

    /// Submit one record for asynchronous delivery.
    ///
    /// Returns immediately, signalling nothing about delivery; the handler
    /// fires later with the outcome. If the queue is full the record is
    /// dropped and the handler receives a `Failure` asynchronously — the
    /// caller is never blocked either way.
    pub fn publish(
        &self,
        payload: Bytes,
        partition_key: impl Into<String>,
        on_complete: impl FnOnce(PublishOutcome) + Send + 'static,
    ) {
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);

        let job = PublishJob {
            payload,
            partition_key: partition_key.into(),
            on_complete: Box::new(on_complete),
        };

        if let Err(rejected) = self.tx.try_send(job) {
            self.counters.failed.fetch_add(1, Ordering::Relaxed);
            metrics::record_publish_failure();
            warn!("Publish queue full, dropping record");

            let job = rejected.into_inner();
            tokio::spawn(async move {
                (job.on_complete)(PublishOutcome::Failure {
                    message: "publish queue full, record dropped".to_string(),
                });
            });
        }
    }

    /// Total records submitted
    pub fn submitted(&self) -> u64 {
        self.counters.submitted.load(Ordering::Relaxed)
    }

    /// Total records acknowledged by the service
    pub fn delivered(&self) -> u64 {
        self.counters.delivered.load(Ordering::Relaxed)
    }

    /// Total records dropped after a failed attempt
    pub fn failed(&self) -> u64 {
        self.counters.failed.load(Ordering::Relaxed)
    }

    /// Close the queue, drain in-flight work, and join all workers.
    ///
    /// Already-submitted records still complete; nothing is cancelled
    /// mid-flight.
    pub async fn shutdown(self) {
        let Self { tx, workers, .. } = self;
        drop(tx);

        for worker in workers {
            let _ = worker.await;
        }

        info!("Publisher worker pool shut down");
    }
}

async fn worker_loop(
    worker_id: usize,
    rx: Arc<Mutex<mpsc::Receiver<PublishJob>>>,
    handle: StreamHandle,
    counters: Arc<Counters>,
) {
    loop {
        // Lock only around recv so workers process jobs in parallel
        let job = rx.lock().await.recv().await;
        let Some(job) = job else {
            debug!(worker_id, "Publish queue closed, worker exiting");
            return;
        };

        let started = Instant::now();
        let outcome = match handle.put_record(&job.partition_key, job.payload).await {
            Ok(ack) => {
                counters.delivered.fetch_add(1, Ordering::Relaxed);
                metrics::record_publish_success(started.elapsed());
                debug!(
                    worker_id,
                    stream = handle.stream_name(),
                    shard_id = %ack.shard_id,
                    seq = %ack.sequence_number,
                    "Record published"
                );
                PublishOutcome::Success {
                    shard_id: ack.shard_id,
                    sequence_number: ack.sequence_number,
                }
            }
            Err(e) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                metrics::record_publish_failure();
                warn!(
                    worker_id,
                    stream = handle.stream_name(),
                    error = %e,
                    "Failed to publish record"
                );
                PublishOutcome::Failure {
                    message: e.to_string(),
                }
            }
        };

        (job.on_complete)(outcome);
    }
}
