//! Metrics registration and recording
//!
//! Uses the `metrics` facade only: the host application installs whatever
//! recorder/exporter it wants (Prometheus or otherwise). Call [`describe`]
//! once at startup to register metric metadata with the recorder.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Duration;

/// Register metric descriptions with the installed recorder
pub fn describe() {
    describe_counter!(
        "emitter_records_published_total",
        Unit::Count,
        "Records successfully published to the stream"
    );
    describe_counter!(
        "emitter_publish_failures_total",
        Unit::Count,
        "Records that failed to publish (dropped by this layer)"
    );
    describe_counter!(
        "emitter_streams_created_total",
        Unit::Count,
        "Stream creation requests issued"
    );
    describe_counter!(
        "emitter_errors_total",
        Unit::Count,
        "Fatal emitter errors by error_type"
    );

    describe_histogram!(
        "emitter_publish_duration_seconds",
        Unit::Seconds,
        "Time to publish one record to the stream"
    );
}

pub(crate) fn record_publish_success(elapsed: Duration) {
    counter!("emitter_records_published_total").increment(1);
    histogram!("emitter_publish_duration_seconds").record(elapsed.as_secs_f64());
}

pub(crate) fn record_publish_failure() {
    counter!("emitter_publish_failures_total").increment(1);
}

pub(crate) fn record_stream_created() {
    counter!("emitter_streams_created_total").increment(1);
}

pub(crate) fn record_error(error_type: &'static str) {
    counter!("emitter_errors_total", "error_type" => error_type).increment(1);
}
