//! Metric names, recorder installation, and scoped recording guards.

use std::time::Instant;

use anyhow::Context;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

pub const ACTIVITY_OPERATIONS_TOTAL: &str = "activity_operations_total";
pub const ACTIVITY_COUNT: &str = "activity_count";
pub const ACTIVITY_OPERATION_DURATION_SECONDS: &str = "activity_operation_duration_seconds";

pub const STORE_OPERATIONS_TOTAL: &str = "store_operations_total";
pub const STORE_OPERATION_DURATION_SECONDS: &str = "store_operation_duration_seconds";
pub const STORE_ENTITY_COUNT: &str = "store_entity_count";

pub const BOOK_OPERATIONS_TOTAL: &str = "book_operations_total";
pub const STATS_OPERATIONS_TOTAL: &str = "stats_operations_total";

const HTTP_BUCKETS: &[f64] = &[0.1, 0.3, 0.5, 0.7, 1.0, 3.0, 5.0, 7.0, 10.0];
const ACTIVITY_BUCKETS: &[f64] = &[0.1, 0.3, 0.5, 0.7, 1.0, 3.0, 5.0];
const STORE_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0];

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the process-wide Prometheus recorder and return a handle for rendering.
///
/// The first call installs; later calls return the same handle.
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    HANDLE
        .get_or_try_init(|| {
            let handle = PrometheusBuilder::new()
                .set_buckets_for_metric(
                    Matcher::Full(HTTP_REQUEST_DURATION_SECONDS.to_string()),
                    HTTP_BUCKETS,
                )?
                .set_buckets_for_metric(
                    Matcher::Full(ACTIVITY_OPERATION_DURATION_SECONDS.to_string()),
                    ACTIVITY_BUCKETS,
                )?
                .set_buckets_for_metric(
                    Matcher::Full(STORE_OPERATION_DURATION_SECONDS.to_string()),
                    STORE_BUCKETS,
                )?
                .install_recorder()
                .context("failed to install Prometheus recorder")?;

            describe_metrics();
            tracing::info!(target: "gridwatch-telemetry", "prometheus recorder installed");
            Ok::<_, anyhow::Error>(handle)
        })
        .cloned()
}

fn describe_metrics() {
    metrics::describe_counter!(HTTP_REQUESTS_TOTAL, "Total number of HTTP requests");
    metrics::describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Duration of HTTP requests in seconds"
    );
    metrics::describe_counter!(
        ACTIVITY_OPERATIONS_TOTAL,
        "Total number of activity operations"
    );
    metrics::describe_gauge!(ACTIVITY_COUNT, "Current number of activities");
    metrics::describe_histogram!(
        ACTIVITY_OPERATION_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Duration of activity operations in seconds"
    );
    metrics::describe_counter!(
        STORE_OPERATIONS_TOTAL,
        "Total number of activity store operations"
    );
    metrics::describe_histogram!(
        STORE_OPERATION_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Duration of activity store operations in seconds"
    );
    metrics::describe_gauge!(STORE_ENTITY_COUNT, "Current number of stored entities");
    metrics::describe_counter!(BOOK_OPERATIONS_TOTAL, "Total number of book operations");
    metrics::describe_counter!(STATS_OPERATIONS_TOTAL, "Total number of stats operations");
}

type OwnedLabels = Vec<(&'static str, String)>;

fn own_labels(labels: &[(&'static str, &str)]) -> OwnedLabels {
    labels
        .iter()
        .map(|(key, value)| (*key, (*value).to_string()))
        .collect()
}

/// Records elapsed time into a histogram when dropped, on every exit path.
#[must_use = "the timer records when dropped"]
pub struct LatencyTimer {
    name: &'static str,
    labels: OwnedLabels,
    started: Instant,
}

impl LatencyTimer {
    pub fn start(name: &'static str, labels: &[(&'static str, &str)]) -> Self {
        Self {
            name,
            labels: own_labels(labels),
            started: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        metrics::histogram!(self.name, &self.labels).record(self.started.elapsed().as_secs_f64());
    }
}

/// Increments a counter by one when dropped, so early returns are counted too.
#[must_use = "the counter increments when dropped"]
pub struct ScopedCounter {
    name: &'static str,
    labels: OwnedLabels,
}

impl ScopedCounter {
    pub fn new(name: &'static str, labels: &[(&'static str, &str)]) -> Self {
        Self {
            name,
            labels: own_labels(labels),
        }
    }
}

impl Drop for ScopedCounter {
    fn drop(&mut self) {
        metrics::counter!(self.name, &self.labels).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guards_record_on_drop() {
        let handle = install_recorder().unwrap();

        {
            let _counter =
                ScopedCounter::new(STATS_OPERATIONS_TOTAL, &[("operation", "guard_check")]);
            let _timer = LatencyTimer::start(
                STORE_OPERATION_DURATION_SECONDS,
                &[("operation", "guard_check"), ("entity", "activity")],
            );
        }

        let rendered = handle.render();
        assert!(rendered.contains(r#"stats_operations_total{operation="guard_check"} 1"#));
        assert!(rendered.contains("store_operation_duration_seconds_bucket"));
        assert!(rendered.contains(r#"le="0.001""#));
    }

    #[test]
    fn install_recorder_returns_the_same_handle() {
        let first = install_recorder().unwrap();
        let second = install_recorder().unwrap();

        drop(ScopedCounter::new(BOOK_OPERATIONS_TOTAL, &[("operation", "twice")]));

        let expected = r#"book_operations_total{operation="twice"} 1"#;
        assert!(first.render().contains(expected));
        assert!(second.render().contains(expected));
    }
}
