//! Logging and metrics bootstrap for gridwatch.
//!
//! Tracing is configured from [`TelemetrySettings`]; metrics go through the `metrics`
//! facade and are rendered by a process-wide Prometheus recorder.

use anyhow::Context;
use gridwatch_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub mod instruments;

pub use instruments::{install_recorder, LatencyTimer, ScopedCounter};
pub use metrics_exporter_prometheus::PrometheusHandle;

/// Initialize the tracing/logging pipeline.
///
/// `RUST_LOG` wins over `settings.log_filter`. Calling this more than once is harmless;
/// later calls leave the first subscriber in place.
pub fn init_tracing(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .with_context(|| format!("invalid log filter '{}'", settings.log_filter))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = match settings.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!(target: "gridwatch-telemetry", "tracing subscriber already installed");
    }

    Ok(())
}
