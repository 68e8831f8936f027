use crate::config::{LoggingConfig, MetricsConfig};
use metrics_exporter_statsd::StatsdBuilder;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const METRICS_PREFIX: &str = "reviews";

#[derive(thiserror::Error, Debug)]
pub enum TelemetryError {
    #[error("could not build statsd exporter: {0}")]
    Statsd(String),
    #[error("a metrics recorder is already installed")]
    RecorderAlreadySet,
}

/// Installs the global tracing subscriber. Events are also forwarded to Sentry
/// when a DSN is configured; the returned guard must be held until exit.
pub fn init_logging(config: Option<&LoggingConfig>) -> Option<sentry::ClientInitGuard> {
    let guard = config.map(|logging| {
        sentry::init((
            logging.sentry_dsn.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });
    let sentry_layer = guard
        .as_ref()
        .map(|_| sentry::integrations::tracing::layer());

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .with(sentry_layer)
        .init();

    guard
}

/// Exports metrics to statsd when configured; otherwise metrics are dropped.
pub fn init_metrics(config: Option<&MetricsConfig>) -> Result<(), TelemetryError> {
    let Some(config) = config else {
        tracing::info!("no metrics backend configured");
        return Ok(());
    };

    let recorder = StatsdBuilder::from(config.statsd_host.as_str(), config.statsd_port)
        .build(Some(METRICS_PREFIX))
        .map_err(|e| TelemetryError::Statsd(e.to_string()))?;
    metrics::set_global_recorder(recorder).map_err(|_| TelemetryError::RecorderAlreadySet)?;

    tracing::info!(
        host = %config.statsd_host,
        port = config.statsd_port,
        "exporting metrics to statsd"
    );
    Ok(())
}
