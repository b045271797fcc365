//! Tracing setup shared by the TinyURL binaries.
//!
//! [`init_tracing`] installs a global `tracing` subscriber made of:
//! - an `EnvFilter` read from `RUST_LOG` (default `info`)
//! - a `fmt` layer, human-readable or JSON
//! - an optional OpenTelemetry layer exporting spans over OTLP/gRPC
//!
//! Records emitted through the `log` crate are forwarded into `tracing`.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use std::fmt;
use thiserror::Error;
use tracing::Subscriber;
use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Output format of the console layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => f.write_str("pretty"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to build OTLP exporter: {0}")]
    Exporter(String),
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
    #[error("failed to forward log records: {0}")]
    LogBridge(#[from] tracing_log::log::SetLoggerError),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Keeps the span exporter alive; flushes pending spans when dropped.
#[must_use = "dropping the guard shuts down span export"]
#[derive(Debug, Default)]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                tracing::warn!(error = %e, "failed to shut down tracer provider");
            }
        }
    }
}

/// Builds the `EnvFilter` from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn fmt_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
    }
}

fn tracer_provider(service_name: &str, endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    let resource = Resource::builder()
        .with_service_name(service_name.to_owned())
        .build();

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build())
}

/// Installs the global subscriber.
///
/// When `otlp_endpoint` is set, spans are also exported to that collector
/// under `service_name`. Must be called once, from within a Tokio runtime
/// when exporting.
pub fn init_tracing(
    service_name: &str,
    format: LogFormat,
    otlp_endpoint: Option<&str>,
) -> Result<TelemetryGuard> {
    let provider = otlp_endpoint
        .map(|endpoint| tracer_provider(service_name, endpoint))
        .transpose()?;

    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(service_name.to_owned()))
    });

    let subscriber = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer(format))
        .with(otel_layer);

    LogTracer::init()?;
    tracing::subscriber::set_global_default(subscriber)?;

    tracing::debug!(
        format = %format,
        otlp_endpoint = ?otlp_endpoint,
        "tracing initialized"
    );

    Ok(TelemetryGuard { provider })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;

    #[test]
    fn log_format_parses_from_cli_values() {
        assert_eq!(
            LogFormat::from_str("json", true).unwrap(),
            LogFormat::Json
        );
        assert_eq!(
            LogFormat::from_str("pretty", true).unwrap(),
            LogFormat::Pretty
        );
        assert!(LogFormat::from_str("xml", true).is_err());
    }

    #[test]
    fn log_format_display_matches_cli_values() {
        for format in LogFormat::value_variants() {
            let parsed = LogFormat::from_str(&format.to_string(), false).unwrap();
            assert_eq!(parsed, *format);
        }
    }

    #[test]
    fn default_guard_has_nothing_to_flush() {
        let guard = TelemetryGuard::default();
        assert!(guard.provider.is_none());
    }
}
