//! Logging and trace export setup
//!
//! Console output always goes through `tracing-subscriber`. When an OTLP
//! endpoint is configured, spans and log events are also shipped over
//! OTLP/HTTP.

use anyhow::Context;
use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::{LogExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_semantic_conventions::resource::SERVICE_VERSION;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::WeatherCardConfig;

/// Flushes exporters when dropped. Keep it alive for the whole process.
#[derive(Default)]
pub struct TelemetryGuard {
    tracer: Option<SdkTracerProvider>,
    logger: Option<SdkLoggerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(tracer) = self.tracer.take()
            && let Err(e) = tracer.shutdown()
        {
            eprintln!("Failed to flush traces: {e}");
        }
        if let Some(logger) = self.logger.take()
            && let Err(e) = logger.shutdown()
        {
            eprintln!("Failed to flush logs: {e}");
        }
    }
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{level},hyper=warn,reqwest=warn,tower_http=info,fjall=warn,lsm_tree=warn"
        ))
    })
}

fn resource(config: &WeatherCardConfig) -> Resource {
    Resource::builder()
        .with_service_name(config.telemetry.service_name.clone())
        .with_attribute(KeyValue::new(SERVICE_VERSION, crate::VERSION))
        .build()
}

fn otlp_url(endpoint: &str, signal: &str) -> String {
    format!("{}/v1/{signal}", endpoint.trim_end_matches('/'))
}

/// Install the global subscriber.
///
/// Must run outside the tokio runtime: the OTLP exporters use a blocking HTTP client.
pub fn init(config: &WeatherCardConfig, verbose: bool) -> anyhow::Result<TelemetryGuard> {
    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };

    let mut guard = TelemetryGuard::default();
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    layers.push(match config.logging.format.as_str() {
        "json" => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .boxed(),
    });

    if let Some(endpoint) = &config.telemetry.otlp_endpoint {
        let span_exporter = SpanExporter::builder()
            .with_http()
            .with_endpoint(otlp_url(endpoint, "traces"))
            .build()
            .context("Failed to create OTLP span exporter")?;
        let tracer_provider = SdkTracerProvider::builder()
            .with_batch_exporter(span_exporter)
            .with_resource(resource(config))
            .build();
        let tracer = tracer_provider.tracer(config.telemetry.service_name.clone());
        layers.push(tracing_opentelemetry::layer().with_tracer(tracer).boxed());

        let log_exporter = LogExporter::builder()
            .with_http()
            .with_endpoint(otlp_url(endpoint, "logs"))
            .build()
            .context("Failed to create OTLP log exporter")?;
        let logger_provider = SdkLoggerProvider::builder()
            .with_batch_exporter(log_exporter)
            .with_resource(resource(config))
            .build();
        // The exporter's own HTTP stack must not feed back into itself
        let bridge_filter = Targets::new()
            .with_default(LevelFilter::TRACE)
            .with_target("opentelemetry", LevelFilter::OFF)
            .with_target("hyper", LevelFilter::OFF)
            .with_target("reqwest", LevelFilter::OFF);
        layers.push(
            OpenTelemetryTracingBridge::new(&logger_provider)
                .with_filter(bridge_filter)
                .boxed(),
        );

        guard.tracer = Some(tracer_provider);
        guard.logger = Some(logger_provider);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter(level))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
