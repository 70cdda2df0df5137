//! Logging setup shared by the ingestion and dashboard binaries.

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Set once the global subscriber is installed. Holds the span provider when
/// OTLP export is on, so batched spans can be flushed at exit.
static INSTALLED: OnceCell<Option<SdkTracerProvider>> = OnceCell::new();

const DEFAULT_FILTER: &str = "info,sqlx=warn,sea_orm=warn";
const OTLP_ENDPOINT_VAR: &str = "OTLP_ENDPOINT";

#[derive(Clone, Debug)]
pub struct ObsConfig {
    pub service_name: &'static str,
    /// Directive string for `EnvFilter`; falls back to `RUST_LOG`.
    pub env_filter: Option<String>,
    pub otlp_endpoint: Option<String>,
}

impl ObsConfig {
    /// Config for one binary. Reads `OTLP_ENDPOINT` so span export can be
    /// switched on without code changes.
    pub fn for_service(service_name: &'static str) -> Self {
        Self {
            service_name,
            env_filter: None,
            otlp_endpoint: std::env::var(OTLP_ENDPOINT_VAR)
                .ok()
                .filter(|endpoint| !endpoint.trim().is_empty()),
        }
    }

    fn resolved_filter(&self) -> String {
        self.env_filter
            .clone()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string())
    }
}

impl Default for ObsConfig {
    fn default() -> Self {
        Self {
            service_name: "hr-dashboard",
            env_filter: None,
            otlp_endpoint: None,
        }
    }
}

/// Installs the fmt subscriber, plus an OTLP span exporter when an endpoint
/// is configured. Later calls are no-ops.
pub fn init_tracing(config: ObsConfig) -> Result<()> {
    INSTALLED.get_or_try_init(|| install(&config))?;
    Ok(())
}

/// Flushes spans still buffered for export. Call before the process exits.
pub fn shutdown_tracing() {
    if let Some(Some(provider)) = INSTALLED.get() {
        if let Err(err) = provider.shutdown() {
            eprintln!("span export shutdown failed: {err}");
        }
    }
}

fn install(config: &ObsConfig) -> Result<Option<SdkTracerProvider>> {
    let filter = config.resolved_filter();
    let env_filter =
        EnvFilter::try_new(&filter).with_context(|| format!("invalid log filter {filter:?}"))?;
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false));

    match &config.otlp_endpoint {
        Some(endpoint) => {
            let provider = span_provider(config.service_name, endpoint)?;
            let tracer = provider.tracer(config.service_name);
            registry
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .try_init()?;
            Ok(Some(provider))
        }
        None => {
            registry.try_init()?;
            Ok(None)
        }
    }
}

fn span_provider(service_name: &'static str, endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = SpanExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpBinary)
        .with_endpoint(endpoint)
        .build()
        .with_context(|| format!("cannot build OTLP exporter for {endpoint}"))?;
    Ok(SdkTracerProvider::builder()
        .with_resource(Resource::builder().with_service_name(service_name).build())
        .with_batch_exporter(exporter)
        .build())
}
