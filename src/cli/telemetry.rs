//! Logging and trace export.
//!
//! Logs always go to stdout through the `fmt` layer. Spans are additionally
//! exported over OTLP/gRPC when `OTEL_EXPORTER_OTLP_ENDPOINT` names a collector.

use crate::GIT_COMMIT_HASH;
use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use opentelemetry::{
    KeyValue, global, propagation::TextMapCompositePropagator, trace::TracerProvider as _,
};
use opentelemetry_otlp::{Compression, SpanExporter, WithExportConfig, WithTonicConfig};
use opentelemetry_sdk::{
    Resource,
    propagation::{BaggagePropagator, TraceContextPropagator},
    trace::{SdkTracerProvider, Tracer},
};
use std::{env::var, time::Duration};
use tonic::{
    metadata::{Ascii, MetadataKey, MetadataMap, MetadataValue},
    transport::ClientTlsConfig,
};
use tracing::{Level, warn};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};
use ulid::Ulid;
use url::Url;

const EXPORT_TIMEOUT: Duration = Duration::from_secs(3);

/// Targets kept quiet regardless of the requested verbosity.
const QUIET_TARGETS: [&str; 4] = [
    "hyper=error",
    "reqwest=warn",
    "tokio=error",
    "opentelemetry_sdk=warn",
];

/// Resource attribute naming the identity provider host behind this gateway.
const PROVIDER_HOST_ATTRIBUTE: &str = "authgate.provider.host";

static TRACER_PROVIDER: OnceCell<SdkTracerProvider> = OnceCell::new();

/// Collector settings taken from the standard `OTEL_EXPORTER_OTLP_*` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OtlpSettings {
    endpoint: String,
    headers: Vec<(String, String)>,
}

impl OtlpSettings {
    /// `None` when no collector endpoint is configured. An endpoint without a
    /// scheme is assumed to be `https`.
    fn from_env() -> Option<Self> {
        let endpoint = var("OTEL_EXPORTER_OTLP_ENDPOINT").ok()?;
        let endpoint = endpoint.trim().trim_end_matches('/');
        if endpoint.is_empty() {
            return None;
        }

        let endpoint = if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("https://{endpoint}")
        };

        let headers = var("OTEL_EXPORTER_OTLP_HEADERS")
            .map(|raw| {
                raw.split(',')
                    .filter_map(|pair| pair.split_once('='))
                    .map(|(key, value)| {
                        (key.trim().to_ascii_lowercase(), value.trim().to_string())
                    })
                    .filter(|(key, _)| !key.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Some(Self { endpoint, headers })
    }

    /// Server name to verify when the collector is reached over TLS.
    fn tls_domain(&self) -> Option<String> {
        Url::parse(&self.endpoint)
            .ok()
            .filter(|url| url.scheme() == "https")
            .and_then(|url| url.host_str().map(str::to_string))
    }

    /// Headers sent with every export. Only ASCII metadata is supported, so a
    /// binary (`-bin`) key is rejected.
    fn metadata(&self) -> Result<MetadataMap> {
        let mut metadata = MetadataMap::with_capacity(self.headers.len());
        for (key, value) in &self.headers {
            let name = MetadataKey::<Ascii>::from_bytes(key.as_bytes())
                .with_context(|| format!("invalid OTLP header name: {key}"))?;
            let value = MetadataValue::<Ascii>::try_from(value.as_str())
                .with_context(|| format!("invalid OTLP header value for {key}"))?;
            metadata.insert(name, value);
        }
        Ok(metadata)
    }

    fn exporter(&self) -> Result<SpanExporter> {
        let mut builder = SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&self.endpoint)
            .with_compression(Compression::Gzip)
            .with_timeout(EXPORT_TIMEOUT);

        if let Some(domain) = self.tls_domain() {
            builder = builder.with_tls_config(
                ClientTlsConfig::new()
                    .domain_name(domain)
                    .with_native_roots(),
            );
        }

        if !self.headers.is_empty() {
            builder = builder.with_metadata(self.metadata()?);
        }

        builder.build().context("Failed to build OTLP span exporter")
    }
}

/// Describe this process on exported spans, including which provider it fronts.
fn resource(provider_url: &str) -> Resource {
    let instance_id = var("OTEL_SERVICE_INSTANCE_ID").unwrap_or_else(|_| Ulid::new().to_string());

    let mut attributes = vec![
        KeyValue::new("service.name", env!("CARGO_PKG_NAME")),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        KeyValue::new("service.instance.id", instance_id),
        KeyValue::new("vcs.ref.head.revision", GIT_COMMIT_HASH),
    ];

    if let Some(host) = Url::parse(provider_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
    {
        attributes.push(KeyValue::new(PROVIDER_HOST_ATTRIBUTE, host));
    }

    Resource::builder_empty().with_attributes(attributes).build()
}

fn install_tracer(settings: &OtlpSettings, provider_url: &str) -> Result<Tracer> {
    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(settings.exporter()?)
        .with_resource(resource(provider_url))
        .build();

    global::set_text_map_propagator(TextMapCompositePropagator::new(vec![
        Box::new(TraceContextPropagator::new()),
        Box::new(BaggagePropagator::new()),
    ]));
    global::set_tracer_provider(provider.clone());

    let tracer = provider.tracer(env!("CARGO_PKG_NAME"));
    let _ = TRACER_PROVIDER.set(provider);

    Ok(tracer)
}

// RUST_LOG wins over the verbosity flag
fn env_filter(level: Level) -> Result<EnvFilter> {
    let mut filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    for directive in QUIET_TARGETS {
        filter = filter.add_directive(directive.parse()?);
    }

    Ok(filter)
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the OTLP exporter cannot be built or a global
/// subscriber is already set
pub fn init(verbosity_level: Option<Level>, provider_url: &str) -> Result<()> {
    let filter = env_filter(verbosity_level.unwrap_or(Level::ERROR))?;

    let fmt_layer = fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_target(false)
        .pretty();

    let otel_layer = OtlpSettings::from_env()
        .map(|settings| install_tracer(&settings, provider_url))
        .transpose()?
        .map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    let subscriber = Registry::default()
        .with(fmt_layer)
        .with(otel_layer)
        .with(filter);
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

/// Flush pending spans; noop when trace export was never enabled.
pub fn shutdown_tracer() {
    if let Some(provider) = TRACER_PROVIDER.get()
        && let Err(e) = provider.shutdown()
    {
        warn!("Failed to flush traces: {}", e);
    }
}
