//! Prometheus metrics for bfhl-service.
//!
//! HTTP request metrics come from the `metrics` recorder installed here and
//! fed by `service_core`'s middleware; operation and provider metrics live
//! in a dedicated registry.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::core::Collector;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use service_core::error::AppError;
use std::sync::{Once, OnceLock};

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub static BFHL_OPERATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static BFHL_OPERATION_DURATION_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static AI_PROVIDER_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static AI_PROVIDER_ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

static INIT: Once = Once::new();

/// Initialize the recorder and all metrics. Safe to call more than once;
/// only the first call has an effect.
pub fn init_metrics() {
    INIT.call_once(|| {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                let _ = METRICS_HANDLE.set(handle);
            }
            Err(e) => tracing::warn!(error = %e, "Prometheus recorder not installed"),
        }

        let registry = Registry::new();

        let operations_total = register(
            &registry,
            IntCounterVec::new(
                Opts::new("bfhl_operations_total", "Total BFHL operations by outcome"),
                &["operation", "outcome"],
            ),
        );

        let operation_duration = register(
            &registry,
            HistogramVec::new(
                HistogramOpts::new(
                    "bfhl_operation_duration_seconds",
                    "BFHL operation duration in seconds",
                )
                .buckets(vec![0.0001, 0.001, 0.01, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
                &["operation"],
            ),
        );

        let provider_latency = register(
            &registry,
            HistogramVec::new(
                HistogramOpts::new(
                    "ai_provider_latency_seconds",
                    "AI provider API latency in seconds",
                )
                .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
                &["provider", "model"],
            ),
        );

        let provider_errors = register(
            &registry,
            IntCounterVec::new(
                Opts::new("ai_provider_errors_total", "Total AI provider errors"),
                &["provider", "error_type"],
            ),
        );

        let _ = REGISTRY.set(registry);
        if let Some(m) = operations_total {
            let _ = BFHL_OPERATIONS_TOTAL.set(m);
        }
        if let Some(m) = operation_duration {
            let _ = BFHL_OPERATION_DURATION_SECONDS.set(m);
        }
        if let Some(m) = provider_latency {
            let _ = AI_PROVIDER_LATENCY_SECONDS.set(m);
        }
        if let Some(m) = provider_errors {
            let _ = AI_PROVIDER_ERRORS_TOTAL.set(m);
        }

        tracing::info!("Prometheus metrics initialized");
    });
}

fn register<M>(registry: &Registry, metric: prometheus::Result<M>) -> Option<M>
where
    M: Collector + Clone + 'static,
{
    let metric = metric
        .map_err(|e| tracing::error!(error = %e, "Failed to create metric"))
        .ok()?;
    registry
        .register(Box::new(metric.clone()))
        .map_err(|e| tracing::error!(error = %e, "Failed to register metric"))
        .ok()?;
    Some(metric)
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> Result<String, AppError> {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_default();

    let registry = REGISTRY.get().ok_or_else(|| {
        AppError::InternalError(anyhow::anyhow!("Metrics registry not initialized"))
    })?;

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to encode metrics: {}", e)))?;

    let custom = String::from_utf8(buffer).map_err(|e| {
        AppError::InternalError(anyhow::anyhow!("Metrics are not valid UTF-8: {}", e))
    })?;
    output.push_str(&custom);

    Ok(output)
}

/// Record a finished operation; `outcome` is `success` or an error kind.
pub fn record_operation(operation: &str, outcome: &str, duration_secs: f64) {
    if let Some(counter) = BFHL_OPERATIONS_TOTAL.get() {
        counter.with_label_values(&[operation, outcome]).inc();
    }
    if let Some(histogram) = BFHL_OPERATION_DURATION_SECONDS.get() {
        histogram
            .with_label_values(&[operation])
            .observe(duration_secs);
    }
}

/// Record provider latency.
pub fn record_provider_latency(provider: &str, model: &str, duration_secs: f64) {
    if let Some(histogram) = AI_PROVIDER_LATENCY_SECONDS.get() {
        histogram
            .with_label_values(&[provider, model])
            .observe(duration_secs);
    }
}

/// Record a provider error.
pub fn record_provider_error(provider: &str, error_type: &str) {
    if let Some(counter) = AI_PROVIDER_ERRORS_TOTAL.get() {
        counter.with_label_values(&[provider, error_type]).inc();
    }
}
