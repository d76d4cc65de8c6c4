use once_cell::sync::Lazy;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

// Global Prometheus registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

fn service_and_env() -> (String, String) {
    let service = std::env::var("APP_SERVICE").ok().unwrap_or_else(|| env!("APP_SERVICE_DEFAULT").to_string());
    let env_name = std::env::var("APP_ENV").ok().unwrap_or_else(|| env!("APP_ENV_DEFAULT").to_string());
    (service, env_name)
}

// App info gauge (const)
pub static APP_INFO: Lazy<IntGauge> = Lazy::new(|| {
    let (service, env_name) = service_and_env();
    let g = IntGauge::with_opts(
        Opts::new("app_info", "Application info gauge")
            .const_label("service", &service)
            .const_label("env", &env_name)
            .const_label("version", env!("CARGO_PKG_VERSION"))
            .const_label("git_sha", env!("GIT_SHA"))
            .const_label("build_time", env!("BUILD_TIME")),
    )
    .unwrap();
    REGISTRY.register(Box::new(g.clone())).ok();
    g
});

// Pipeline runs by outcome ("success" | "failure")
pub static PIPELINE_RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let c = IntCounterVec::new(
        Opts::new("pipeline_runs_total", "Document pipeline runs by outcome"),
        &["outcome"],
    )
    .unwrap();
    REGISTRY.register(Box::new(c.clone())).ok();
    c
});

// Failures by stage (language | extraction | generation | translation)
pub static PIPELINE_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let c = IntCounterVec::new(
        Opts::new("pipeline_failures_total", "Document pipeline failures by stage"),
        &["stage"],
    )
    .unwrap();
    REGISTRY.register(Box::new(c.clone())).ok();
    c
});

pub static TRANSLATION_REQUESTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let c = IntCounter::new("translation_requests_total", "Remote translation calls issued").unwrap();
    REGISTRY.register(Box::new(c.clone())).ok();
    c
});

pub static PIPELINE_DURATION_MS: Lazy<Histogram> = Lazy::new(|| {
    let buckets = vec![250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0, 60000.0];
    let h = Histogram::with_opts(
        HistogramOpts::new("pipeline_duration_ms", "End-to-end pipeline duration in milliseconds")
            .buckets(buckets),
    )
    .unwrap();
    REGISTRY.register(Box::new(h.clone())).ok();
    h
});

/// Record the end of one pipeline run.
pub fn observe_pipeline_run(failed_stage: Option<&str>, duration_ms: f64) {
    match failed_stage {
        None => PIPELINE_RUNS_TOTAL.with_label_values(&["success"]).inc(),
        Some(stage) => {
            PIPELINE_RUNS_TOTAL.with_label_values(&["failure"]).inc();
            PIPELINE_FAILURES_TOTAL.with_label_values(&[stage]).inc();
        }
    }
    PIPELINE_DURATION_MS.observe(duration_ms);
}

/// Render every registered metric in the Prometheus text format.
pub fn export_prometheus() -> String {
    // Touch lazies so they are registered even before first use
    APP_INFO.set(1);
    Lazy::force(&PIPELINE_RUNS_TOTAL);
    Lazy::force(&PIPELINE_FAILURES_TOTAL);
    Lazy::force(&TRANSLATION_REQUESTS_TOTAL);
    Lazy::force(&PIPELINE_DURATION_MS);

    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
