//! Monitoring module for docaid
//!
//! Provides:
//! - Structured logging with tracing
//! - Prometheus metrics for pipeline runs and translation calls

pub mod config;
pub mod metrics;
pub mod tracing_config;

pub use config::{LogFormat, MonitoringConfig};
pub use metrics::{export_prometheus, observe_pipeline_run};
pub use tracing_config::init_tracing;
