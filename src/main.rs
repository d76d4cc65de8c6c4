// docaid/src/main.rs
use docaid::api::start_api_server;
use docaid::config::ApiConfig;
use docaid::monitoring::{init_tracing, MonitoringConfig};
use docaid::pipeline::build_pipeline;
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    if std::env::var_os("NO_DOTENV").is_none() {
        dotenvy::dotenv().ok();
    }

    let monitoring = MonitoringConfig::from_env();
    // Must outlive the server or buffered file logs are lost
    let _log_guard = init_tracing(&monitoring)?;

    let config = ApiConfig::from_env().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let pipeline = build_pipeline(&config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to initialize pipeline");
        io::Error::new(io::ErrorKind::Other, e.to_string())
    })?;

    tracing::info!(
        addr = %config.bind_addr(),
        version = env!("CARGO_PKG_VERSION"),
        git_sha = env!("GIT_SHA"),
        "Starting API server"
    );
    start_api_server(&config, Arc::new(pipeline)).await
}
