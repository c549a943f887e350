//! Mushroom Classification Service - Main Entry Point
//!
//! Loads the trained model bundle, then serves edibility predictions over a
//! small HTTP form. The bundle is loaded exactly once; a missing or invalid
//! artifact aborts startup.

use std::fs::OpenOptions;
use std::sync::Arc;

use anyhow::{Context, Result};
use mushroom_classifier_service::{
    config::{AppConfig, LoggingConfig},
    metrics::{MetricsReporter, ServiceMetrics},
    models::ModelBundle,
    server::{build_router, AppState},
};
use tracing::info;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration before logging so the log file location is known.
    let config = AppConfig::load()?;

    init_logging(&config.logging)?;

    info!("Starting mushroom classification service");

    // Load the model bundle. Failure here is fatal: the process must not
    // accept requests without a loaded model.
    let bundle = ModelBundle::load(&config.artifact)?;
    info!(
        features = bundle.extractor.feature_count(),
        classes = bundle.labels.len(),
        "Model bundle ready"
    );

    let metrics = Arc::new(ServiceMetrics::new());

    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(async move {
            reporter.start().await;
        });
    }

    let state = Arc::new(AppState { bundle, metrics });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.listen_addr)
        .await
        .context(format!("Failed to bind {}", config.server.listen_addr))?;
    info!(listen_addr = %config.server.listen_addr, "Listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize structured logging to stdout and, when configured, an
/// append-only log file.
fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    match &config.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .context(format!("Failed to create log directory {:?}", parent))?;
                }
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .context(format!("Failed to open log file {:?}", path))?;

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::io::stdout.and(Arc::new(file)))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }

    Ok(())
}
