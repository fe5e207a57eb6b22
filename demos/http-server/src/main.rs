use std::sync::Arc;

use axum::{Router, http::StatusCode, routing::get};
use tracing::{error, info};

use taskdesk_api::HttpApi;
use taskdesk_core::{MemoryQueue, TaskWorkflow};
use taskdesk_observe::{LoggerConfig, logger_init};
use taskdesk_prometheus::PrometheusMetrics;

mod config;
mod executor;
mod tasks;

use config::DemoConfig;
use executor::Executor;
use tasks::ResultStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1) Logger
    logger_init(&LoggerConfig::from_env()?)?;
    let cfg = DemoConfig::from_env()?;
    info!(bind = %cfg.bind, "config loaded");

    // 2) Tasks, queue and the simulated executor
    let store = ResultStore::default();
    let registry = tasks::registry(&store)?;
    let queue = MemoryQueue::new();

    let out_dir = std::env::temp_dir().join("taskdesk-demo");
    tokio::spawn(Executor::new(queue.clone(), store, out_dir).run());

    // 3) Workflow
    let metrics = Arc::new(PrometheusMetrics::new()?);
    let workflow = TaskWorkflow::builder(
        Arc::new(registry),
        Arc::new(queue.clone()),
        Arc::new(queue),
    )
    .with_translator(Arc::new(tasks::catalog()))
    .with_metrics(metrics.clone())
    .build();

    // 4) HTTP
    let app = Router::new()
        .route(
            "/metrics",
            get(move || {
                let metrics = metrics.clone();
                async move {
                    metrics.render().map_err(|e| {
                        error!(error = %e, "failed to render metrics");
                        StatusCode::INTERNAL_SERVER_ERROR
                    })
                }
            }),
        )
        .merge(HttpApi::new(Arc::new(workflow)).router());

    let listener = tokio::net::TcpListener::bind(cfg.bind).await?;
    info!(addr = %cfg.bind, "http server listening, press Ctrl+C to stop");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for ctrl-c");
            }
        })
        .await?;

    info!("shutting down...");
    Ok(())
}
