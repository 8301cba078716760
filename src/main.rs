// src/main.rs
use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use weighted_proxy::{
    config,
    load_balancer::WeightedRandom,
    proxy::{Backend, Forwarder},
    server::{RequestHandler, ServerBuilder},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("weighted_proxy=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());

    info!("Loading configuration from: {}", config_path);
    let config = config::load_config(&config_path).await?;

    let backends: Vec<Backend> = config
        .backends
        .iter()
        .map(|b| Backend::new(b.url.clone(), b.weight))
        .collect();
    for backend in &backends {
        info!("Configured backend {}", backend);
    }

    let balancer = Arc::new(WeightedRandom::new(backends));
    let forwarder = Arc::new(Forwarder::new(balancer, config.proxy.upstream_timeout()));
    let handler = RequestHandler::new(forwarder);

    info!("Starting weighted proxy on {}", config.listen_addr);

    let server = ServerBuilder::new(config.listen_addr).with_handler(handler);

    tokio::select! {
        result = server.serve() => result?,
        _ = shutdown_signal() => {}
    }

    Ok(())
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
