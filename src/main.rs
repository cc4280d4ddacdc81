use anyhow::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use blackadder::{
    chaos::{fetch_config, ChaosController, PolicySet},
    config::{LogFormat, Settings},
    k8s::K8sClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::load()?;

    // Initialize tracing
    let fmt_layer = match settings.log_format {
        LogFormat::Text => tracing_subscriber::fmt::layer().boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(fmt_layer)
        .init();

    tracing::info!("Starting Blackadder chaos agent");

    let k8s = match K8sClient::new(settings.kubeconfig_path.as_deref()).await {
        Ok(k8s) => k8s,
        Err(e) => {
            tracing::error!("Error initializing Kubernetes client: {}", e);
            return Err(e);
        }
    };

    // Absence of a ChaosAgent is fatal, there is nothing to retry against
    let config = match fetch_config(&k8s).await {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Error retrieving agent configuration: {}, exiting", e);
            return Err(e.into());
        }
    };

    let policies = PolicySet {
        corrupt_config_maps: settings.corrupt_config_maps,
        ..PolicySet::default()
    };
    let controller = ChaosController::new(Arc::new(k8s), config).with_policies(policies);

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    controller.run(shutdown).await;

    tracing::info!("Blackadder chaos agent stopped");
    Ok(())
}

/// Cancel `shutdown` on SIGINT or SIGTERM
async fn shutdown_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }

    shutdown.cancel();
}
