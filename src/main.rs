// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::Client;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config_sync::config::Config;
use config_sync::kubernetes::KubeCluster;
use config_sync::metrics::Metrics;
use config_sync::reconcilers::ConfigReconciler;
use config_sync::rollout::RolloutManager;
use config_sync::server;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting config-sync operator");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: metrics_port={}, watch_namespace={}",
        config.metrics_port,
        config.watch_namespace.as_deref().unwrap_or("<all>")
    );

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    let metrics = Arc::new(Metrics::new()?);
    let manager = Arc::new(RolloutManager::new(
        KubeCluster::new(client.clone()),
        metrics.clone(),
    ));

    let configmap_reconciler = ConfigReconciler::<ConfigMap, _>::new(
        client.clone(),
        manager.clone(),
        metrics.clone(),
        config.watch_namespace.clone(),
    );
    let secret_reconciler = ConfigReconciler::<Secret, _>::new(
        client,
        manager,
        metrics.clone(),
        config.watch_namespace.clone(),
    );

    info!("Starting reconcilers...");

    // The metrics server finishes on SIGINT or SIGTERM, which ends the operator
    tokio::select! {
        res = async { tokio::try_join!(configmap_reconciler.run(), secret_reconciler.run()) } => {
            res?;
            warn!("All reconcilers stopped unexpectedly");
        }
        res = server::serve(config.metrics_port, metrics, shutdown_signal()) => {
            res?;
        }
    }

    info!("config-sync operator stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
