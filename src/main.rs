// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use tracing::info;

use kconverge::config::Config;
use kconverge::gitops::{ReconcileOptions, Reconciler};
use kconverge::kubernetes::{create_client, wait_for_flux_crds};
use kconverge::readiness::{wait_for_api_server_stable, wait_for_multiple_resources};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting kconverge");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: timeout={:?}, wait_for={}, reconcile_flux={}",
        config.timeout,
        config.wait_for.len(),
        config.reconcile_flux
    );

    let client = create_client(&config).await?;

    // The API server can flap right after bootstrap
    wait_for_api_server_stable(&client, config.timeout, config.api_stable_probes)
        .await
        .context("API server did not become stable")?;

    wait_for_multiple_resources(&client, &config.wait_for, config.timeout).await?;

    if config.reconcile_flux {
        info!("Waiting for Flux CRDs to become available...");
        wait_for_flux_crds(&client, config.timeout).await?;

        Reconciler::new(client)
            .with_target(config.flux_namespace.clone(), config.flux_name.clone())
            .reconcile(&ReconcileOptions {
                timeout: config.timeout,
            })
            .await?;
    }

    info!("Cluster converged");
    Ok(())
}
