// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client creation from the configured or inferred kubeconfig

use crate::config::Config;
use crate::error::{ConvergeError, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;
use std::path::Path;
use tracing::{info, instrument};

/// Create a client for the target cluster.
///
/// Uses the configured kubeconfig file and context when set, the inferred default otherwise.
#[instrument(skip(config))]
pub async fn create_client(config: &Config) -> Result<Client> {
    match &config.kubeconfig {
        Some(path) => create_client_from_file(path, config.context.as_deref()).await,
        None if config.context.is_some() => {
            let options = KubeConfigOptions {
                context: config.context.clone(),
                ..Default::default()
            };
            let client_config = kube::Config::from_kubeconfig(&options)
                .await
                .map_err(|e| ConvergeError::Kubeconfig(format!("Failed to load config: {}", e)))?;
            Client::try_from(client_config).map_err(|e| {
                ConvergeError::Kubeconfig(format!("Failed to create client: {}", e))
            })
        }
        None => Client::try_default().await.map_err(|e| {
            ConvergeError::Kubeconfig(format!("Failed to infer client config: {}", e))
        }),
    }
}

async fn create_client_from_file(path: &Path, context: Option<&str>) -> Result<Client> {
    info!("Loading kubeconfig from {}", path.display());

    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        ConvergeError::Kubeconfig(format!("Failed to read {}: {}", path.display(), e))
    })?;

    create_client_from_kubeconfig(&raw, context).await
}

/// Create a Kubernetes client from a kubeconfig string
pub async fn create_client_from_kubeconfig(kubeconfig: &str, context: Option<&str>) -> Result<Client> {
    let kubeconfig_parsed: Kubeconfig = serde_yaml::from_str(kubeconfig)
        .map_err(|e| ConvergeError::Kubeconfig(format!("Failed to parse kubeconfig: {}", e)))?;

    let options = KubeConfigOptions {
        context: context.map(str::to_string),
        ..Default::default()
    };

    let client_config = kube::Config::from_custom_kubeconfig(kubeconfig_parsed, &options)
        .await
        .map_err(|e| ConvergeError::Kubeconfig(format!("Failed to create config: {}", e)))?;

    Client::try_from(client_config)
        .map_err(|e| ConvergeError::Kubeconfig(format!("Failed to create client: {}", e)))
}
