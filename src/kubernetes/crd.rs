// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD availability checking utilities

use crate::constants::crd::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::constants::flux;
use crate::error::{ConvergeError, Result};
use kube::{discovery::Discovery, Client};
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::{info, warn};

/// Group and kind pairs the GitOps reconciler depends on
const FLUX_RESOURCES: &[(&str, &str)] = &[
    (flux::SOURCE_GROUP, flux::OCI_REPOSITORY_KIND),
    (flux::KUSTOMIZE_GROUP, flux::KUSTOMIZATION_KIND),
];

/// Wait for the Flux OCIRepository and Kustomization CRDs to be served.
/// Polls with exponential backoff starting at POLL_INTERVAL_SECS seconds.
pub async fn wait_for_flux_crds(client: &Client, timeout: Duration) -> Result<()> {
    let deadline = Instant::now() + timeout;
    let mut interval = POLL_INTERVAL_SECS;

    loop {
        match missing_flux_resources(client).await {
            Ok(missing) if missing.is_empty() => {
                info!("Flux CRDs ({}/{}) are available", flux::SOURCE_GROUP, flux::KUSTOMIZE_GROUP);
                return Ok(());
            }
            Ok(missing) => {
                info!(
                    "Flux CRDs not yet available (missing: {}), waiting {} seconds...",
                    missing.join(", "),
                    interval
                );
            }
            Err(e) => {
                warn!("Error checking for Flux CRDs: {}, retrying in {} seconds...", e, interval);
            }
        }

        let next = Instant::now() + Duration::from_secs(interval);
        if next > deadline {
            return Err(ConvergeError::Timeout {
                target: "Flux CRDs".to_string(),
                timeout,
                detail: None,
            });
        }
        sleep_until(next).await;

        // Exponential backoff with max cap
        interval = (interval * 2).min(POLL_MAX_INTERVAL_SECS);
    }
}

/// Discover the Flux API groups and list the `group/kind` pairs not served yet.
async fn missing_flux_resources(client: &Client) -> Result<Vec<String>> {
    let groups: Vec<&str> = FLUX_RESOURCES.iter().map(|(group, _)| *group).collect();
    let discovery = Discovery::new(client.clone()).filter(&groups).run().await?;

    Ok(FLUX_RESOURCES
        .iter()
        .filter(|(group, kind)| {
            !discovery.groups().any(|g| {
                g.name() == *group
                    && g.recommended_resources()
                        .iter()
                        .any(|(ar, _)| ar.kind == *kind && ar.version == flux::VERSION)
            })
        })
        .map(|(group, kind)| format!("{}/{}", group, kind))
        .collect())
}
