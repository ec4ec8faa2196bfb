// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deployment and DaemonSet readiness.
//!
//! Fetch errors are not retried: a failed `get`, including a 404 for an object that was
//! created a moment ago, aborts the wait immediately.

use crate::error::{ConvergeError, Result};
use crate::readiness::poller::poll_for_readiness;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment};
use kube::{Api, Client};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// All replicas are updated and available. Zero everywhere counts as ready.
pub fn is_deployment_ready(deployment: &Deployment) -> bool {
    let status = deployment.status.as_ref();
    let replicas = status.and_then(|s| s.replicas).unwrap_or(0);
    let updated = status.and_then(|s| s.updated_replicas).unwrap_or(0);
    let available = status.and_then(|s| s.available_replicas).unwrap_or(0);

    replicas == updated && updated == available
}

/// Every scheduled pod runs the latest template and none is unavailable.
pub fn is_daemonset_ready(daemonset: &DaemonSet) -> bool {
    let Some(status) = daemonset.status.as_ref() else {
        return true;
    };

    status.desired_number_scheduled == status.updated_number_scheduled.unwrap_or(0)
        && status.number_unavailable.unwrap_or(0) == 0
}

#[instrument(skip(client, timeout))]
pub async fn wait_for_deployment_ready(
    client: &Client,
    namespace: &str,
    name: &str,
    timeout: Duration,
) -> Result<()> {
    let deployments: Api<Deployment> = Api::namespaced(client.clone(), namespace);
    let deployments = &deployments;

    poll_for_readiness(
        &format!("deployment {}/{}", namespace, name),
        timeout,
        move || async move {
            let deployment = deployments
                .get(name)
                .await
                .map_err(|source| get_error("deployment", namespace, name, source))?;
            let ready = is_deployment_ready(&deployment);
            debug!(ready, "Checked deployment");
            Ok(ready)
        },
    )
    .await?;

    info!("Deployment {}/{} is ready", namespace, name);
    Ok(())
}

#[instrument(skip(client, timeout))]
pub async fn wait_for_daemonset_ready(
    client: &Client,
    namespace: &str,
    name: &str,
    timeout: Duration,
) -> Result<()> {
    let daemonsets: Api<DaemonSet> = Api::namespaced(client.clone(), namespace);
    let daemonsets = &daemonsets;

    poll_for_readiness(
        &format!("daemonset {}/{}", namespace, name),
        timeout,
        move || async move {
            let daemonset = daemonsets
                .get(name)
                .await
                .map_err(|source| get_error("daemonset", namespace, name, source))?;
            let ready = is_daemonset_ready(&daemonset);
            debug!(ready, "Checked daemonset");
            Ok(ready)
        },
    )
    .await?;

    info!("DaemonSet {}/{} is ready", namespace, name);
    Ok(())
}

fn get_error(kind: &'static str, namespace: &str, name: &str, source: kube::Error) -> ConvergeError {
    ConvergeError::GetResource {
        kind,
        namespace: namespace.to_string(),
        name: name.to_string(),
        source,
    }
}
