// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! API server reachability. Probe errors are expected while the server starts, so they only
//! mean "not yet".

use crate::error::Result;
use crate::readiness::poller::poll_for_readiness;
use kube::Client;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Wait until the API server answers a version request.
#[instrument(skip(client))]
pub async fn wait_for_api_server_ready(client: &Client, timeout: Duration) -> Result<()> {
    wait_for_api_server_stable(client, timeout, 1).await
}

/// Wait until the API server answers `required_successes` consecutive version requests.
///
/// Any failed probe resets the streak to zero. Values below 1 are treated as 1.
#[instrument(skip(client))]
pub async fn wait_for_api_server_stable(
    client: &Client,
    timeout: Duration,
    required_successes: u32,
) -> Result<()> {
    let required = required_successes.max(1);
    let streak = AtomicU32::new(0);
    let streak = &streak;

    poll_for_readiness("API server", timeout, move || async move {
        match client.apiserver_version().await {
            Ok(info) => {
                let successes = streak.fetch_add(1, Ordering::SeqCst) + 1;
                debug!(version = %info.git_version, successes, required, "API server responded");
                Ok(successes >= required)
            }
            Err(e) => {
                streak.store(0, Ordering::SeqCst);
                debug!(error = %e, "API server not responding yet");
                Ok(false)
            }
        }
    })
    .await?;

    info!("API server is ready");
    Ok(())
}
