// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Request an immediate reconcile by stamping the Flux `requestedAt` annotation.

use crate::constants::annotations;
use crate::error::{ConvergeError, Result, TriggerStage};
use crate::kubernetes::classify::classify;
use crate::retry::{Backoff, RetryPolicy};
use chrono::{SecondsFormat, Utc};
use kube::api::{DynamicObject, PostParams};
use kube::{Api, ResourceExt};
use tokio::time::{sleep, timeout_at};
use tracing::{debug, info, instrument, warn};

/// Current time as RFC 3339 with nanoseconds, the value Flux compares against
pub fn requested_at_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Set the reconcile annotation on `name`, retrying transient failures within `policy`.
///
/// Every attempt starts with a fresh `get`: after a conflict the held object is stale, so it is
/// never resubmitted.
#[instrument(skip(api, policy))]
pub async fn trigger_reconciliation_with_retry(
    api: &Api<DynamicObject>,
    name: &str,
    description: &str,
    policy: &RetryPolicy,
) -> Result<()> {
    let mut backoff = policy.start();
    let deadline = backoff.deadline();
    let timed_out = |last: &kube::Error| ConvergeError::Timeout {
        target: format!("{} reconciliation trigger", description),
        timeout: policy.deadline,
        detail: Some(last.to_string()),
    };

    loop {
        let fetched = timeout_at(deadline, api.get(name)).await.map_err(|_| {
            ConvergeError::Timeout {
                target: format!("{} reconciliation trigger", description),
                timeout: policy.deadline,
                detail: None,
            }
        })?;

        let mut obj = match fetched {
            Ok(obj) => obj,
            Err(e) if classify(&e).is_transient() => {
                wait_before_retry(&mut backoff, "get", description, &e)
                    .await
                    .ok_or_else(|| timed_out(&e))?;
                continue;
            }
            Err(source) => {
                return Err(ConvergeError::Trigger {
                    stage: TriggerStage::Get,
                    description: description.to_string(),
                    source,
                })
            }
        };

        let requested_at = requested_at_now();
        obj.annotations_mut()
            .insert(annotations::RECONCILE_REQUESTED_AT.to_string(), requested_at.clone());

        let updated = timeout_at(deadline, api.replace(name, &PostParams::default(), &obj))
            .await
            .map_err(|_| ConvergeError::Timeout {
                target: format!("{} reconciliation trigger", description),
                timeout: policy.deadline,
                detail: None,
            })?;

        match updated {
            Ok(_) => {
                info!(%requested_at, "Requested {} reconciliation", description);
                return Ok(());
            }
            Err(e) if classify(&e).is_transient() => {
                wait_before_retry(&mut backoff, "update", description, &e)
                    .await
                    .ok_or_else(|| timed_out(&e))?;
            }
            Err(source) => {
                return Err(ConvergeError::Trigger {
                    stage: TriggerStage::Update,
                    description: description.to_string(),
                    source,
                })
            }
        }
    }
}

/// Sleep for the next backoff step; `None` once the retry budget is spent.
async fn wait_before_retry(
    backoff: &mut Backoff,
    operation: &str,
    description: &str,
    err: &kube::Error,
) -> Option<()> {
    let Some(delay) = backoff.next_delay() else {
        warn!(
            attempts = backoff.attempts(),
            error = %err,
            "Giving up on {} {}",
            operation,
            description
        );
        return None;
    };

    debug!(
        attempt = backoff.attempts(),
        error = %err,
        delay_ms = delay.as_millis() as u64,
        "Transient error on {} {}, retrying",
        operation,
        description
    );
    sleep(delay).await;
    Some(())
}
