// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Poll a resource until its observed state is classified as converged or failed.
//!
//! Each resource kind only supplies the classification; interval, deadline and the
//! bookkeeping for the timeout diagnostic live here.

use crate::error::ConvergeError;
use crate::readiness::poll_for_readiness_every;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Outcome of classifying one observation
#[derive(Debug)]
pub enum Verdict {
    /// Desired state reached, stop polling
    Converged,
    /// Not there yet; the string describes the current state
    Pending(String),
    /// Fetch failed in a way expected to resolve itself
    Retry(kube::Error),
    /// Terminal failure, stop polling
    Failed(ConvergeError),
}

/// What the poller last saw before the deadline
#[derive(Debug, Default)]
pub struct Progress {
    pub last_status: Option<String>,
    pub last_error: Option<kube::Error>,
}

#[derive(Debug)]
pub enum Unconverged {
    Failed(ConvergeError),
    TimedOut(Progress),
}

/// Fetch and classify at a fixed interval until the verdict is terminal or `timeout` elapses.
///
/// Classifiers must not produce [`ConvergeError::Timeout`] as a failure.
pub async fn poll_until_classified<T, F, Fut, C>(
    target: &str,
    timeout: Duration,
    interval: Duration,
    mut fetch: F,
    classify: C,
) -> Result<(), Unconverged>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, kube::Error>>,
    C: Fn(Result<T, kube::Error>) -> Verdict,
{
    let progress = Mutex::new(Progress::default());
    let progress_ref = &progress;
    let classify = &classify;

    let outcome = poll_for_readiness_every(target, timeout, interval, move || {
        let fetched = fetch();
        async move {
            match classify(fetched.await) {
                Verdict::Converged => Ok(true),
                Verdict::Pending(status) => {
                    debug!(%status, "{} not converged yet", target);
                    if let Ok(mut progress) = progress_ref.lock() {
                        progress.last_status = Some(status);
                    }
                    Ok(false)
                }
                Verdict::Retry(err) => {
                    debug!(error = %err, "Transient error fetching {}", target);
                    if let Ok(mut progress) = progress_ref.lock() {
                        progress.last_error = Some(err);
                    }
                    Ok(false)
                }
                Verdict::Failed(err) => Err(err),
            }
        }
    })
    .await;

    match outcome {
        Ok(()) => Ok(()),
        Err(ConvergeError::Timeout { .. }) => Err(Unconverged::TimedOut(
            progress.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner()),
        )),
        Err(err) => Err(Unconverged::Failed(err)),
    }
}
