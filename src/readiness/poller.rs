// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Fixed-interval, deadline-bounded polling.

use crate::constants::polling::POLL_INTERVAL;
use crate::error::{ConvergeError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::trace;

/// Poll `check` every [`POLL_INTERVAL`] until it reports ready or `timeout` elapses.
///
/// See [`poll_for_readiness_every`].
pub async fn poll_for_readiness<F, Fut>(target: &str, timeout: Duration, check: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    poll_for_readiness_every(target, timeout, POLL_INTERVAL, check).await
}

/// Poll `check` at a fixed interval until it returns `Ok(true)`.
///
/// The first check runs immediately, not one interval after the call starts, so an already
/// ready resource returns without sleeping. `Ok(false)` keeps polling. An `Err` aborts at once and is
/// returned unchanged: checks that want to tolerate errors must map them to `Ok(false)`
/// themselves. The deadline is fixed when the call starts; a check still in flight at the
/// deadline is dropped and the call fails with [`ConvergeError::Timeout`], never earlier
/// than `timeout` after the call started.
pub async fn poll_for_readiness_every<F, Fut>(
    target: &str,
    timeout: Duration,
    interval: Duration,
    mut check: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let deadline = Instant::now() + timeout;
    let timed_out = || ConvergeError::Timeout {
        target: target.to_string(),
        timeout,
        detail: None,
    };

    loop {
        match timeout_at(deadline, check()).await {
            Ok(Ok(true)) => return Ok(()),
            Ok(Ok(false)) => trace!("{} not ready yet", target),
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(timed_out()),
        }

        let next = Instant::now() + interval;
        if next > deadline {
            sleep_until(deadline).await;
            return Err(timed_out());
        }
        sleep_until(next).await;
    }
}
