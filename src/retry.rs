// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Exponential backoff bounded by an attempt count and an overall deadline.

use std::time::Duration;
use tokio::time::Instant;

/// Retry configuration for writes that race controllers right after bootstrap.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Maximum number of attempts (0 = bounded only by the deadline)
    pub max_attempts: u32,
    /// Overall time budget, measured from the first attempt
    pub deadline: Duration,
    /// Delay after the first failed attempt
    pub initial_delay: Duration,
    /// Upper bound for a single delay
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            deadline: Duration::from_secs(120),
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn with_deadline(deadline: Duration) -> Self {
        Self {
            deadline,
            ..Default::default()
        }
    }

    /// Start a backoff cursor; the deadline clock starts now.
    pub fn start(&self) -> Backoff {
        Backoff {
            deadline: Instant::now() + self.deadline,
            next: self.initial_delay,
            attempts: 0,
            policy: self.clone(),
        }
    }
}

/// Per-call retry state. Nothing is shared between calls.
#[derive(Debug)]
pub struct Backoff {
    policy: RetryPolicy,
    deadline: Instant,
    next: Duration,
    attempts: u32,
}

impl Backoff {
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Number of failed attempts recorded so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Record a failed attempt and return how long to wait before the next one.
    ///
    /// Returns `None` when the attempt budget is spent or the wait would run past the deadline.
    pub fn next_delay(&mut self) -> Option<Duration> {
        self.attempts += 1;
        if self.policy.max_attempts > 0 && self.attempts >= self.policy.max_attempts {
            return None;
        }

        let delay = self.next.min(self.policy.max_delay);
        if Instant::now() + delay > self.deadline {
            return None;
        }

        self.next = Duration::from_secs_f64(
            (self.next.as_secs_f64() * self.policy.multiplier)
                .min(self.policy.max_delay.as_secs_f64()),
        );
        Some(delay)
    }
}
