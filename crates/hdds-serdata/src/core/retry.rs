// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounded retry with sleeps.
//!
//! Shared by the two places a write may block: obtaining a shared-memory
//! chunk (fixed attempt budget) and storing into a full local reader
//! (deadline armed on the first failure).

use std::time::{Duration, Instant};

/// How long a [`Backoff`] keeps retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryBudget {
    /// Total number of attempts, including the first one.
    Attempts(u32),
    /// Time allowed after the first failed attempt.
    Deadline(Duration),
}

/// Retry budget exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exhausted;

/// Retry state for one operation.
///
/// Call [`Backoff::wait`] after every failed attempt: it sleeps for the
/// interval and returns `Ok`, or returns `Err(Exhausted)` without sleeping
/// once the budget is spent.
#[derive(Debug)]
pub struct Backoff {
    budget: RetryBudget,
    interval: Duration,
    failures: u32,
    deadline: Option<Instant>,
}

impl Backoff {
    #[must_use]
    pub fn new(budget: RetryBudget, interval: Duration) -> Self {
        Self {
            budget,
            interval,
            failures: 0,
            deadline: None,
        }
    }

    /// Number of failed attempts recorded so far.
    #[must_use]
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Record a failed attempt and pause before the next one.
    pub fn wait(&mut self) -> Result<(), Exhausted> {
        self.failures = self.failures.saturating_add(1);
        match self.budget {
            RetryBudget::Attempts(max) => {
                if self.failures >= max {
                    return Err(Exhausted);
                }
            }
            RetryBudget::Deadline(limit) => {
                let now = Instant::now();
                let deadline = *self.deadline.get_or_insert(now + limit);
                if now >= deadline {
                    return Err(Exhausted);
                }
            }
        }
        std::thread::sleep(self.interval);
        Ok(())
    }
}

/// Run `op` until it yields `Some`, sleeping between attempts.
pub fn retry<T>(
    budget: RetryBudget,
    interval: Duration,
    mut op: impl FnMut() -> Option<T>,
) -> Result<T, Exhausted> {
    let mut backoff = Backoff::new(budget, interval);
    loop {
        if let Some(value) = op() {
            return Ok(value);
        }
        backoff.wait()?;
    }
}
