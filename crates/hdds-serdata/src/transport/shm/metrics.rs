// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared-memory segment counters.
//!
//! - `loans`: chunks handed out by `try_loan`
//! - `exhausted`: loan attempts that found no free chunk
//! - `publishes`: chunks published
//! - `deliveries`: chunk handles queued to subscribers
//! - `overruns`: deliveries dropped because a subscriber queue was full
//! - `reclaims`: chunks returned to the free list

use std::sync::atomic::{AtomicU64, Ordering};

/// Segment metrics with atomic counters (`Relaxed`, eventually consistent).
#[derive(Debug, Default)]
pub struct ShmMetrics {
    loans: AtomicU64,
    exhausted: AtomicU64,
    publishes: AtomicU64,
    deliveries: AtomicU64,
    overruns: AtomicU64,
    reclaims: AtomicU64,
}

impl ShmMetrics {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            loans: AtomicU64::new(0),
            exhausted: AtomicU64::new(0),
            publishes: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
            overruns: AtomicU64::new(0),
            reclaims: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn inc_loans(&self) {
        self.loans.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_publishes(&self) {
        self.publishes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_deliveries(&self) {
        self.deliveries.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_overruns(&self) {
        self.overruns.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_reclaims(&self) {
        self.reclaims.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics.
    #[must_use]
    pub fn snapshot(&self) -> ShmMetricsSnapshot {
        ShmMetricsSnapshot {
            loans: self.loans.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
            publishes: self.publishes.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
            reclaims: self.reclaims.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of segment metrics (non-atomic, for reporting).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShmMetricsSnapshot {
    pub loans: u64,
    pub exhausted: u64,
    pub publishes: u64,
    pub deliveries: u64,
    pub overruns: u64,
    pub reclaims: u64,
}

impl ShmMetricsSnapshot {
    /// Chunks loaned and not yet reclaimed.
    #[must_use]
    pub fn outstanding(&self) -> u64 {
        self.loans.saturating_sub(self.reclaims)
    }
}

impl std::fmt::Display for ShmMetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "loans={} exhausted={} publishes={} deliveries={} overruns={} reclaims={}",
            self.loans, self.exhausted, self.publishes, self.deliveries, self.overruns, self.reclaims
        )
    }
}
