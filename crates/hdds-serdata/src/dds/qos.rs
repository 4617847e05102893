// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Writer QoS policies consulted by the write path.
//!
//! Only the policies that change how a sample travels are modelled:
//! durability (decides whether the lazy shared-memory path is allowed),
//! reliability (max blocking time for local backpressure), batching and the
//! shared-memory selection policy.

use crate::config::DEFAULT_MAX_BLOCKING_TIME;
use std::time::Duration;

/// Durability QoS policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Durability {
    /// No history kept for late joiners (default).
    #[default]
    Volatile,
    /// History kept by the writer for late-joining readers.
    TransientLocal,
    /// History kept by a durability service.
    Transient,
    /// History survives the writer process.
    Persistent,
}

impl Durability {
    /// Only volatile writers may skip serialization.
    #[must_use]
    pub fn is_volatile(self) -> bool {
        matches!(self, Durability::Volatile)
    }
}

/// Reliability kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ReliabilityKind {
    #[default]
    BestEffort,
    Reliable,
}

/// Reliability QoS policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reliability {
    pub kind: ReliabilityKind,
    /// Upper bound a write may block on a full local reader.
    pub max_blocking_time: Duration,
}

impl Default for Reliability {
    fn default() -> Self {
        Self {
            kind: ReliabilityKind::BestEffort,
            max_blocking_time: DEFAULT_MAX_BLOCKING_TIME,
        }
    }
}

/// Shared-memory selection policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ShmPolicy {
    /// Use shared memory when the writer and its type allow it (default).
    #[default]
    Prefer,
    /// Fail writer creation if shared memory cannot be used.
    Require,
    /// Never use shared memory.
    Disable,
}

/// Writer QoS.
///
/// # Example
///
/// ```
/// use hdds_serdata::dds::{Durability, WriterQos};
/// use std::time::Duration;
///
/// let qos = WriterQos::reliable()
///     .durability(Durability::TransientLocal)
///     .max_blocking_time(Duration::from_millis(50))
///     .batching(true);
/// assert!(!qos.durability.is_volatile());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct WriterQos {
    pub durability: Durability,
    pub reliability: Reliability,
    /// Keep enqueued network data until an explicit or budget-triggered
    /// flush instead of flushing after every write.
    pub batching: bool,
    pub shm: ShmPolicy,
}

impl WriterQos {
    #[must_use]
    pub fn best_effort() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn reliable() -> Self {
        Self {
            reliability: Reliability {
                kind: ReliabilityKind::Reliable,
                ..Reliability::default()
            },
            ..Self::default()
        }
    }

    #[must_use]
    pub fn durability(mut self, durability: Durability) -> Self {
        self.durability = durability;
        self
    }

    #[must_use]
    pub fn max_blocking_time(mut self, max_blocking_time: Duration) -> Self {
        self.reliability.max_blocking_time = max_blocking_time;
        self
    }

    #[must_use]
    pub fn batching(mut self, batching: bool) -> Self {
        self.batching = batching;
        self
    }

    #[must_use]
    pub fn shm(mut self, policy: ShmPolicy) -> Self {
        self.shm = policy;
        self
    }

    pub fn is_reliable(&self) -> bool {
        self.reliability.kind == ReliabilityKind::Reliable
    }
}
