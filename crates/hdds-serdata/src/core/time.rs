// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Source timestamps (nanoseconds since the UNIX epoch).

use std::time::{SystemTime, UNIX_EPOCH};

/// Source timestamp attached to a datum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Marker used by type-erased key projections.
    pub const INVALID: Timestamp = Timestamp(i64::MIN);

    #[must_use]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    #[must_use]
    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// Wall-clock time now.
    #[must_use]
    pub fn now() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
            .unwrap_or(0);
        Self(nanos)
    }

    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::INVALID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_valid_and_monotonic_enough() {
        let a = Timestamp::now();
        let b = Timestamp::now();
        assert!(a.is_valid());
        assert!(b >= a);
    }

    #[test]
    fn test_invalid_marker() {
        assert!(!Timestamp::INVALID.is_valid());
        assert!(!Timestamp::from_nanos(-1).is_valid());
        assert!(Timestamp::from_nanos(0).is_valid());
    }
}
