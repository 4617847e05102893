// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Keyed vs keyless datum behaviour, picked once per type.

use super::Serdata;
use crate::core::keyhash::{KeyHash, KEYHASH_SIZE};
use crate::core::ser::SerResult;
use crate::core::types::{KeyLayout, SerType};
use std::fmt;
use std::sync::Arc;

/// Operations whose behaviour depends on whether a type has a key.
pub trait KeyOps: Send + Sync + fmt::Debug {
    /// Placement hash of a datum with descriptor `keyhash`.
    fn fast_hash(&self, keyhash: &KeyHash, base_hash: u32) -> u32;

    /// `a` and `b` designate the same instance.
    fn eq_key(&self, a: &Serdata, b: &Serdata) -> bool;

    /// Key datum for a key hash received from the wire.
    fn from_keyhash(&self, ty: &Arc<dyn SerType>, keyhash: &[u8; KEYHASH_SIZE]) -> SerResult<Serdata>;
}

/// Types with key fields.
#[derive(Debug)]
pub struct WithKey;

/// Types without key fields: a single instance.
#[derive(Debug)]
pub struct NoKey;

static WITH_KEY: WithKey = WithKey;
static NO_KEY: NoKey = NoKey;

/// Operations for a key layout.
#[must_use]
pub fn key_ops_for(layout: KeyLayout) -> &'static dyn KeyOps {
    match layout {
        KeyLayout::NoKey => &NO_KEY,
        KeyLayout::Fixed | KeyLayout::Variable => &WITH_KEY,
    }
}

impl KeyOps for WithKey {
    fn fast_hash(&self, keyhash: &KeyHash, base_hash: u32) -> u32 {
        keyhash.fast_hash(base_hash)
    }

    fn eq_key(&self, a: &Serdata, b: &Serdata) -> bool {
        a.keyhash().value == b.keyhash().value
    }

    fn from_keyhash(&self, ty: &Arc<dyn SerType>, keyhash: &[u8; KEYHASH_SIZE]) -> SerResult<Serdata> {
        Serdata::fixed_key(ty, keyhash)
    }
}

impl KeyOps for NoKey {
    fn fast_hash(&self, _keyhash: &KeyHash, base_hash: u32) -> u32 {
        base_hash
    }

    fn eq_key(&self, _a: &Serdata, _b: &Serdata) -> bool {
        true
    }

    fn from_keyhash(&self, ty: &Arc<dyn SerType>, _keyhash: &[u8; KEYHASH_SIZE]) -> SerResult<Serdata> {
        Ok(Serdata::keyless_key(ty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CdrType, SampleKind};
    use crate::testing::{pool, Blob, Sensor};

    #[test]
    fn test_keyless_datums_share_one_instance() {
        let ty = CdrType::<Blob>::new(pool());
        let a = Serdata::from_sample(&ty, SampleKind::Data, &Blob(vec![1])).expect("a");
        let b = Serdata::from_sample(&ty, SampleKind::Data, &Blob(vec![2, 3])).expect("b");
        assert!(a.eq_key(&b));
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.hash(), ty.base_hash());
    }

    #[test]
    fn test_keyed_datums_compare_by_key() {
        let ty = CdrType::<Sensor>::new(pool());
        let a = Serdata::from_sample(&ty, SampleKind::Data, &Sensor::new(1, 0.5)).expect("a");
        let b = Serdata::from_sample(&ty, SampleKind::Data, &Sensor::new(1, 9.5)).expect("b");
        let c = Serdata::from_sample(&ty, SampleKind::Data, &Sensor::new(2, 0.5)).expect("c");
        assert!(a.eq_key(&b));
        assert_eq!(a.hash(), b.hash());
        assert!(!a.eq_key(&c));
    }

    #[test]
    fn test_layout_selects_ops() {
        assert!(format!("{:?}", key_ops_for(KeyLayout::NoKey)).contains("NoKey"));
        assert!(format!("{:?}", key_ops_for(KeyLayout::Variable)).contains("WithKey"));
    }
}
