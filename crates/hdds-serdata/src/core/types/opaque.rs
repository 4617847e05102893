// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{KeyLayout, SerType, TypeFamily};
use crate::core::hash::mh3;
use crate::core::keyhash::KeyHash;
use crate::core::ser::{ByteOrder, SerResult};
use crate::core::serdata::ops::{key_ops_for, KeyOps};
use crate::core::serdata::SerdataPool;
use std::any::Any;
use std::sync::Arc;

/// Keyless type whose payload is kept as uninterpreted bytes.
///
/// Used for bridges that forward samples of a representation this crate does
/// not decode. Datums of this type take the key descriptor they were built
/// with and are never normalized.
#[derive(Debug)]
pub struct OpaqueType {
    name: String,
    family: &'static str,
    base_hash: u32,
    pool: Arc<SerdataPool>,
}

impl OpaqueType {
    #[must_use]
    pub fn new(name: impl Into<String>, family: &'static str, pool: Arc<SerdataPool>) -> Arc<Self> {
        let name = name.into();
        Arc::new(Self {
            base_hash: mh3(name.as_bytes(), 0),
            name,
            family,
            pool,
        })
    }
}

impl SerType for OpaqueType {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> TypeFamily {
        TypeFamily::Other(self.family)
    }

    fn base_hash(&self) -> u32 {
        self.base_hash
    }

    fn key_layout(&self) -> KeyLayout {
        KeyLayout::NoKey
    }

    fn pool(&self) -> &Arc<SerdataPool> {
        &self.pool
    }

    fn key_ops(&self) -> &'static dyn KeyOps {
        key_ops_for(KeyLayout::NoKey)
    }

    fn normalize(&self, payload: &mut [u8], _order: ByteOrder, _key_only: bool) -> SerResult<usize> {
        Ok(payload.len())
    }

    fn keyhash_of(&self, _payload: &[u8], _key_only: bool) -> SerResult<KeyHash> {
        Ok(KeyHash::keyless())
    }

    fn key_of(&self, _payload: &[u8], _key_only: bool) -> SerResult<Vec<u8>> {
        Ok(Vec::new())
    }

    fn render(&self, payload: &[u8], _key_only: bool) -> SerResult<String> {
        let hex: String = payload.iter().map(|b| format!("{:02x}", b)).collect();
        Ok(format!("{}[{}]", self.name, hex))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
