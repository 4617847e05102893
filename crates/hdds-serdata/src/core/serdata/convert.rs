// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Presenting a datum as another type.
//!
//! | Source type                 | Result                                        |
//! |-----------------------------|-----------------------------------------------|
//! | same type                   | the same datum (one more reference)           |
//! | same family                 | bytes shared, key re-extracted by the target  |
//! | other family or untyped     | bytes shared, key descriptor copied as is     |
//!
//! The last case cannot validate the bytes against the target type: a sample
//! that does not match it fails later, when it is decoded.

use super::{Serdata, SerdataInner};
use crate::core::ser::SerResult;
use crate::core::types::{same_type, SampleKind, SerType};
use std::sync::Arc;

impl Serdata {
    /// Datum presenting this sample as `ty`.
    pub fn ref_as_type(&self, ty: &Arc<dyn SerType>) -> SerResult<Serdata> {
        match self.ser_type() {
            Some(src) if same_type(src, ty) => Ok(self.clone()),
            Some(src) if src.family() == ty.family() => self.retag(ty, true),
            _ => self.retag(ty, false),
        }
    }

    fn retag(&self, ty: &Arc<dyn SerType>, reextract: bool) -> SerResult<Serdata> {
        let keyhash = if reextract && self.kind() != SampleKind::Empty {
            ty.keyhash_of(&self.payload()?, self.kind().is_key())?
        } else {
            self.0.keyhash
        };
        let hash = ty.key_ops().fast_hash(&keyhash, ty.base_hash());
        Ok(Serdata(Arc::new(SerdataInner {
            kind: self.0.kind,
            ser_type: Some(Arc::clone(ty)),
            hash,
            timestamp: self.0.timestamp,
            statusinfo: self.0.statusinfo,
            keyhash,
            storage: self.0.storage.clone(),
        })))
    }
}

/// Bring `din` to the writer's type, consuming it.
///
/// A datum already of the writer's type is returned as is, so the caller's
/// reference count does not change. Otherwise the input is released and a
/// converted datum returned; on failure the input is released too.
pub fn convert_for_writer(writer_type: &Arc<dyn SerType>, din: Serdata) -> SerResult<Serdata> {
    if let Some(src) = din.ser_type() {
        if same_type(src, writer_type) {
            return Ok(din);
        }
    }
    let converted = din.ref_as_type(writer_type);
    if let Err(e) = &converted {
        log::debug!(
            "[serdata] conversion to {} failed: {}",
            writer_type.type_name(),
            e
        );
    }
    converted
}
