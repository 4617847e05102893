// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{KeyLayout, SampleKind, DDS};
use crate::core::hash::mh3;
use crate::core::keyhash::KeyHash;
use crate::core::ser::{ByteOrder, CdrReader, CdrWriter, SerError, SerResult};
use crate::core::serdata::ops::{key_ops_for, KeyOps};
use crate::core::serdata::SerdataPool;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Wire-format family of a type. Datums of the same family can share bytes
/// after re-extracting the key; across families they can only be wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFamily {
    /// Plain CDR with a 4-byte encapsulation header.
    Cdr,
    /// Any other representation, named by its implementor.
    Other(&'static str),
}

/// Type-erased descriptor carried by every typed datum.
///
/// All payload slices handed to these methods are native-order CDR without
/// the encapsulation header.
pub trait SerType: Send + Sync + fmt::Debug + 'static {
    fn type_name(&self) -> &str;

    fn family(&self) -> TypeFamily;

    /// Per-type seed mixed into every datum hash.
    fn base_hash(&self) -> u32;

    fn key_layout(&self) -> KeyLayout;

    /// Buffer pool for datums of this type.
    fn pool(&self) -> &Arc<SerdataPool>;

    /// Keyed or keyless handling, fixed when the type is created.
    fn key_ops(&self) -> &'static dyn KeyOps;

    /// Validate `payload` written in `order` and rewrite it in native order.
    ///
    /// Returns the number of bytes the encoding occupies, which may be less
    /// than `payload.len()` (trailing bytes are ignored).
    fn normalize(&self, payload: &mut [u8], order: ByteOrder, key_only: bool) -> SerResult<usize>;

    /// Key descriptor of a native payload.
    fn keyhash_of(&self, payload: &[u8], key_only: bool) -> SerResult<KeyHash>;

    /// Native key-only encoding of a native payload.
    fn key_of(&self, payload: &[u8], key_only: bool) -> SerResult<Vec<u8>>;

    /// Human-readable rendering of a native payload.
    fn render(&self, payload: &[u8], key_only: bool) -> SerResult<String>;

    /// Footprint of a loaned sample, `None` if the type cannot be loaned.
    fn loan_size(&self) -> Option<usize> {
        None
    }

    /// Key descriptor of a loaned sample.
    fn keyhash_of_loan(&self, _raw: &[u8]) -> SerResult<KeyHash> {
        Err(SerError::invalid(format!("{} cannot be loaned", self.type_name())))
    }

    /// Append the native payload of a loaned sample to `out`.
    fn encode_loan(&self, _raw: &[u8], _key_only: bool, _out: &mut Vec<u8>) -> SerResult<()> {
        Err(SerError::invalid(format!("{} cannot be loaned", self.type_name())))
    }

    fn as_any(&self) -> &dyn Any;
}

/// Identity comparison of two type descriptors.
#[must_use]
pub fn same_type(a: &Arc<dyn SerType>, b: &Arc<dyn SerType>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const u8,
        Arc::as_ptr(b) as *const u8,
    )
}

/// [`SerType`] of an application sample type.
pub struct CdrType<T: DDS> {
    base_hash: u32,
    pool: Arc<SerdataPool>,
    ops: &'static dyn KeyOps,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DDS> CdrType<T> {
    /// Register `T`, drawing datum buffers from `pool`.
    #[must_use]
    pub fn new(pool: Arc<SerdataPool>) -> Arc<Self> {
        Arc::new(Self {
            base_hash: mh3(T::TYPE_NAME.as_bytes(), 0),
            pool,
            ops: key_ops_for(T::KEY_LAYOUT),
            _marker: PhantomData,
        })
    }

    /// Append the native encoding of `sample` for `kind` to `out`.
    pub(crate) fn encode_sample(
        &self,
        sample: &T,
        kind: SampleKind,
        out: &mut Vec<u8>,
    ) -> SerResult<()> {
        let mut w = CdrWriter::new(out, ByteOrder::native());
        match kind {
            SampleKind::Empty => Ok(()),
            SampleKind::Key => sample.encode_key(&mut w),
            SampleKind::Data => sample.encode(&mut w),
        }
    }

    fn decode(payload: &[u8], order: ByteOrder, key_only: bool) -> SerResult<(T, usize)> {
        let mut r = CdrReader::new(payload, order);
        let sample = if key_only {
            T::decode_key(&mut r)?
        } else {
            T::decode(&mut r)?
        };
        Ok((sample, r.offset()))
    }

    fn load(raw: &[u8]) -> SerResult<T> {
        let size = T::loan_size()
            .ok_or_else(|| SerError::invalid(format!("{} cannot be loaned", T::TYPE_NAME)))?;
        if raw.len() < size {
            return Err(SerError::invalid(format!(
                "loaned buffer of {} bytes, {} needs {}",
                raw.len(),
                T::TYPE_NAME,
                size
            )));
        }
        T::load_loan(&raw[..size])
    }
}

impl<T: DDS> fmt::Debug for CdrType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdrType")
            .field("name", &T::TYPE_NAME)
            .field("key_layout", &T::KEY_LAYOUT)
            .field("base_hash", &format_args!("{:#010x}", self.base_hash))
            .finish()
    }
}

impl<T: DDS> SerType for CdrType<T> {
    fn type_name(&self) -> &str {
        T::TYPE_NAME
    }

    fn family(&self) -> TypeFamily {
        TypeFamily::Cdr
    }

    fn base_hash(&self) -> u32 {
        self.base_hash
    }

    fn key_layout(&self) -> KeyLayout {
        T::KEY_LAYOUT
    }

    fn pool(&self) -> &Arc<SerdataPool> {
        &self.pool
    }

    fn key_ops(&self) -> &'static dyn KeyOps {
        self.ops
    }

    fn normalize(&self, payload: &mut [u8], order: ByteOrder, key_only: bool) -> SerResult<usize> {
        let (sample, consumed) = Self::decode(payload, order, key_only)?;
        let mut native = Vec::with_capacity(consumed);
        let kind = if key_only {
            SampleKind::Key
        } else {
            SampleKind::Data
        };
        self.encode_sample(&sample, kind, &mut native)?;
        if native.len() != consumed {
            return Err(SerError::invalid(format!(
                "{}: {} bytes re-encode to {}",
                T::TYPE_NAME,
                consumed,
                native.len()
            )));
        }
        if !order.is_native() {
            payload[..consumed].copy_from_slice(&native);
        }
        Ok(consumed)
    }

    fn keyhash_of(&self, payload: &[u8], key_only: bool) -> SerResult<KeyHash> {
        if T::KEY_LAYOUT == KeyLayout::NoKey {
            return Ok(KeyHash::keyless());
        }
        let (sample, _) = Self::decode(payload, ByteOrder::native(), key_only)?;
        KeyHash::from_sample(&sample)
    }

    fn key_of(&self, payload: &[u8], key_only: bool) -> SerResult<Vec<u8>> {
        if T::KEY_LAYOUT == KeyLayout::NoKey {
            return Ok(Vec::new());
        }
        let (sample, _) = Self::decode(payload, ByteOrder::native(), key_only)?;
        let mut key = Vec::new();
        self.encode_sample(&sample, SampleKind::Key, &mut key)?;
        Ok(key)
    }

    fn render(&self, payload: &[u8], key_only: bool) -> SerResult<String> {
        let (sample, _) = Self::decode(payload, ByteOrder::native(), key_only)?;
        Ok(format!("{:?}", sample))
    }

    fn loan_size(&self) -> Option<usize> {
        T::loan_size()
    }

    fn keyhash_of_loan(&self, raw: &[u8]) -> SerResult<KeyHash> {
        KeyHash::from_sample(&Self::load(raw)?)
    }

    fn encode_loan(&self, raw: &[u8], key_only: bool, out: &mut Vec<u8>) -> SerResult<()> {
        let sample = Self::load(raw)?;
        let kind = if key_only {
            SampleKind::Key
        } else {
            SampleKind::Data
        };
        self.encode_sample(&sample, kind, out)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SerdataConfig;

    #[derive(Debug, PartialEq)]
    struct Reading {
        id: u16,
        value: u64,
    }

    impl DDS for Reading {
        const TYPE_NAME: &'static str = "test::Reading";
        const KEY_LAYOUT: KeyLayout = KeyLayout::Fixed;
        fn encode(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
            w.write_u16(self.id)?;
            w.write_u64(self.value)
        }
        fn decode(r: &mut CdrReader<'_>) -> SerResult<Self> {
            Ok(Self {
                id: r.read_u16()?,
                value: r.read_u64()?,
            })
        }
        fn encode_key(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
            w.write_u16(self.id)
        }
        fn decode_key(r: &mut CdrReader<'_>) -> SerResult<Self> {
            Ok(Self {
                id: r.read_u16()?,
                value: 0,
            })
        }
    }

    fn ty() -> Arc<CdrType<Reading>> {
        CdrType::new(Arc::new(SerdataPool::new(&SerdataConfig::default())))
    }

    fn foreign_order() -> ByteOrder {
        match ByteOrder::native() {
            ByteOrder::Big => ByteOrder::Little,
            ByteOrder::Little => ByteOrder::Big,
        }
    }

    #[test]
    fn test_normalize_swaps_foreign_order() {
        let ty = ty();
        let sample = Reading { id: 0x0102, value: 7 };
        let mut foreign = Vec::new();
        let mut w = CdrWriter::new(&mut foreign, foreign_order());
        sample.encode(&mut w).expect("encode");

        let mut native = Vec::new();
        ty.encode_sample(&sample, SampleKind::Data, &mut native)
            .expect("encode");

        let consumed = ty
            .normalize(&mut foreign, foreign_order(), false)
            .expect("normalize");
        assert_eq!(consumed, native.len());
        assert_eq!(foreign, native);
    }

    #[test]
    fn test_normalize_native_is_noop_and_ignores_trailing() {
        let ty = ty();
        let mut payload = Vec::new();
        ty.encode_sample(&Reading { id: 3, value: 4 }, SampleKind::Data, &mut payload)
            .expect("encode");
        let before = payload.clone();
        payload.extend_from_slice(&[0xEE; 3]);
        let consumed = ty
            .normalize(&mut payload, ByteOrder::native(), false)
            .expect("normalize");
        assert_eq!(consumed, before.len());
        assert_eq!(&payload[..consumed], &before[..]);
    }

    #[test]
    fn test_normalize_rejects_truncated() {
        let ty = ty();
        let mut payload = vec![0u8; 5];
        assert!(ty.normalize(&mut payload, ByteOrder::native(), false).is_err());
    }

    #[test]
    fn test_base_hash_from_type_name() {
        let ty = ty();
        assert_eq!(ty.base_hash(), mh3(b"test::Reading", 0));
        assert_eq!(ty.family(), TypeFamily::Cdr);
    }

    #[test]
    fn test_same_type_is_identity() {
        let a: Arc<dyn SerType> = ty();
        let b: Arc<dyn SerType> = ty();
        assert!(same_type(&a, &a.clone()));
        assert!(!same_type(&a, &b));
    }
}
