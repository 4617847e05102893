// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Instance key descriptors (16-byte key hashes).
//!
//! # Rules
//!
//! | Key layout | Stored value                         | Literal | Size |
//! |------------|--------------------------------------|---------|------|
//! | no key     | zeros                                | yes     | 0    |
//! | fixed      | big-endian key encoding, zero padded | yes     | 16   |
//! | variable   | MD5 of the big-endian key encoding   | no      | 16   |
//!
//! A fixed key whose encoding does not fit in 16 bytes is digested like a
//! variable one.
//!
//! A literal descriptor can still be turned into a digest on demand
//! ([`KeyHash::get`] with `force_md5`).

use crate::core::hash::{md5_digest, mh3};
use crate::core::ser::{ByteOrder, CdrWriter, SerResult};
use crate::core::types::{KeyLayout, DDS};
use std::fmt;

/// Length of a key hash.
pub const KEYHASH_SIZE: usize = 16;

/// Key descriptor carried by every datum.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyHash {
    /// Literal key bytes or digest.
    pub value: [u8; KEYHASH_SIZE],
    /// `value` holds the key itself rather than its digest.
    pub is_literal: bool,
    /// Meaningful bytes of a literal `value`.
    pub size: u32,
    /// Descriptor has been computed.
    pub set: bool,
}

impl KeyHash {
    /// Not computed yet.
    #[must_use]
    pub const fn unset() -> Self {
        Self {
            value: [0; KEYHASH_SIZE],
            is_literal: false,
            size: 0,
            set: false,
        }
    }

    /// Descriptor of a keyless type.
    #[must_use]
    pub const fn keyless() -> Self {
        Self {
            value: [0; KEYHASH_SIZE],
            is_literal: true,
            size: 0,
            set: true,
        }
    }

    /// Fixed-size key, `value` holds the big-endian key bytes.
    #[must_use]
    pub const fn literal(value: [u8; KEYHASH_SIZE]) -> Self {
        Self {
            value,
            is_literal: true,
            size: KEYHASH_SIZE as u32,
            set: true,
        }
    }

    /// Digested key.
    #[must_use]
    pub const fn digest(value: [u8; KEYHASH_SIZE]) -> Self {
        Self {
            value,
            is_literal: false,
            size: KEYHASH_SIZE as u32,
            set: true,
        }
    }

    /// Compute the descriptor of `sample` from its key fields.
    pub fn from_sample<T: DDS>(sample: &T) -> SerResult<Self> {
        match T::KEY_LAYOUT {
            KeyLayout::NoKey => Ok(Self::keyless()),
            KeyLayout::Fixed => {
                let key = encode_key_be(sample)?;
                if key.len() > KEYHASH_SIZE {
                    return Ok(Self::digest(md5_digest(&key)));
                }
                let mut value = [0u8; KEYHASH_SIZE];
                value[..key.len()].copy_from_slice(&key);
                Ok(Self::literal(value))
            }
            KeyLayout::Variable => {
                let key = encode_key_be(sample)?;
                Ok(Self::digest(md5_digest(&key)))
            }
        }
    }

    /// Key hash as sent on the wire.
    ///
    /// With `force_md5`, a literal descriptor is digested over its meaningful
    /// bytes; a digest is returned unchanged.
    #[must_use]
    pub fn get(&self, force_md5: bool) -> [u8; KEYHASH_SIZE] {
        if force_md5 && self.is_literal {
            md5_digest(&self.value[..self.size as usize])
        } else {
            self.value
        }
    }

    /// Hash-table placement for keyed types, mixed with the type's base hash.
    #[must_use]
    pub fn fast_hash(&self, base_hash: u32) -> u32 {
        if self.is_literal {
            mh3(&self.value, 0) ^ base_hash
        } else {
            let head = [self.value[0], self.value[1], self.value[2], self.value[3]];
            u32::from_ne_bytes(head) ^ base_hash
        }
    }
}

impl Default for KeyHash {
    fn default() -> Self {
        Self::unset()
    }
}

impl fmt::Debug for KeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyHash(")?;
        for b in &self.value {
            write!(f, "{:02x}", b)?;
        }
        write!(
            f,
            ", {}, size={})",
            if self.is_literal { "literal" } else { "md5" },
            self.size
        )
    }
}

fn encode_key_be<T: DDS>(sample: &T) -> SerResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(KEYHASH_SIZE);
    let mut w = CdrWriter::new(&mut buf, ByteOrder::Big);
    sample.encode_key(&mut w)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ser::CdrReader;

    #[derive(Debug)]
    struct Fixed(u32, u16);

    impl DDS for Fixed {
        const TYPE_NAME: &'static str = "test::Fixed";
        const KEY_LAYOUT: KeyLayout = KeyLayout::Fixed;
        fn encode(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
            w.write_u32(self.0)?;
            w.write_u16(self.1)
        }
        fn decode(r: &mut CdrReader<'_>) -> SerResult<Self> {
            Ok(Self(r.read_u32()?, r.read_u16()?))
        }
        fn encode_key(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
            w.write_u32(self.0)
        }
    }

    #[derive(Debug)]
    struct Named(String);

    impl DDS for Named {
        const TYPE_NAME: &'static str = "test::Named";
        const KEY_LAYOUT: KeyLayout = KeyLayout::Variable;
        fn encode(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
            w.write_string(&self.0)
        }
        fn decode(r: &mut CdrReader<'_>) -> SerResult<Self> {
            Ok(Self(r.read_string()?))
        }
        fn encode_key(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
            w.write_string(&self.0)
        }
    }

    #[derive(Debug)]
    struct Wide([u64; 3]);

    impl DDS for Wide {
        const TYPE_NAME: &'static str = "test::Wide";
        const KEY_LAYOUT: KeyLayout = KeyLayout::Fixed;
        fn encode(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
            self.encode_key(w)
        }
        fn decode(r: &mut CdrReader<'_>) -> SerResult<Self> {
            Ok(Self([r.read_u64()?, r.read_u64()?, r.read_u64()?]))
        }
        fn encode_key(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
            self.0.iter().try_for_each(|v| w.write_u64(*v))
        }
    }

    #[test]
    fn test_fixed_key_is_big_endian_literal() {
        let kh = KeyHash::from_sample(&Fixed(0x0102_0304, 9)).expect("keyhash");
        assert!(kh.is_literal && kh.set);
        assert_eq!(kh.size, 16);
        assert_eq!(&kh.value[..4], &[1, 2, 3, 4]);
        assert!(kh.value[4..].iter().all(|b| *b == 0));
        // non-key fields do not participate
        assert_eq!(kh, KeyHash::from_sample(&Fixed(0x0102_0304, 77)).expect("keyhash"));
    }

    #[test]
    fn test_variable_key_is_md5_of_be_encoding() {
        let kh = KeyHash::from_sample(&Named("abc".into())).expect("keyhash");
        let mut be = Vec::new();
        CdrWriter::new(&mut be, ByteOrder::Big)
            .write_string("abc")
            .expect("string");
        assert!(!kh.is_literal);
        assert_eq!(kh.value, md5_digest(&be));
        assert_eq!(kh.get(true), kh.value);
    }

    #[test]
    fn test_oversized_fixed_key_is_digested() {
        let kh = KeyHash::from_sample(&Wide([1, 2, 3])).expect("keyhash");
        let mut be = Vec::new();
        let mut w = CdrWriter::new(&mut be, ByteOrder::Big);
        [1u64, 2, 3].iter().try_for_each(|v| w.write_u64(*v)).expect("key");
        assert_eq!(be.len(), 24);
        assert!(!kh.is_literal);
        assert_eq!(kh.value, md5_digest(&be));
        assert_eq!(kh.get(true), kh.value);
    }

    #[test]
    fn test_force_md5_digests_literal() {
        let kh = KeyHash::from_sample(&Fixed(5, 0)).expect("keyhash");
        assert_eq!(kh.get(false), kh.value);
        assert_eq!(kh.get(true), md5_digest(&kh.value));
        assert_eq!(KeyHash::keyless().get(true), md5_digest(&[]));
    }

    #[test]
    fn test_fast_hash_mixes_base() {
        let kh = KeyHash::from_sample(&Fixed(5, 0)).expect("keyhash");
        assert_eq!(kh.fast_hash(0) ^ 0xdead_beef, kh.fast_hash(0xdead_beef));
        let digest = KeyHash::digest([1, 0, 0, 0, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9]);
        assert_eq!(digest.fast_hash(0), u32::from_ne_bytes([1, 0, 0, 0]));
    }
}
