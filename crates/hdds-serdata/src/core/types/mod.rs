// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sample types and their type-erased descriptors.
//!
//! - [`DDS`]: implemented by application sample types (encode/decode, key).
//! - [`SerType`]: object-safe descriptor a datum carries; hides `T`.
//! - [`CdrType`]: the `SerType` for any `T: DDS` (plain CDR family).
//! - [`OpaqueType`]: a keyless `SerType` of a foreign family, payload kept as
//!   raw bytes (bridging/forwarding).

mod opaque;
mod sertype;

pub use opaque::OpaqueType;
pub use sertype::{same_type, CdrType, SerType, TypeFamily};

use crate::core::ser::{CdrReader, CdrWriter, SerError, SerResult};
use std::fmt;

/// What a datum carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleKind {
    /// Nothing but metadata.
    Empty,
    /// Key fields only (dispose/unregister by key, instance identity).
    Key,
    /// A complete sample.
    Data,
}

impl SampleKind {
    #[must_use]
    pub fn is_key(self) -> bool {
        self == SampleKind::Key
    }
}

/// Shape of a type's key, declared by the type author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyLayout {
    /// No key fields: every sample belongs to the single instance.
    NoKey,
    /// Key has a fixed size. Its big-endian encoding is the key hash when it
    /// fits in 16 bytes, and is digested with MD5 otherwise.
    Fixed,
    /// Key is variable-size or larger than 16 bytes (digested with MD5).
    Variable,
}

/// Encode/decode contract for application sample types.
///
/// `encode`/`decode` cover the whole sample; `encode_key`/`decode_key` only
/// the key fields, in declaration order. A cursor carries the byte order, so
/// implementations never deal with endianness themselves.
///
/// # Shared-memory loans
///
/// Types that can be loaned provide a fixed in-memory footprint
/// ([`DDS::loan_size`]) and copy themselves in and out of it. The footprint
/// is host-local and never goes on the wire.
///
/// # Example
///
/// ```
/// use hdds_serdata::core::ser::{CdrReader, CdrWriter, SerResult};
/// use hdds_serdata::{KeyLayout, DDS};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Temperature { sensor_id: u32, celsius: f32 }
///
/// impl DDS for Temperature {
///     const TYPE_NAME: &'static str = "sensors::Temperature";
///     const KEY_LAYOUT: KeyLayout = KeyLayout::Fixed;
///
///     fn encode(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
///         w.write_u32(self.sensor_id)?;
///         w.write_f32(self.celsius)
///     }
///     fn decode(r: &mut CdrReader<'_>) -> SerResult<Self> {
///         Ok(Self { sensor_id: r.read_u32()?, celsius: r.read_f32()? })
///     }
///     fn encode_key(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
///         w.write_u32(self.sensor_id)
///     }
///     fn decode_key(r: &mut CdrReader<'_>) -> SerResult<Self> {
///         Ok(Self { sensor_id: r.read_u32()?, celsius: 0.0 })
///     }
/// }
/// ```
pub trait DDS: Sized + Send + Sync + fmt::Debug + 'static {
    /// Registered type name.
    const TYPE_NAME: &'static str;

    /// Key shape; selects keyed or keyless handling once per type.
    const KEY_LAYOUT: KeyLayout = KeyLayout::NoKey;

    /// Encode the whole sample.
    fn encode(&self, w: &mut CdrWriter<'_>) -> SerResult<()>;

    /// Decode a whole sample.
    fn decode(r: &mut CdrReader<'_>) -> SerResult<Self>;

    /// Encode only the key fields.
    fn encode_key(&self, _w: &mut CdrWriter<'_>) -> SerResult<()> {
        Ok(())
    }

    /// Decode key fields; non-key fields take a neutral value.
    ///
    /// Keyless types have nothing to restore and keep the default error.
    fn decode_key(_r: &mut CdrReader<'_>) -> SerResult<Self> {
        Err(SerError::DecoderFailed {
            reason: format!("{} has no key fields to decode", Self::TYPE_NAME),
        })
    }

    /// In-memory footprint of a loaned sample, `None` if not loanable.
    fn loan_size() -> Option<usize> {
        None
    }

    /// Copy the sample into a loaned buffer of [`DDS::loan_size`] bytes.
    fn store_loan(&self, _buf: &mut [u8]) -> SerResult<()> {
        Err(SerError::EncoderFailed {
            reason: format!("{} cannot be loaned", Self::TYPE_NAME),
        })
    }

    /// Read a sample back from a loaned buffer.
    fn load_loan(_buf: &[u8]) -> SerResult<Self> {
        Err(SerError::DecoderFailed {
            reason: format!("{} cannot be loaned", Self::TYPE_NAME),
        })
    }
}
