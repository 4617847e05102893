// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CDR serialization helpers for the serialized datum wire form.
//!
//! The wire form of a datum is a 4-byte encapsulation header followed by the
//! type-encoded payload, padded to a 4-byte boundary:
//!
//! ```text
//! 0       2       4
//! +-------+-------+---------------------------+-----+
//! | ident | opts  | payload (CDR, ident order) | pad |
//! +-------+-------+---------------------------+-----+
//! ```
//!
//! Both header fields are big-endian on the wire. Bit 1 of `opts` marks two
//! trailing padding bytes; bit 0 carries no padding information.

pub mod cursor;

pub use cursor::{CdrReader, CdrWriter};

use std::fmt;

/// Size of the encapsulation header.
pub const HEADER_SIZE: usize = 4;

/// Plain CDR, big-endian.
pub const CDR_BE: u16 = 0x0000;
/// Plain CDR, little-endian.
pub const CDR_LE: u16 = 0x0001;
/// Parameter-list CDR, big-endian.
pub const PL_CDR_BE: u16 = 0x0002;
/// Parameter-list CDR, little-endian.
pub const PL_CDR_LE: u16 = 0x0003;

/// Option bit announcing two trailing padding bytes.
pub const OPTIONS_PADDING_MASK: u16 = 0x0002;

/// Byte order of a CDR stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    Big,
    Little,
}

impl ByteOrder {
    /// Byte order of the running host.
    #[must_use]
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        }
    }

    /// Plain CDR encoding identifier for this byte order.
    #[must_use]
    pub const fn identifier(self) -> u16 {
        match self {
            ByteOrder::Big => CDR_BE,
            ByteOrder::Little => CDR_LE,
        }
    }

    /// Byte order announced by an encoding identifier, `None` if unknown.
    #[must_use]
    pub const fn from_identifier(identifier: u16) -> Option<Self> {
        match identifier {
            CDR_BE | PL_CDR_BE => Some(ByteOrder::Big),
            CDR_LE | PL_CDR_LE => Some(ByteOrder::Little),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_native(self) -> bool {
        self == Self::native()
    }
}

/// Encapsulation header of a serialized datum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CdrHeader {
    pub identifier: u16,
    pub options: u16,
}

impl CdrHeader {
    #[must_use]
    pub const fn new(identifier: u16) -> Self {
        Self {
            identifier,
            options: 0,
        }
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; HEADER_SIZE]) -> Self {
        Self {
            identifier: u16::from_be_bytes([bytes[0], bytes[1]]),
            options: u16::from_be_bytes([bytes[2], bytes[3]]),
        }
    }

    #[must_use]
    pub fn to_bytes(self) -> [u8; HEADER_SIZE] {
        let id = self.identifier.to_be_bytes();
        let opts = self.options.to_be_bytes();
        [id[0], id[1], opts[0], opts[1]]
    }

    /// Number of trailing padding bytes announced by the options.
    #[must_use]
    pub fn padding(self) -> usize {
        usize::from(self.options & OPTIONS_PADDING_MASK)
    }

    /// Record `pad` trailing padding bytes (0..=3).
    ///
    /// Only a two-byte pad can be announced: 2 and 3 set the padding bit,
    /// 0 and 1 clear it. Unannounced padding reads as trailing content.
    pub fn set_padding(&mut self, pad: usize) {
        debug_assert!(pad <= 3, "CDR padding is at most 3 bytes");
        self.options &= !OPTIONS_PADDING_MASK;
        if pad >= 2 {
            self.options |= OPTIONS_PADDING_MASK;
        }
    }
}

/// Round `x` up to the next multiple of `a` (power of two).
#[inline]
#[must_use]
pub const fn align_up(x: usize, a: usize) -> usize {
    debug_assert!(a.is_power_of_two());
    (x + a - 1) & !(a - 1)
}

/// Serialization error used within core::ser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerError {
    EncoderFailed { reason: String },
    DecoderFailed { reason: String },
    WriteFailed { offset: usize, reason: String },
    ReadFailed { offset: usize, reason: String },
    InvalidData { reason: String },
}

impl fmt::Display for SerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerError::EncoderFailed { reason } => write!(f, "encoder failed: {}", reason),
            SerError::DecoderFailed { reason } => write!(f, "decoder failed: {}", reason),
            SerError::WriteFailed { offset, reason } => {
                write!(f, "write failed at offset {}: {}", offset, reason)
            }
            SerError::ReadFailed { offset, reason } => {
                write!(f, "read failed at offset {}: {}", offset, reason)
            }
            SerError::InvalidData { reason } => write!(f, "invalid data: {}", reason),
        }
    }
}

impl std::error::Error for SerError {}

impl SerError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        SerError::InvalidData {
            reason: reason.into(),
        }
    }
}

pub type SerResult<T> = core::result::Result<T, SerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ser_error_display_variants() {
        let err = SerError::WriteFailed {
            offset: 12,
            reason: "buffer too small".into(),
        };
        assert_eq!(err.to_string(), "write failed at offset 12: buffer too small");

        let err = SerError::ReadFailed {
            offset: 4,
            reason: "unexpected end of buffer".into(),
        };
        assert_eq!(err.to_string(), "read failed at offset 4: unexpected end of buffer");

        let err = SerError::invalid("bad payload");
        assert_eq!(err.to_string(), "invalid data: bad payload");
    }

    #[test]
    fn test_header_wire_layout() {
        let mut hdr = CdrHeader::new(CDR_LE);
        hdr.set_padding(2);
        assert_eq!(hdr.to_bytes(), [0x00, 0x01, 0x00, 0x02]);
        let back = CdrHeader::from_bytes(hdr.to_bytes());
        assert_eq!(back, hdr);
        assert_eq!(back.padding(), 2);
    }

    #[test]
    fn test_header_padding_bit() {
        for (options, pad) in [(0x0000, 0), (0x0001, 0), (0x0002, 2), (0x0003, 2)] {
            let hdr = CdrHeader::from_bytes([0x00, 0x01, 0x00, options]);
            assert_eq!(hdr.padding(), pad, "options {:#06x}", options);
        }

        let mut hdr = CdrHeader::new(CDR_BE);
        for (pad, options) in [(0, 0x0000), (1, 0x0000), (2, 0x0002), (3, 0x0002)] {
            hdr.set_padding(pad);
            assert_eq!(hdr.options, options, "pad {}", pad);
        }
    }

    #[test]
    fn test_identifier_byte_order() {
        assert_eq!(ByteOrder::from_identifier(CDR_BE), Some(ByteOrder::Big));
        assert_eq!(ByteOrder::from_identifier(PL_CDR_LE), Some(ByteOrder::Little));
        assert_eq!(ByteOrder::from_identifier(0x0042), None);
        assert_eq!(
            ByteOrder::from_identifier(ByteOrder::native().identifier()),
            Some(ByteOrder::native())
        );
    }

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 4), 0);
        assert_eq!(align_up(5, 4), 8);
        assert_eq!(align_up(129, 128), 256);
    }
}
