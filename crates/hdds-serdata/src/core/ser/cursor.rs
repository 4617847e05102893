// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte-order aware CDR cursors.
//!
//! [`CdrWriter`] appends to a growable buffer, [`CdrReader`] walks a borrowed
//! slice. Both align primitives to their natural size (max 8) relative to the
//! start of the payload, never to the start of the buffer.

use super::{align_up, ByteOrder, SerError, SerResult};
use crate::config::CHUNK_SIZE;

/// Generate write methods for primitive types.
///
/// Each generated method aligns, converts to the stream byte order and
/// appends.
macro_rules! impl_write {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self, value: $type) -> SerResult<()> {
            self.align($size);
            match self.order {
                ByteOrder::Big => self.put(&value.to_be_bytes()),
                ByteOrder::Little => self.put(&value.to_le_bytes()),
            }
            Ok(())
        }
    };
}

/// Generate read methods for primitive types.
///
/// Each generated method aligns, bounds-checks (`SerError::ReadFailed`) and
/// converts from the stream byte order.
macro_rules! impl_read {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> SerResult<$type> {
            self.align($size)?;
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(self.take($size)?);
            Ok(match self.order {
                ByteOrder::Big => <$type>::from_be_bytes(bytes),
                ByteOrder::Little => <$type>::from_le_bytes(bytes),
            })
        }
    };
}

/// Appending CDR writer.
///
/// Writes go to the end of `buffer`; alignment is computed from `base`, the
/// buffer offset at which the payload starts. Growth is rounded up to
/// [`CHUNK_SIZE`].
pub struct CdrWriter<'a> {
    buffer: &'a mut Vec<u8>,
    base: usize,
    order: ByteOrder,
}

impl<'a> CdrWriter<'a> {
    /// Start a payload at the current end of `buffer`.
    pub fn new(buffer: &'a mut Vec<u8>, order: ByteOrder) -> Self {
        let base = buffer.len();
        Self {
            buffer,
            base,
            order,
        }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Bytes written since the payload start.
    pub fn offset(&self) -> usize {
        self.buffer.len() - self.base
    }

    fn reserve(&mut self, n: usize) {
        let needed = self.buffer.len() + n;
        if needed > self.buffer.capacity() {
            let target = align_up(needed, CHUNK_SIZE);
            self.buffer.reserve_exact(target - self.buffer.len());
        }
    }

    fn put(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len());
        self.buffer.extend_from_slice(bytes);
    }

    /// Zero-fill up to the next multiple of `alignment` (capped at 8).
    pub fn align(&mut self, alignment: usize) {
        let alignment = alignment.min(8);
        if alignment <= 1 {
            return;
        }
        let pad = align_up(self.offset(), alignment) - self.offset();
        if pad > 0 {
            self.reserve(pad);
            self.buffer.resize(self.buffer.len() + pad, 0);
        }
    }

    pub fn write_u8(&mut self, value: u8) -> SerResult<()> {
        self.put(&[value]);
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> SerResult<()> {
        self.write_u8(u8::from(value))
    }

    impl_write!(write_u16, u16, 2);
    impl_write!(write_i16, i16, 2);
    impl_write!(write_u32, u32, 4);
    impl_write!(write_i32, i32, 4);
    impl_write!(write_u64, u64, 8);
    impl_write!(write_i64, i64, 8);

    pub fn write_f32(&mut self, value: f32) -> SerResult<()> {
        self.write_u32(value.to_bits())
    }

    pub fn write_f64(&mut self, value: f64) -> SerResult<()> {
        self.write_u64(value.to_bits())
    }

    /// Raw bytes, no alignment.
    pub fn write_bytes(&mut self, data: &[u8]) -> SerResult<()> {
        self.put(data);
        Ok(())
    }

    /// CDR string: u32 length (including NUL), bytes, NUL.
    pub fn write_string(&mut self, value: &str) -> SerResult<()> {
        let len = u32::try_from(value.len() + 1).map_err(|_| SerError::WriteFailed {
            offset: self.offset(),
            reason: "string too long".into(),
        })?;
        self.write_u32(len)?;
        self.put(value.as_bytes());
        self.put(&[0]);
        Ok(())
    }

    /// Sequence length prefix.
    pub fn write_seq_len(&mut self, len: usize) -> SerResult<()> {
        let len = u32::try_from(len).map_err(|_| SerError::WriteFailed {
            offset: self.offset(),
            reason: "sequence too long".into(),
        })?;
        self.write_u32(len)
    }

    /// Pad the payload to a 4-byte boundary; returns the padding length.
    pub fn finish_aligned4(&mut self) -> usize {
        let before = self.offset();
        self.align(4);
        self.offset() - before
    }
}

/// Bounds-checked CDR reader over a payload slice.
pub struct CdrReader<'a> {
    buffer: &'a [u8],
    offset: usize,
    order: ByteOrder,
}

impl<'a> CdrReader<'a> {
    pub fn new(buffer: &'a [u8], order: ByteOrder) -> Self {
        Self {
            buffer,
            offset: 0,
            order,
        }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    pub fn align(&mut self, alignment: usize) -> SerResult<()> {
        let alignment = alignment.min(8);
        if alignment <= 1 {
            return Ok(());
        }
        let aligned = align_up(self.offset, alignment);
        if aligned > self.buffer.len() {
            return Err(SerError::ReadFailed {
                offset: aligned,
                reason: "unexpected end of buffer".into(),
            });
        }
        self.offset = aligned;
        Ok(())
    }

    fn take(&mut self, len: usize) -> SerResult<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.buffer.len())
            .ok_or_else(|| SerError::ReadFailed {
                offset: self.offset,
                reason: "unexpected end of buffer".into(),
            })?;
        let slice = &self.buffer[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> SerResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_bool(&mut self) -> SerResult<bool> {
        let offset = self.offset;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(SerError::ReadFailed {
                offset,
                reason: format!("invalid boolean {}", other),
            }),
        }
    }

    impl_read!(read_u16, u16, 2);
    impl_read!(read_i16, i16, 2);
    impl_read!(read_u32, u32, 4);
    impl_read!(read_i32, i32, 4);
    impl_read!(read_u64, u64, 8);
    impl_read!(read_i64, i64, 8);

    pub fn read_f32(&mut self) -> SerResult<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f64(&mut self) -> SerResult<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    pub fn read_bytes(&mut self, len: usize) -> SerResult<&'a [u8]> {
        self.take(len)
    }

    /// CDR string; the terminating NUL must be present and the body UTF-8.
    pub fn read_string(&mut self) -> SerResult<String> {
        let len = self.read_u32()? as usize;
        let start = self.offset;
        if len == 0 {
            return Err(SerError::ReadFailed {
                offset: start,
                reason: "string without terminator".into(),
            });
        }
        let raw = self.take(len)?;
        let (body, nul) = raw.split_at(len - 1);
        if nul != [0] {
            return Err(SerError::ReadFailed {
                offset: start,
                reason: "string not NUL-terminated".into(),
            });
        }
        String::from_utf8(body.to_vec()).map_err(|_| SerError::ReadFailed {
            offset: start,
            reason: "string is not valid UTF-8".into(),
        })
    }

    /// Sequence length, rejected if it cannot fit in what remains.
    pub fn read_seq_len(&mut self, min_elem_size: usize) -> SerResult<usize> {
        let len = self.read_u32()? as usize;
        if len.saturating_mul(min_elem_size.max(1)) > self.remaining() {
            return Err(SerError::ReadFailed {
                offset: self.offset,
                reason: format!("sequence length {} exceeds buffer", len),
            });
        }
        Ok(len)
    }
}
