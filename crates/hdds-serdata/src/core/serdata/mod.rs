// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reference-counted serialized datum.
//!
//! A [`Serdata`] is one sample (or just its key) in wire form, shared by every
//! party that touches it: the writer, the transmit queue, local readers and
//! the instance map. Cloning the handle takes a reference, dropping it gives
//! one back; the bytes return to the type's [`SerdataPool`] when the last
//! reference goes.
//!
//! # Storage
//!
//! | Storage  | Bytes                                  | Built by                   |
//! |----------|----------------------------------------|----------------------------|
//! | owned    | header + native CDR payload (+ pad)    | sample, wire, key hash     |
//! | shm      | loaned chunk holding the raw sample    | loan, received chunk       |
//!
//! Owned payloads are always native order after construction: bytes received
//! in the other byte order are validated and swapped in place.
//!
//! # Fields fixed at construction
//!
//! `kind`, `ser_type`, `hash` and `keyhash` never change. `timestamp` and
//! `statusinfo` are set by the writer before the datum is shared.

mod convert;
pub mod ops;
mod pool;

pub use convert::convert_for_writer;
pub use pool::{SerBuffer, SerdataPool};

use crate::config::MAX_SERDATA_SIZE;
use crate::core::keyhash::{KeyHash, KEYHASH_SIZE};
use crate::core::ser::{align_up, ByteOrder, CdrHeader, CdrReader, SerError, SerResult, HEADER_SIZE};
use crate::core::time::Timestamp;
use crate::core::types::{CdrType, KeyLayout, SampleKind, SerType, TypeFamily, DDS};
use crate::transport::shm::ShmChunk;
use std::borrow::Cow;
use std::fmt;
use std::ops::{Deref, Range};
use std::sync::Arc;

/// Dispose/unregister flags of a datum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StatusInfo(u32);

impl StatusInfo {
    pub const DISPOSE: StatusInfo = StatusInfo(0x1);
    pub const UNREGISTER: StatusInfo = StatusInfo(0x2);

    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & 0x3)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn contains(self, other: StatusInfo) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn union(self, other: StatusInfo) -> Self {
        Self(self.0 | other.0)
    }
}

/// One contiguous piece of a received datum covering `[min, min + bytes.len())`
/// of the wire image (header included).
#[derive(Debug, Clone, Copy)]
pub struct Fragment<'a> {
    pub min: usize,
    pub bytes: &'a [u8],
}

impl<'a> Fragment<'a> {
    #[must_use]
    pub fn new(min: usize, bytes: &'a [u8]) -> Self {
        Self { min, bytes }
    }
}

#[derive(Clone)]
pub(crate) enum Storage {
    Owned(Arc<SerBuffer>),
    Shm(Arc<ShmChunk>),
}

#[derive(Clone)]
struct SerdataInner {
    kind: SampleKind,
    ser_type: Option<Arc<dyn SerType>>,
    hash: u32,
    timestamp: Timestamp,
    statusinfo: StatusInfo,
    keyhash: KeyHash,
    storage: Storage,
}

/// Shared handle to a serialized datum.
#[derive(Clone)]
pub struct Serdata(Arc<SerdataInner>);

/// Datum under construction; its buffer goes back to the pool if dropped.
struct Pending {
    ty: Arc<dyn SerType>,
    kind: SampleKind,
    buf: SerBuffer,
    keyhash: KeyHash,
}

impl Pending {
    fn new(ty: Arc<dyn SerType>, kind: SampleKind, size_hint: usize) -> Self {
        let mut buf = ty.pool().acquire(size_hint);
        let header = CdrHeader::new(ByteOrder::native().identifier());
        buf.as_vec_mut().extend_from_slice(&header.to_bytes());
        Self {
            ty,
            kind,
            buf,
            keyhash: KeyHash::unset(),
        }
    }

    fn payload(&self) -> &[u8] {
        &self.buf[HEADER_SIZE..]
    }

    /// Pad the payload to 4 bytes and record the padding in the header.
    fn pad(&mut self) {
        let pad = pad_to_4(self.buf.as_vec_mut());
        set_header_padding(&mut self.buf, pad);
    }

    fn finish(self) -> Serdata {
        let hash = self
            .ty
            .key_ops()
            .fast_hash(&self.keyhash, self.ty.base_hash());
        Serdata(Arc::new(SerdataInner {
            kind: self.kind,
            ser_type: Some(self.ty),
            hash,
            timestamp: Timestamp::INVALID,
            statusinfo: StatusInfo::empty(),
            keyhash: self.keyhash,
            storage: Storage::Owned(Arc::new(self.buf)),
        }))
    }
}

fn pad_to_4(buf: &mut Vec<u8>) -> usize {
    let content = buf.len() - HEADER_SIZE;
    let pad = align_up(content, 4) - content;
    buf.resize(buf.len() + pad, 0);
    pad
}

fn set_header_padding(buf: &mut [u8], pad: usize) {
    let mut header = CdrHeader::from_bytes([buf[0], buf[1], buf[2], buf[3]]);
    header.set_padding(pad);
    buf[..HEADER_SIZE].copy_from_slice(&header.to_bytes());
}

impl Serdata {
    // ------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------

    /// Serialize `sample` for `kind` (`Key` encodes only the key fields).
    pub fn from_sample<T: DDS>(
        ty: &Arc<CdrType<T>>,
        kind: SampleKind,
        sample: &T,
    ) -> SerResult<Self> {
        let erased: Arc<dyn SerType> = Arc::clone(ty) as Arc<dyn SerType>;
        let mut pending = Pending::new(erased, kind, 0);
        ty.encode_sample(sample, kind, pending.buf.as_vec_mut())?;
        pending.pad();
        pending.keyhash = KeyHash::from_sample(sample)?;
        Ok(pending.finish())
    }

    /// Rebuild a datum from received fragments covering `size` bytes.
    ///
    /// Fragments are ordered by `min` and may overlap; a gap, a fragment
    /// reaching past `size` or a chain ending short of `size` is rejected.
    /// The first fragment must start at 0 and hold the whole header.
    pub fn from_ser(
        ty: &Arc<dyn SerType>,
        kind: SampleKind,
        fragments: &[Fragment<'_>],
        size: usize,
    ) -> SerResult<Self> {
        if size > MAX_SERDATA_SIZE {
            return Err(SerError::invalid(format!(
                "datum of {} bytes exceeds the {} byte limit",
                size, MAX_SERDATA_SIZE
            )));
        }
        match fragments.first() {
            Some(first) if first.min == 0 && first.bytes.len() >= HEADER_SIZE => {}
            _ => {
                return Err(SerError::invalid(
                    "first fragment must start at 0 and hold the header",
                ))
            }
        }

        let mut pending = Pending::new(Arc::clone(ty), kind, size);
        let buf = pending.buf.as_vec_mut();
        buf.clear();
        let mut off = 0usize;
        for frag in fragments {
            let maxp1 = frag.min.checked_add(frag.bytes.len()).ok_or_else(|| {
                SerError::invalid(format!("fragment at {} overflows the offset range", frag.min))
            })?;
            if frag.min > off {
                return Err(SerError::invalid(format!(
                    "fragment gap: next fragment starts at {}, have {}",
                    frag.min, off
                )));
            }
            if maxp1 > size {
                return Err(SerError::invalid(format!(
                    "fragment ends at {}, datum is {} bytes",
                    maxp1, size
                )));
            }
            if maxp1 > off {
                buf.extend_from_slice(&frag.bytes[off - frag.min..]);
                off = maxp1;
            }
        }
        if off != size {
            return Err(SerError::invalid(format!(
                "fragments cover {} of {} bytes",
                off, size
            )));
        }
        Self::finish_from_wire(pending)
    }

    /// Rebuild a datum from a gather list, concatenated in order.
    pub fn from_ser_iov(
        ty: &Arc<dyn SerType>,
        kind: SampleKind,
        iov: &[&[u8]],
        size: usize,
    ) -> SerResult<Self> {
        if iov.first().map_or(true, |first| first.len() < HEADER_SIZE) {
            return Err(SerError::invalid(
                "first gather element must hold the header",
            ));
        }
        let mut min = 0usize;
        let fragments: Vec<Fragment<'_>> = iov
            .iter()
            .map(|bytes| {
                let frag = Fragment::new(min, bytes);
                min += bytes.len();
                frag
            })
            .collect();
        Self::from_ser(ty, kind, &fragments, size)
    }

    /// Validate the wire image held by `pending`, normalize it to native
    /// order and derive the key.
    fn finish_from_wire(mut pending: Pending) -> SerResult<Self> {
        let raw = &pending.buf[..HEADER_SIZE];
        let header = CdrHeader::from_bytes([raw[0], raw[1], raw[2], raw[3]]);
        let order = ByteOrder::from_identifier(header.identifier).ok_or_else(|| {
            SerError::invalid(format!(
                "unknown encoding identifier {:#06x}",
                header.identifier
            ))
        })?;
        let content = pending.buf.len() - HEADER_SIZE;
        let pad = header.padding();
        if pad > content {
            return Err(SerError::invalid(format!(
                "padding {} exceeds content length {}",
                pad, content
            )));
        }

        let key_only = pending.kind.is_key();
        let ty = Arc::clone(&pending.ty);
        if pending.kind == SampleKind::Empty {
            pending.keyhash = KeyHash::unset();
        } else {
            let end = HEADER_SIZE + content - pad;
            let consumed = ty.normalize(&mut pending.buf[HEADER_SIZE..end], order, key_only)?;
            let payload = &pending.buf[HEADER_SIZE..HEADER_SIZE + consumed];
            pending.keyhash = ty.keyhash_of(payload, key_only)?;
        }

        let native = CdrHeader {
            identifier: ByteOrder::native().identifier(),
            options: header.options,
        };
        pending.buf[..HEADER_SIZE].copy_from_slice(&native.to_bytes());
        Ok(pending.finish())
    }

    /// Key-only datum from a key hash.
    ///
    /// Only possible when the hash holds the key itself: keyed types with a
    /// digested key are rejected. Keyless types yield an empty key datum.
    pub fn from_keyhash(ty: &Arc<dyn SerType>, keyhash: &[u8; KEYHASH_SIZE]) -> SerResult<Self> {
        ty.key_ops().from_keyhash(ty, keyhash)
    }

    pub(crate) fn keyless_key(ty: &Arc<dyn SerType>) -> Self {
        let mut pending = Pending::new(Arc::clone(ty), SampleKind::Key, 0);
        pending.keyhash = KeyHash::keyless();
        pending.finish()
    }

    pub(crate) fn fixed_key(ty: &Arc<dyn SerType>, keyhash: &[u8; KEYHASH_SIZE]) -> SerResult<Self> {
        if ty.key_layout() != KeyLayout::Fixed {
            return Err(SerError::invalid(format!(
                "{}: key hash is a digest, the key cannot be recovered",
                ty.type_name()
            )));
        }
        let mut pending = Pending::new(Arc::clone(ty), SampleKind::Key, KEYHASH_SIZE);
        pending.buf.as_vec_mut().extend_from_slice(keyhash);
        ty.normalize(&mut pending.buf[HEADER_SIZE..], ByteOrder::Big, true)?;
        // a fixed key too wide for 16 bytes travels as a digest
        let derived = ty.keyhash_of(pending.payload(), true)?;
        if derived != KeyHash::literal(*keyhash) {
            return Err(SerError::invalid(format!(
                "{}: key hash does not hold a literal key",
                ty.type_name()
            )));
        }
        pending.keyhash = derived;
        Ok(pending.finish())
    }

    /// Publish-side datum backed by a loaned shared-memory chunk.
    ///
    /// The key is computed from the sample stored in the chunk. On failure
    /// the chunk is dropped, which hands it back to its segment.
    pub fn from_loan(ty: &Arc<dyn SerType>, kind: SampleKind, chunk: ShmChunk) -> SerResult<Self> {
        let keyhash = ty.keyhash_of_loan(chunk.payload())?;
        Ok(Self::from_chunk(ty, kind, keyhash, Arc::new(chunk)))
    }

    /// Receive-side datum backed by a chunk delivered by a segment.
    ///
    /// Kind, timestamp and status come from the chunk header; the key hash is
    /// copied from it and treated as a digest.
    pub fn from_received_chunk(ty: &Arc<dyn SerType>, chunk: Arc<ShmChunk>) -> SerResult<Self> {
        let header = chunk.header();
        let kind = header.kind;
        let keyhash = KeyHash::digest(header.keyhash);
        let (timestamp, statusinfo) = (header.timestamp, header.statusinfo);
        let mut d = Self::from_chunk(ty, kind, keyhash, chunk);
        d.set_timestamp(timestamp);
        d.set_statusinfo(statusinfo);
        Ok(d)
    }

    fn from_chunk(
        ty: &Arc<dyn SerType>,
        kind: SampleKind,
        keyhash: KeyHash,
        chunk: Arc<ShmChunk>,
    ) -> Self {
        let hash = ty.key_ops().fast_hash(&keyhash, ty.base_hash());
        Serdata(Arc::new(SerdataInner {
            kind,
            ser_type: Some(Arc::clone(ty)),
            hash,
            timestamp: Timestamp::INVALID,
            statusinfo: StatusInfo::empty(),
            keyhash,
            storage: Storage::Shm(chunk),
        }))
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn kind(&self) -> SampleKind {
        self.0.kind
    }

    /// Type of the datum, `None` for an untyped key projection.
    pub fn ser_type(&self) -> Option<&Arc<dyn SerType>> {
        self.0.ser_type.as_ref()
    }

    pub fn is_untyped(&self) -> bool {
        self.0.ser_type.is_none()
    }

    /// Hash-table placement of the datum's instance.
    pub fn hash(&self) -> u32 {
        self.0.hash
    }

    pub fn timestamp(&self) -> Timestamp {
        self.0.timestamp
    }

    pub fn statusinfo(&self) -> StatusInfo {
        self.0.statusinfo
    }

    pub fn keyhash(&self) -> &KeyHash {
        &self.0.keyhash
    }

    /// Number of live handles to this datum.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Loaned chunk backing the datum, if any.
    pub fn shm_chunk(&self) -> Option<&Arc<ShmChunk>> {
        match &self.0.storage {
            Storage::Shm(chunk) => Some(chunk),
            Storage::Owned(_) => None,
        }
    }

    /// Set the source timestamp; copies the metadata if the datum is shared.
    pub fn set_timestamp(&mut self, timestamp: Timestamp) {
        Arc::make_mut(&mut self.0).timestamp = timestamp;
    }

    /// Set dispose/unregister flags; copies the metadata if shared.
    pub fn set_statusinfo(&mut self, statusinfo: StatusInfo) {
        Arc::make_mut(&mut self.0).statusinfo = statusinfo;
    }

    /// Take back the loaned chunk of a datum nobody else holds.
    pub(crate) fn into_loan_chunk(self) -> Result<ShmChunk, Serdata> {
        let inner = Arc::try_unwrap(self.0).map_err(Serdata)?;
        match inner.storage {
            Storage::Shm(chunk) => match Arc::try_unwrap(chunk) {
                Ok(chunk) => Ok(chunk),
                Err(shared) => Err(Serdata(Arc::new(SerdataInner {
                    storage: Storage::Shm(shared),
                    ..inner
                }))),
            },
            Storage::Owned(buf) => Err(Serdata(Arc::new(SerdataInner {
                storage: Storage::Owned(buf),
                ..inner
            }))),
        }
    }

    // ------------------------------------------------------------------
    // Projections
    // ------------------------------------------------------------------

    /// Native payload without the header.
    pub(crate) fn payload(&self) -> SerResult<Cow<'_, [u8]>> {
        match &self.0.storage {
            Storage::Owned(buf) => Ok(Cow::Borrowed(&buf[HEADER_SIZE..])),
            Storage::Shm(chunk) => {
                let ty = self.typed()?;
                let mut out = Vec::new();
                ty.encode_loan(chunk.payload(), self.kind().is_key(), &mut out)?;
                Ok(Cow::Owned(out))
            }
        }
    }

    /// Wire image: header followed by the payload.
    pub fn wire_image(&self) -> SerResult<Cow<'_, [u8]>> {
        match &self.0.storage {
            Storage::Owned(buf) => Ok(Cow::Borrowed(&buf[..])),
            Storage::Shm(chunk) => {
                let ty = self.typed()?;
                let mut out = Vec::with_capacity(HEADER_SIZE + chunk.payload().len());
                out.extend_from_slice(
                    &CdrHeader::new(ByteOrder::native().identifier()).to_bytes(),
                );
                ty.encode_loan(chunk.payload(), self.kind().is_key(), &mut out)?;
                let pad = pad_to_4(&mut out);
                set_header_padding(&mut out, pad);
                Ok(Cow::Owned(out))
            }
        }
    }

    /// Size of the wire image (payload + header).
    ///
    /// Chunk-backed datums are encoded to learn their size, which fails if
    /// the loaned sample cannot be encoded.
    pub fn size(&self) -> SerResult<usize> {
        match &self.0.storage {
            Storage::Owned(buf) => Ok(buf.len()),
            Storage::Shm(_) => Ok(self.wire_image()?.len()),
        }
    }

    fn typed(&self) -> SerResult<&Arc<dyn SerType>> {
        self.ser_type()
            .ok_or_else(|| SerError::invalid("untyped datum has no sample representation"))
    }

    fn window(off: usize, len: usize, size: usize) -> SerResult<()> {
        if off > size || len > align_up(size, 4) - off {
            return Err(SerError::invalid(format!(
                "window [{}, {}) outside datum of {} bytes",
                off,
                off + len,
                size
            )));
        }
        Ok(())
    }

    /// Copy `out.len()` bytes of the wire image starting at `off`.
    ///
    /// The window may extend into the padding up to the next 4-byte
    /// boundary, which reads as zeros.
    pub fn to_ser(&self, off: usize, out: &mut [u8]) -> SerResult<()> {
        let image = self.wire_image()?;
        Self::window(off, out.len(), image.len())?;
        let avail = (image.len() - off).min(out.len());
        out[..avail].copy_from_slice(&image[off..off + avail]);
        out[avail..].fill(0);
        Ok(())
    }

    /// Borrow `len` bytes of the wire image starting at `off`.
    ///
    /// The slice keeps the datum alive until dropped.
    pub fn to_ser_ref(&self, off: usize, len: usize) -> SerResult<SerdataSlice> {
        let size = self.size()?;
        Self::window(off, len, size)?;
        let window = match &self.0.storage {
            Storage::Owned(_) if off + len <= size => SliceWindow::Borrowed(off..off + len),
            _ => {
                let mut bytes = vec![0u8; len];
                self.to_ser(off, &mut bytes)?;
                SliceWindow::Copied(bytes)
            }
        };
        Ok(SerdataSlice {
            datum: self.clone(),
            window,
        })
    }

    /// Decode the sample held by the datum.
    ///
    /// Key datums yield a sample whose non-key fields take neutral values.
    pub fn to_sample<T: DDS>(&self) -> SerResult<T> {
        let ty = self.typed()?;
        if ty.type_name() != T::TYPE_NAME {
            return Err(SerError::invalid(format!(
                "datum of type {} read as {}",
                ty.type_name(),
                T::TYPE_NAME
            )));
        }
        if let Storage::Shm(chunk) = &self.0.storage {
            return T::load_loan(chunk.payload());
        }
        let payload = self.payload()?;
        let mut r = CdrReader::new(&payload, ByteOrder::native());
        match self.kind() {
            SampleKind::Data => T::decode(&mut r),
            SampleKind::Key => T::decode_key(&mut r),
            SampleKind::Empty => Err(SerError::invalid("empty datum carries no sample")),
        }
    }

    /// Restore the key fields of `sample` from an untyped key datum.
    ///
    /// Keyless types have no key; `sample` is left untouched.
    pub fn untyped_to_sample<T: DDS>(&self, sample: &mut T) -> SerResult<()> {
        if T::KEY_LAYOUT == KeyLayout::NoKey {
            return Ok(());
        }
        let payload = self.payload()?;
        let mut r = CdrReader::new(&payload, ByteOrder::native());
        *sample = T::decode_key(&mut r)?;
        Ok(())
    }

    /// Type-erased key projection, used as instance identity.
    ///
    /// The result is a key datum without type or timestamp that keeps the
    /// hash and key descriptor of `self`.
    pub fn to_untyped(&self) -> SerResult<Serdata> {
        let Some(ty) = self.ser_type() else {
            return Ok(self.clone());
        };
        let key: Vec<u8> = if ty.family() != TypeFamily::Cdr || self.kind() == SampleKind::Empty {
            Vec::new()
        } else if self.kind().is_key() {
            self.payload()?.into_owned()
        } else if self.0.keyhash.is_literal && ty.key_layout() == KeyLayout::Fixed {
            let mut key = self.0.keyhash.value.to_vec();
            ty.normalize(&mut key, ByteOrder::Big, true)?;
            key
        } else {
            ty.key_of(&self.payload()?, false)?
        };

        let mut buf = ty.pool().acquire(HEADER_SIZE + key.len());
        let bytes = buf.as_vec_mut();
        bytes.extend_from_slice(&CdrHeader::new(ByteOrder::native().identifier()).to_bytes());
        bytes.extend_from_slice(&key);
        let pad = pad_to_4(bytes);
        set_header_padding(&mut buf, pad);

        Ok(Serdata(Arc::new(SerdataInner {
            kind: SampleKind::Key,
            ser_type: None,
            hash: self.0.hash,
            timestamp: Timestamp::INVALID,
            statusinfo: StatusInfo::empty(),
            keyhash: self.0.keyhash,
            storage: Storage::Owned(Arc::new(buf)),
        })))
    }

    /// Same instance key as `other`.
    pub fn eq_key(&self, other: &Serdata) -> bool {
        match self.ser_type() {
            Some(ty) => ty.key_ops().eq_key(self, other),
            None => self.0.keyhash.value == other.0.keyhash.value,
        }
    }

    /// Key hash as sent on the wire; see [`KeyHash::get`].
    pub fn get_keyhash(&self, force_md5: bool) -> [u8; KEYHASH_SIZE] {
        self.0.keyhash.get(force_md5)
    }

    /// Human-readable rendering of the sample.
    pub fn print(&self) -> SerResult<String> {
        if self.kind() == SampleKind::Empty {
            return Ok("(empty)".to_string());
        }
        match self.ser_type() {
            Some(ty) => ty.render(&self.payload()?, self.kind().is_key()),
            None => {
                let payload = self.payload()?;
                Ok(payload.iter().map(|b| format!("{:02x}", b)).collect())
            }
        }
    }
}

impl fmt::Display for Serdata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.print() {
            Ok(text) => f.write_str(&text),
            Err(e) => write!(f, "<unprintable: {}>", e),
        }
    }
}

impl fmt::Debug for Serdata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Serdata")
            .field("type", &self.ser_type().map(|t| t.type_name()))
            .field("kind", &self.0.kind)
            .field("hash", &format_args!("{:#010x}", self.0.hash))
            .field("keyhash", &self.0.keyhash)
            .field("statusinfo", &self.0.statusinfo)
            .field("timestamp", &self.0.timestamp)
            .field("shm", &matches!(self.0.storage, Storage::Shm(_)))
            .finish()
    }
}

enum SliceWindow {
    Borrowed(Range<usize>),
    Copied(Vec<u8>),
}

/// Window into a datum's wire image; holds a reference to the datum.
pub struct SerdataSlice {
    datum: Serdata,
    window: SliceWindow,
}

impl SerdataSlice {
    pub fn datum(&self) -> &Serdata {
        &self.datum
    }
}

impl Deref for SerdataSlice {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match (&self.window, &self.datum.0.storage) {
            (SliceWindow::Borrowed(range), Storage::Owned(buf)) => &buf[range.clone()],
            (SliceWindow::Copied(bytes), _) => bytes,
            (SliceWindow::Borrowed(_), Storage::Shm(_)) => &[],
        }
    }
}
