// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared-memory chunks for zero-copy delivery between co-located endpoints.
//!
//! # Architecture
//!
//! ```text
//! +------------------+                 +------------------+
//! |     Writer       |    segment      |    Subscriber    |
//! |  try_loan() -----+--> free slots   |                  |
//! |  fill payload    |                 |                  |
//! |  publish() ------+--> Arc<chunk> --+-> from_received  |
//! +------------------+                 +------------------+
//!            ^                                   |
//!            +------ chunk dropped: slot freed --+
//! ```
//!
//! A [`ShmChunk`] owns one slot of its segment. Whoever drops the last handle
//! to it (writer on a cancelled loan, subscriber after reading) gives the
//! slot back, so a chunk is released exactly once.

mod metrics;
mod segment;

pub use metrics::{ShmMetrics, ShmMetricsSnapshot};
pub use segment::{ShmSegment, ShmSubscription};

use crate::core::guid::GUID;
use crate::core::keyhash::KEYHASH_SIZE;
use crate::core::serdata::StatusInfo;
use crate::core::time::Timestamp;
use crate::core::types::SampleKind;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Default number of chunks in a segment.
pub const DEFAULT_CHUNK_COUNT: usize = 64;

/// Default chunk payload size (4KB - fits most DDS samples)
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Errors of shared-memory operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShmError {
    /// Requested payload does not fit in a chunk
    PayloadTooLarge { size: usize, capacity: usize },

    /// All chunks are loaned or in flight
    Exhausted,

    /// Invalid segment geometry
    InvalidCapacity(usize),

    /// Chunk does not belong to this segment
    ForeignChunk,
}

impl fmt::Display for ShmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PayloadTooLarge { size, capacity } => {
                write!(
                    f,
                    "Payload too large: {size} bytes exceeds chunk capacity {capacity}"
                )
            }
            Self::Exhausted => write!(f, "No free shared-memory chunk"),
            Self::InvalidCapacity(cap) => write!(f, "Invalid segment capacity: {cap}"),
            Self::ForeignChunk => write!(f, "Chunk belongs to another segment"),
        }
    }
}

impl std::error::Error for ShmError {}

/// Result type for SHM operations
pub type Result<T> = std::result::Result<T, ShmError>;

/// Identity of one loan; never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(u64);

impl ChunkId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Metadata published along with a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub writer: GUID,
    pub timestamp: Timestamp,
    pub statusinfo: StatusInfo,
    pub kind: SampleKind,
    pub keyhash: [u8; KEYHASH_SIZE],
    /// Meaningful bytes of the payload.
    pub data_size: usize,
}

impl Default for ChunkHeader {
    fn default() -> Self {
        Self {
            writer: GUID::zero(),
            timestamp: Timestamp::INVALID,
            statusinfo: StatusInfo::empty(),
            kind: SampleKind::Data,
            keyhash: [0; KEYHASH_SIZE],
            data_size: 0,
        }
    }
}

/// Owner of the slots chunks are carved from.
pub(crate) trait ChunkOrigin: Send + Sync {
    fn reclaim(&self, slot: usize, payload: Box<[u8]>);

    fn segment_id(&self) -> u64;
}

/// One loaned shared-memory slot.
pub struct ShmChunk {
    id: ChunkId,
    slot: usize,
    header: ChunkHeader,
    payload: Option<Box<[u8]>>,
    origin: Weak<dyn ChunkOrigin>,
}

impl ShmChunk {
    pub(crate) fn new(slot: usize, payload: Box<[u8]>, data_size: usize, origin: Weak<dyn ChunkOrigin>) -> Self {
        Self {
            id: ChunkId::next(),
            slot,
            header: ChunkHeader {
                data_size,
                ..ChunkHeader::default()
            },
            payload: Some(payload),
            origin,
        }
    }

    pub fn id(&self) -> ChunkId {
        self.id
    }

    pub fn header(&self) -> &ChunkHeader {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut ChunkHeader {
        &mut self.header
    }

    /// Meaningful payload bytes (`header().data_size`).
    pub fn payload(&self) -> &[u8] {
        match &self.payload {
            Some(p) => &p[..self.header.data_size.min(p.len())],
            None => &[],
        }
    }

    pub fn payload_mut(&mut self) -> &mut [u8] {
        let size = self.header.data_size;
        match &mut self.payload {
            Some(p) => {
                let end = size.min(p.len());
                &mut p[..end]
            }
            None => &mut [],
        }
    }

    /// Slot capacity.
    pub fn capacity(&self) -> usize {
        self.payload.as_ref().map_or(0, |p| p.len())
    }

    pub(crate) fn segment_id(&self) -> Option<u64> {
        self.origin.upgrade().map(|o| o.segment_id())
    }
}

impl Drop for ShmChunk {
    fn drop(&mut self) {
        if let (Some(payload), Some(origin)) = (self.payload.take(), self.origin.upgrade()) {
            origin.reclaim(self.slot, payload);
        }
    }
}

impl fmt::Debug for ShmChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShmChunk")
            .field("id", &self.id)
            .field("slot", &self.slot)
            .field("data_size", &self.header.data_size)
            .finish()
    }
}

/// Writer side of a shared-memory transport.
pub trait ShmPublisher: Send + Sync {
    /// Take a free chunk with `size` payload bytes, without blocking.
    fn try_loan(&self, size: usize) -> Result<ShmChunk>;

    /// Hand a filled chunk to every subscriber.
    fn publish(&self, chunk: ShmChunk) -> Result<()>;

    /// Give back a chunk that will not be published.
    fn release(&self, chunk: ShmChunk) {
        drop(chunk);
    }
}

/// Shared handle to a publisher.
pub type ShmPublisherRef = Arc<dyn ShmPublisher>;
