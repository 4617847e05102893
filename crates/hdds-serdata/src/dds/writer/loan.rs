// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared-memory loans handed out by a writer.
//!
//! A writer records every chunk it lends in a fixed table (under the writer
//! lock). Writing or returning a loan removes it from the table; a loan the
//! table does not know was not lent by this writer.

use super::runtime::WriterState;
use crate::config::MAX_PUB_LOANS;
use crate::core::retry::{retry, RetryBudget};
use crate::core::ser::SerResult;
use crate::core::types::DDS;
use crate::transport::shm::{ChunkId, ShmChunk, ShmError, ShmPublisher};
use parking_lot::Mutex;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Weak;
use std::time::Duration;

/// Outstanding loans of one writer.
#[derive(Debug, Default)]
pub(super) struct LoanTable {
    slots: [Option<ChunkId>; MAX_PUB_LOANS],
}

impl LoanTable {
    /// Record `id`; `false` when every slot is taken.
    pub(super) fn register(&mut self, id: ChunkId) -> bool {
        match self.slots.iter_mut().find(|s| s.is_none()) {
            Some(slot) => {
                *slot = Some(id);
                true
            }
            None => false,
        }
    }

    /// Forget `id`; `false` if it was not recorded.
    pub(super) fn deregister(&mut self, id: ChunkId) -> bool {
        match self.slots.iter_mut().find(|s| **s == Some(id)) {
            Some(slot) => {
                *slot = None;
                true
            }
            None => false,
        }
    }

    pub(super) fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

/// Take a chunk of `size` bytes, retrying while the segment is exhausted.
pub(super) fn acquire_chunk(
    publisher: &dyn ShmPublisher,
    size: usize,
    attempts: u32,
    interval: Duration,
) -> Option<ShmChunk> {
    let outcome = retry(RetryBudget::Attempts(attempts), interval, || {
        match publisher.try_loan(size) {
            Err(ShmError::Exhausted) => None,
            other => Some(other),
        }
    });
    match outcome {
        Ok(Ok(chunk)) => Some(chunk),
        Ok(Err(e)) => {
            log::debug!("[shm] chunk of {} bytes refused: {}", size, e);
            None
        }
        Err(_) => {
            log::debug!("[shm] no free chunk after {} attempts", attempts);
            None
        }
    }
}

/// Shared-memory sample lent to the application.
///
/// Fill it with [`Loan::set`] (or the raw bytes) and pass it to
/// `DataWriter::write_loan`, or give it back with `DataWriter::return_loan`.
/// Dropping it returns the chunk as well.
pub struct Loan<T: DDS> {
    id: ChunkId,
    chunk: Option<ShmChunk>,
    owner: Weak<Mutex<WriterState>>,
    _type: PhantomData<fn() -> T>,
}

impl<T: DDS> Loan<T> {
    pub(super) fn new(chunk: ShmChunk, owner: Weak<Mutex<WriterState>>) -> Self {
        Self {
            id: chunk.id(),
            chunk: Some(chunk),
            owner,
            _type: PhantomData,
        }
    }

    pub fn id(&self) -> ChunkId {
        self.id
    }

    /// Store `sample` in the loaned memory.
    pub fn set(&mut self, sample: &T) -> SerResult<()> {
        sample.store_loan(self.bytes_mut())
    }

    /// Read back the sample held in the loan.
    pub fn get(&self) -> SerResult<T> {
        T::load_loan(self.bytes())
    }

    pub fn bytes(&self) -> &[u8] {
        match self.chunk.as_ref() {
            Some(c) => c.payload(),
            None => &[],
        }
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        match self.chunk.as_mut() {
            Some(c) => c.payload_mut(),
            None => &mut [],
        }
    }

    /// Chunk of a loan already removed from its writer's table.
    pub(super) fn into_chunk(mut self) -> Option<ShmChunk> {
        self.chunk.take()
    }
}

impl<T: DDS> Drop for Loan<T> {
    fn drop(&mut self) {
        if self.chunk.take().is_some() {
            if let Some(owner) = self.owner.upgrade() {
                owner.lock().loans.deregister(self.id);
            }
        }
    }
}

impl<T: DDS> fmt::Debug for Loan<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loan")
            .field("type", &T::TYPE_NAME)
            .field("id", &self.id)
            .field("len", &self.bytes().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::shm::ShmSegment;

    #[test]
    fn test_table_capacity() {
        let seg = ShmSegment::new("t", MAX_PUB_LOANS + 1, 8).expect("segment");
        let mut table = LoanTable::default();
        let chunks: Vec<ShmChunk> = (0..=MAX_PUB_LOANS)
            .map(|_| seg.try_loan(8).expect("loan"))
            .collect();
        for c in &chunks[..MAX_PUB_LOANS] {
            assert!(table.register(c.id()));
        }
        assert!(!table.register(chunks[MAX_PUB_LOANS].id()));
        assert!(table.deregister(chunks[0].id()));
        assert!(!table.deregister(chunks[0].id()));
        assert_eq!(table.len(), MAX_PUB_LOANS - 1);
    }

    #[test]
    fn test_acquire_gives_up_after_budget() {
        let seg = ShmSegment::new("t", 1, 8).expect("segment");
        let held = acquire_chunk(&seg, 8, 3, Duration::ZERO).expect("first");
        assert!(acquire_chunk(&seg, 8, 3, Duration::ZERO).is_none());
        assert_eq!(seg.metrics().exhausted, 3);
        drop(held);
        assert!(acquire_chunk(&seg, 8, 3, Duration::ZERO).is_some());
    }

    #[test]
    fn test_oversized_request_not_retried() {
        let seg = ShmSegment::new("t", 1, 8).expect("segment");
        assert!(acquire_chunk(&seg, 64, 5, Duration::from_secs(1)).is_none());
        assert_eq!(seg.metrics().exhausted, 0);
    }
}
