// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounded freelist of datum buffers.
//!
//! Small buffers are recycled instead of freed: building a datum pops a
//! buffer, dropping the last reference to it pushes the buffer back if its
//! capacity is at most `pool_max_buffer` and the freelist has room.
//!
//! # Design
//! - **Lock-free:** crossbeam `ArrayQueue`, safe from any thread.
//! - **Bounded:** never holds more than `pool_capacity` buffers.
//! - **Per domain:** injected into each type, no process-wide singleton.

use crate::config::{SerdataConfig, CHUNK_SIZE};
use crate::core::ser::align_up;
use crossbeam::queue::ArrayQueue;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Recycling pool for datum buffers.
pub struct SerdataPool {
    freelist: ArrayQueue<Vec<u8>>,
    max_buffer: usize,
    initial: usize,
    /// Buffers served from the freelist.
    reused: AtomicU64,
    /// Buffers freshly allocated.
    allocated: AtomicU64,
}

impl SerdataPool {
    #[must_use]
    pub fn new(cfg: &SerdataConfig) -> Self {
        Self {
            freelist: ArrayQueue::new(cfg.pool_capacity.max(1)),
            max_buffer: cfg.pool_max_buffer,
            initial: align_up(cfg.initial_buffer.max(1), CHUNK_SIZE),
            reused: AtomicU64::new(0),
            allocated: AtomicU64::new(0),
        }
    }

    /// Maximum number of pooled buffers.
    pub fn capacity(&self) -> usize {
        self.freelist.capacity()
    }

    /// Buffers currently waiting for reuse.
    pub fn len(&self) -> usize {
        self.freelist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freelist.is_empty()
    }

    pub fn reused_count(&self) -> u64 {
        self.reused.load(Ordering::Relaxed)
    }

    pub fn allocated_count(&self) -> u64 {
        self.allocated.load(Ordering::Relaxed)
    }

    /// Get an empty buffer able to hold at least `size_hint` bytes.
    pub fn acquire(self: &Arc<Self>, size_hint: usize) -> SerBuffer {
        let wanted = align_up(size_hint.max(self.initial), CHUNK_SIZE);
        let bytes = match self.freelist.pop() {
            Some(mut buf) => {
                self.reused.fetch_add(1, Ordering::Relaxed);
                if buf.capacity() < wanted {
                    buf.reserve_exact(wanted);
                }
                buf
            }
            None => {
                self.allocated.fetch_add(1, Ordering::Relaxed);
                Vec::with_capacity(wanted)
            }
        };
        SerBuffer {
            bytes,
            pool: Some(Arc::clone(self)),
        }
    }

    fn recycle(&self, mut buf: Vec<u8>) {
        if buf.capacity() > self.max_buffer {
            return;
        }
        buf.clear();
        // full freelist: buffer is dropped
        let _ = self.freelist.push(buf);
    }
}

impl fmt::Debug for SerdataPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerdataPool")
            .field("pooled", &self.len())
            .field("capacity", &self.capacity())
            .field("max_buffer", &self.max_buffer)
            .finish()
    }
}

/// Buffer owned by one datum; returns to its pool on drop.
pub struct SerBuffer {
    bytes: Vec<u8>,
    pool: Option<Arc<SerdataPool>>,
}

impl SerBuffer {
    /// Buffer that is never pooled.
    #[must_use]
    pub fn detached(bytes: Vec<u8>) -> Self {
        Self { bytes, pool: None }
    }

    pub(crate) fn as_vec_mut(&mut self) -> &mut Vec<u8> {
        &mut self.bytes
    }
}

impl Deref for SerBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl DerefMut for SerBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl Drop for SerBuffer {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.recycle(std::mem::take(&mut self.bytes));
        }
    }
}

impl fmt::Debug for SerBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerBuffer")
            .field("len", &self.bytes.len())
            .field("capacity", &self.bytes.capacity())
            .finish()
    }
}
