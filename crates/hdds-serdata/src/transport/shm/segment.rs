// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process shared-memory segment.
//!
//! A fixed set of equally sized chunks handed out through a lock-free free
//! list. Published chunks are shared (`Arc`) with every subscriber queue; the
//! slot comes back when the last subscriber drops its handle.

use super::metrics::{ShmMetrics, ShmMetricsSnapshot};
use super::{ChunkOrigin, Result, ShmChunk, ShmError, ShmPublisher};
use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use crossbeam::queue::ArrayQueue;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

static NEXT_SEGMENT_ID: AtomicU64 = AtomicU64::new(1);

struct Subscriber {
    id: u64,
    tx: Sender<Arc<ShmChunk>>,
}

struct SegmentInner {
    id: u64,
    name: String,
    chunk_size: usize,
    capacity: usize,
    free: ArrayQueue<(usize, Box<[u8]>)>,
    subscribers: RwLock<Vec<Subscriber>>,
    next_subscriber: AtomicU64,
    metrics: ShmMetrics,
}

impl ChunkOrigin for SegmentInner {
    fn reclaim(&self, slot: usize, payload: Box<[u8]>) {
        self.metrics.inc_reclaims();
        if self.free.push((slot, payload)).is_err() {
            log::error!("[shm] segment '{}': slot {} reclaimed twice", self.name, slot);
        }
    }

    fn segment_id(&self) -> u64 {
        self.id
    }
}

/// Segment of `capacity` chunks of `chunk_size` bytes each.
#[derive(Clone)]
pub struct ShmSegment {
    inner: Arc<SegmentInner>,
}

impl ShmSegment {
    pub fn new(name: impl Into<String>, capacity: usize, chunk_size: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(ShmError::InvalidCapacity(capacity));
        }
        let free = ArrayQueue::new(capacity);
        for slot in 0..capacity {
            free.push((slot, vec![0u8; chunk_size].into_boxed_slice()))
                .map_err(|_| ShmError::InvalidCapacity(capacity))?;
        }
        let name = name.into();
        log::debug!(
            "[shm] segment '{}' created: {} chunks x {} bytes",
            name,
            capacity,
            chunk_size
        );
        Ok(Self {
            inner: Arc::new(SegmentInner {
                id: NEXT_SEGMENT_ID.fetch_add(1, Ordering::Relaxed),
                name,
                chunk_size,
                capacity,
                free,
                subscribers: RwLock::new(Vec::new()),
                next_subscriber: AtomicU64::new(0),
                metrics: ShmMetrics::new(),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub fn chunk_size(&self) -> usize {
        self.inner.chunk_size
    }

    /// Chunks neither loaned nor held by a subscriber.
    pub fn available(&self) -> usize {
        self.inner.free.len()
    }

    pub fn metrics(&self) -> ShmMetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Receive every chunk published from now on; at most `depth` are queued.
    pub fn subscribe(&self, depth: usize) -> ShmSubscription {
        let (tx, rx) = bounded(depth.max(1));
        let id = self.inner.next_subscriber.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribers.write().push(Subscriber { id, tx });
        ShmSubscription { rx }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.read().len()
    }
}

impl ShmPublisher for ShmSegment {
    fn try_loan(&self, size: usize) -> Result<ShmChunk> {
        if size > self.inner.chunk_size {
            return Err(ShmError::PayloadTooLarge {
                size,
                capacity: self.inner.chunk_size,
            });
        }
        match self.inner.free.pop() {
            Some((slot, payload)) => {
                self.inner.metrics.inc_loans();
                let origin: Weak<dyn ChunkOrigin> = Arc::downgrade(&self.inner) as Weak<dyn ChunkOrigin>;
                Ok(ShmChunk::new(slot, payload, size, origin))
            }
            None => {
                self.inner.metrics.inc_exhausted();
                Err(ShmError::Exhausted)
            }
        }
    }

    fn publish(&self, chunk: ShmChunk) -> Result<()> {
        if chunk.segment_id() != Some(self.inner.id) {
            return Err(ShmError::ForeignChunk);
        }
        self.inner.metrics.inc_publishes();
        let chunk = Arc::new(chunk);
        let mut dead = Vec::new();
        for sub in self.inner.subscribers.read().iter() {
            match sub.tx.try_send(Arc::clone(&chunk)) {
                Ok(()) => self.inner.metrics.inc_deliveries(),
                Err(TrySendError::Full(_)) => {
                    self.inner.metrics.inc_overruns();
                    log::debug!("[shm] segment '{}': subscriber {} overrun", self.inner.name, sub.id);
                }
                Err(TrySendError::Disconnected(_)) => dead.push(sub.id),
            }
        }
        if !dead.is_empty() {
            self.inner
                .subscribers
                .write()
                .retain(|sub| !dead.contains(&sub.id));
        }
        Ok(())
    }
}

impl fmt::Debug for ShmSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShmSegment")
            .field("name", &self.inner.name)
            .field("capacity", &self.inner.capacity)
            .field("available", &self.available())
            .finish()
    }
}

/// Receiving end of a segment subscription.
pub struct ShmSubscription {
    rx: Receiver<Arc<ShmChunk>>,
}

impl ShmSubscription {
    pub fn try_take(&self) -> Option<Arc<ShmChunk>> {
        self.rx.try_recv().ok()
    }

    pub fn take_timeout(&self, timeout: Duration) -> Option<Arc<ShmChunk>> {
        match self.rx.recv_timeout(timeout) {
            Ok(chunk) => Some(chunk),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Chunks waiting to be taken.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
