// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Batching transmit queue.
//!
//! Wire images of enqueued datums accumulate until the byte budget is reached
//! or the writer flushes, then leave as one batch through a [`PacketSink`].

use super::TransmitQueue;
use crate::config::SerdataConfig;
use crate::core::guid::GUID;
use crate::core::serdata::Serdata;
use crate::core::tkmap::InstanceToken;
use crate::dds::{Error, Result};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// One datum ready to leave the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub writer: GUID,
    pub instance: u64,
    /// Wire image (header + payload).
    pub payload: Vec<u8>,
}

/// Destination of packed batches.
pub trait PacketSink: Send + Sync {
    fn send_batch(&self, batch: &[OutboundMessage]) -> std::io::Result<()>;
}

/// Counters of an [`XmitPack`].
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmitStats {
    pub messages_sent: u64,
    pub bytes_sent: u64,
    pub batches_sent: u64,
    pub drops: u64,
}

struct PackState {
    pending: Vec<OutboundMessage>,
    bytes: usize,
}

/// Batching transmit queue.
///
/// Messages accumulate until `xmit_batch_bytes` is reached or the writer
/// flushes; a batch goes to the sink in a single call.
pub struct XmitPack {
    state: Mutex<PackState>,
    send_lock: Mutex<()>,
    sink: Arc<dyn PacketSink>,
    batch_bytes: usize,
    messages_sent: AtomicU64,
    bytes_sent: AtomicU64,
    batches_sent: AtomicU64,
    drops: AtomicU64,
}

impl XmitPack {
    #[must_use]
    pub fn new(sink: Arc<dyn PacketSink>, cfg: &SerdataConfig) -> Self {
        Self {
            state: Mutex::new(PackState {
                pending: Vec::new(),
                bytes: 0,
            }),
            send_lock: Mutex::new(()),
            sink,
            batch_bytes: cfg.xmit_batch_bytes.max(1),
            messages_sent: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            batches_sent: AtomicU64::new(0),
            drops: AtomicU64::new(0),
        }
    }

    /// Messages waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn stats(&self) -> XmitStats {
        XmitStats {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            batches_sent: self.batches_sent.load(Ordering::Relaxed),
            drops: self.drops.load(Ordering::Relaxed),
        }
    }

    fn take_batch(&self) -> Vec<OutboundMessage> {
        let mut state = self.state.lock();
        state.bytes = 0;
        std::mem::take(&mut state.pending)
    }

    fn send(&self, batch: Vec<OutboundMessage>) {
        if batch.is_empty() {
            return;
        }
        let bytes: usize = batch.iter().map(|m| m.payload.len()).sum();
        match self.sink.send_batch(&batch) {
            Ok(()) => {
                self.messages_sent
                    .fetch_add(batch.len() as u64, Ordering::Relaxed);
                self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
                self.batches_sent.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.drops.fetch_add(batch.len() as u64, Ordering::Relaxed);
                log::debug!("[xmit] batch of {} messages dropped: {}", batch.len(), e);
            }
        }
    }
}

impl TransmitQueue for XmitPack {
    fn enqueue(&self, writer: &GUID, datum: Serdata, instance: &InstanceToken) -> Result<()> {
        let payload = datum
            .wire_image()
            .map_err(|e| Error::Error(format!("cannot serialize for transmit: {}", e)))?
            .into_owned();
        drop(datum);

        let full = {
            let mut state = self.state.lock();
            state.bytes += payload.len();
            state.pending.push(OutboundMessage {
                writer: *writer,
                instance: instance.iid(),
                payload,
            });
            state.bytes >= self.batch_bytes
        };
        if full {
            let _guard = self.send_lock.lock();
            self.send(self.take_batch());
        }
        Ok(())
    }

    fn flush(&self, blocking: bool) {
        let _guard = if blocking {
            self.send_lock.lock()
        } else {
            match self.send_lock.try_lock() {
                Some(guard) => guard,
                None => return,
            }
        };
        self.send(self.take_batch());
    }
}

impl fmt::Debug for XmitPack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmitPack")
            .field("pending", &self.pending())
            .field("batch_bytes", &self.batch_bytes)
            .finish()
    }
}
