// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Same-process readers fed directly by writers.
//!
//! A writer hands each local reader the datum, the instance token and a
//! [`WriterInfo`]. The reader answers with a [`StoreOutcome`]; `Full` makes
//! the writer retry until its max blocking time runs out.

use crate::core::guid::GUID;
use crate::core::ser::SerResult;
use crate::core::serdata::{Serdata, StatusInfo};
use crate::core::time::Timestamp;
use crate::core::tkmap::InstanceToken;
use crate::core::types::{SerType, DDS};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Writer-side facts delivered along with each sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterInfo {
    pub guid: GUID,
    pub statusinfo: StatusInfo,
    pub timestamp: Timestamp,
}

impl WriterInfo {
    pub fn of(guid: GUID, datum: &Serdata) -> Self {
        Self {
            guid,
            statusinfo: datum.statusinfo(),
            timestamp: datum.timestamp(),
        }
    }
}

/// Result of offering a datum to a local reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Stored,
    /// Reader declined the sample (e.g. its own filter); not retried.
    Rejected,
    /// History full; the writer retries.
    Full,
}

/// Reader endpoint reachable without the network.
pub trait LocalReader: Send + Sync {
    fn guid(&self) -> GUID;

    /// Type the reader expects; datums of other types are converted first.
    fn ser_type(&self) -> &Arc<dyn SerType>;

    fn store(&self, datum: &Serdata, instance: &InstanceToken, writer: &WriterInfo) -> StoreOutcome;
}

/// Sample held by a [`ReaderHistory`].
#[derive(Clone)]
pub struct ReceivedSample {
    pub datum: Serdata,
    pub instance: InstanceToken,
    pub writer: GUID,
    pub statusinfo: StatusInfo,
    pub timestamp: Timestamp,
}

impl ReceivedSample {
    pub fn iid(&self) -> u64 {
        self.instance.iid()
    }
}

impl fmt::Debug for ReceivedSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceivedSample")
            .field("datum", &self.datum)
            .field("iid", &self.iid())
            .field("writer", &self.writer)
            .field("statusinfo", &self.statusinfo)
            .finish()
    }
}

/// Bounded in-memory reader history.
///
/// Stores until `depth` samples are queued, then reports `Full` until the
/// application takes some.
pub struct ReaderHistory {
    guid: GUID,
    ser_type: Arc<dyn SerType>,
    depth: usize,
    samples: Mutex<VecDeque<ReceivedSample>>,
}

impl ReaderHistory {
    pub fn new(guid: GUID, ser_type: Arc<dyn SerType>, depth: usize) -> Arc<Self> {
        Arc::new(Self {
            guid,
            ser_type,
            depth: depth.max(1),
            samples: Mutex::new(VecDeque::new()),
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }

    /// Oldest sample, with its datum.
    pub fn take_datum(&self) -> Option<ReceivedSample> {
        self.samples.lock().pop_front()
    }

    /// Oldest sample decoded as `T`.
    pub fn take<T: DDS>(&self) -> Option<SerResult<(T, ReceivedSample)>> {
        let received = self.take_datum()?;
        Some(received.datum.to_sample::<T>().map(|s| (s, received)))
    }
}

impl LocalReader for ReaderHistory {
    fn guid(&self) -> GUID {
        self.guid
    }

    fn ser_type(&self) -> &Arc<dyn SerType> {
        &self.ser_type
    }

    fn store(&self, datum: &Serdata, instance: &InstanceToken, writer: &WriterInfo) -> StoreOutcome {
        let mut samples = self.samples.lock();
        if samples.len() >= self.depth {
            return StoreOutcome::Full;
        }
        samples.push_back(ReceivedSample {
            datum: datum.clone(),
            instance: instance.clone(),
            writer: writer.guid,
            statusinfo: writer.statusinfo,
            timestamp: writer.timestamp,
        });
        StoreOutcome::Stored
    }
}

impl fmt::Debug for ReaderHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderHistory")
            .field("guid", &self.guid)
            .field("type", &self.ser_type.type_name())
            .field("depth", &self.depth)
            .field("len", &self.len())
            .finish()
    }
}
