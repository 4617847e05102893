// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Readers matched with a writer.
//!
//! Network readers form the writer's address set and are read under the
//! writer lock on every write. Local readers are published as an immutable
//! GUID-ordered snapshot so delivery never holds a lock while storing.

use crate::core::guid::GUID;
use crate::dds::reader::LocalReader;
use arc_swap::ArcSwap;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Remote readers reachable through the transmit queue.
#[derive(Debug, Default)]
pub(super) struct AddressSet {
    readers: BTreeSet<GUID>,
}

impl AddressSet {
    pub(super) fn insert(&mut self, guid: GUID) -> bool {
        self.readers.insert(guid)
    }

    pub(super) fn remove(&mut self, guid: &GUID) -> bool {
        self.readers.remove(guid)
    }

    pub(super) fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }

    pub(super) fn len(&self) -> usize {
        self.readers.len()
    }
}

pub(super) type ReaderList = Vec<Arc<dyn LocalReader>>;

/// In-process readers, ordered by GUID.
pub(super) struct LocalReaders {
    readers: ArcSwap<ReaderList>,
}

impl LocalReaders {
    pub(super) fn new() -> Self {
        Self {
            readers: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Add `reader`, replacing a previous match with the same GUID.
    pub(super) fn insert(&self, reader: Arc<dyn LocalReader>) {
        let guid = reader.guid();
        self.readers.rcu(|current| {
            let mut next: ReaderList = current
                .iter()
                .filter(|r| r.guid() != guid)
                .cloned()
                .collect();
            let pos = next.partition_point(|r| r.guid() < guid);
            next.insert(pos, Arc::clone(&reader));
            next
        });
    }

    pub(super) fn remove(&self, guid: &GUID) -> bool {
        let previous = self.readers.rcu(|current| {
            current
                .iter()
                .filter(|r| r.guid() != *guid)
                .cloned()
                .collect::<ReaderList>()
        });
        previous.iter().any(|r| r.guid() == *guid)
    }

    pub(super) fn snapshot(&self) -> Arc<ReaderList> {
        self.readers.load_full()
    }

    pub(super) fn len(&self) -> usize {
        self.readers.load().len()
    }
}
