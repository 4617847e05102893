// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Instance map: key datum -> instance identity.
//!
//! Every datum is filed under its untyped key projection. The first lookup of
//! a key allocates an instance id; the entry lives as long as some
//! [`InstanceToken`] for it does.

use crate::core::ser::SerResult;
use crate::core::serdata::Serdata;
use dashmap::DashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Untyped key datum used as map key.
#[derive(Clone)]
struct InstanceKey(Serdata);

impl Hash for InstanceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.0.hash());
    }
}

impl PartialEq for InstanceKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.hash() == other.0.hash() && self.0.keyhash().value == other.0.keyhash().value
    }
}

impl Eq for InstanceKey {}

struct InstanceRecord {
    iid: u64,
    key: InstanceKey,
    // live tokens; reaches 0 only under the shard lock
    holders: AtomicUsize,
}

struct MapInner {
    instances: DashMap<InstanceKey, Arc<InstanceRecord>>,
    next_iid: AtomicU64,
}

/// Instance identities of one domain.
#[derive(Clone)]
pub struct InstanceMap {
    inner: Arc<MapInner>,
}

impl InstanceMap {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MapInner {
                instances: DashMap::new(),
                next_iid: AtomicU64::new(1),
            }),
        }
    }

    /// Token for the instance of `datum`, registering it on first sight.
    pub fn acquire(&self, datum: &Serdata) -> SerResult<InstanceToken> {
        let key = InstanceKey(datum.to_untyped()?);
        let entry = self
            .inner
            .instances
            .entry(key.clone())
            .or_insert_with(|| {
                let iid = self.inner.next_iid.fetch_add(1, Ordering::Relaxed);
                log::trace!("[tkmap] new instance iid={} hash={:#010x}", iid, key.0.hash());
                Arc::new(InstanceRecord {
                    iid,
                    key,
                    holders: AtomicUsize::new(0),
                })
            });
        // counted while the shard lock is held, so a concurrent last drop
        // cannot remove the entry underneath us
        entry.holders.fetch_add(1, Ordering::AcqRel);
        let record = Arc::clone(entry.value());
        drop(entry);
        Ok(InstanceToken {
            record,
            map: Arc::clone(&self.inner),
        })
    }

    /// Instance id of `datum` if its instance is live.
    pub fn lookup(&self, datum: &Serdata) -> SerResult<Option<u64>> {
        let key = InstanceKey(datum.to_untyped()?);
        Ok(self.inner.instances.get(&key).map(|r| r.iid))
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.inner.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.instances.is_empty()
    }
}

impl Default for InstanceMap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InstanceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceMap")
            .field("instances", &self.len())
            .finish()
    }
}

/// Counted reference to a live instance.
pub struct InstanceToken {
    record: Arc<InstanceRecord>,
    map: Arc<MapInner>,
}

impl InstanceToken {
    /// Instance id, unique within the map.
    pub fn iid(&self) -> u64 {
        self.record.iid
    }

    /// Untyped key datum of the instance.
    pub fn key(&self) -> &Serdata {
        &self.record.key.0
    }
}

impl Clone for InstanceToken {
    fn clone(&self) -> Self {
        // this token keeps the count above zero
        self.record.holders.fetch_add(1, Ordering::AcqRel);
        Self {
            record: Arc::clone(&self.record),
            map: Arc::clone(&self.map),
        }
    }
}

impl Drop for InstanceToken {
    fn drop(&mut self) {
        let record = &self.record;
        self.map.instances.remove_if(&record.key, |_, rec| {
            Arc::ptr_eq(rec, record) && rec.holders.fetch_sub(1, Ordering::AcqRel) == 1
        });
    }
}

impl fmt::Debug for InstanceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceToken(iid={})", self.record.iid)
    }
}
