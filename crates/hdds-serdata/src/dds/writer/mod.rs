// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # DataWriter
//!
//! The [`DataWriter`] turns typed samples into serialized datums and fans
//! them out to network readers, shared-memory subscribers and local readers.
//!
//! ## Example
//!
//! ```rust,ignore
//! use hdds_serdata::dds::{ReaderHistory, WriterBuilder, WriterQos};
//!
//! let writer = WriterBuilder::<Temperature>::new("sensors/temp", ty.clone())
//!     .qos(WriterQos::reliable())
//!     .transmit(xmit)
//!     .build()?;
//! writer.match_local_reader(ReaderHistory::new(reader_guid, ty, 16));
//! writer.write(&Temperature { sensor_id: 42, value: 23.5 })?;
//! ```
//!
//! ## Write path
//!
//! ```text
//! filter -> loan check -> reader check -+-> lazy:  loaned chunk -> shm publish
//!                                       |
//!                                       +-> eager: serialize -> convert -> transmit queue
//!                                                  -> shm publish -> local readers
//! ```
//!
//! The lazy path is only taken by a volatile writer holding a shared-memory
//! chunk with no network reader matched. On the eager path local delivery
//! is skipped once the chunk was published, since in-process subscribers
//! receive it through the segment.

mod builder;
mod deliver;
mod loan;
mod matched;
mod runtime;

pub use builder::WriterBuilder;
pub use loan::Loan;
pub use runtime::{DataWriter, WriterStats};

use crate::core::serdata::StatusInfo;

/// What a write call publishes: the sample or only its key, plus the
/// instance state change it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteAction(u8);

impl WriteAction {
    pub const WRITE: WriteAction = WriteAction(0);
    /// Only the key fields are published.
    pub const KEY: WriteAction = WriteAction(1);
    pub const DISPOSE: WriteAction = WriteAction(2);
    pub const UNREGISTER: WriteAction = WriteAction(4);

    pub const WRITE_DISPOSE: WriteAction = WriteAction::DISPOSE;
    pub const DISPOSE_INSTANCE: WriteAction = WriteAction(1 | 2);
    pub const UNREGISTER_INSTANCE: WriteAction = WriteAction(1 | 4);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn union(self, other: WriteAction) -> WriteAction {
        WriteAction(self.0 | other.0)
    }

    pub const fn contains(self, other: WriteAction) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_key(self) -> bool {
        self.contains(WriteAction::KEY)
    }

    /// Status flags stamped on the datum.
    pub const fn statusinfo(self) -> StatusInfo {
        let mut bits = 0;
        if self.contains(WriteAction::DISPOSE) {
            bits |= StatusInfo::DISPOSE.bits();
        }
        if self.contains(WriteAction::UNREGISTER) {
            bits |= StatusInfo::UNREGISTER.bits();
        }
        StatusInfo::from_bits(bits)
    }
}
