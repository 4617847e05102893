// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Outbound transport seams used by the writer.
//!
//! # Modules
//!
//! - `shm` - shared-memory chunks, publisher trait and in-process segment
//! - `xpack` - batching transmit queue in front of a [`PacketSink`]
//!
//! The writer only talks to [`TransmitQueue`]; how datums become packets
//! (RTPS framing, sockets) lives behind it.

pub mod shm;
pub mod xpack;

pub use xpack::{OutboundMessage, PacketSink, XmitPack, XmitStats};

use crate::core::guid::GUID;
use crate::core::serdata::Serdata;
use crate::core::tkmap::InstanceToken;
use crate::dds::Result;

/// Network side of a writer.
pub trait TransmitQueue: Send + Sync {
    /// Queue `datum` for the writer's network readers.
    ///
    /// Takes ownership of one reference. Returns `Error::Timeout` when the
    /// queue stays full past the writer's blocking budget.
    fn enqueue(&self, writer: &GUID, datum: Serdata, instance: &InstanceToken) -> Result<()>;

    /// Push out whatever is batched; a non-blocking flush may skip work if
    /// another thread is already flushing.
    fn flush(&self, blocking: bool);
}
