// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # HDDS Serdata - serialized samples and the writer delivery path
//!
//! Turns typed samples into immutable, reference-counted wire
//! representations ([`Serdata`]) and gets them to matched readers over a
//! transmit queue, a shared-memory segment or direct in-process delivery.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hdds_serdata::dds::{ReaderHistory, WriterBuilder};
//! use hdds_serdata::{CdrType, SerdataConfig, SerdataPool, GUID};
//! use std::sync::Arc;
//!
//! let pool = Arc::new(SerdataPool::new(&SerdataConfig::default()));
//! let ty = CdrType::<Temperature>::new(pool);
//! let writer = WriterBuilder::new("sensors/temp", ty.clone()).build()?;
//!
//! let reader = ReaderHistory::new(GUID::zero(), ty, 16);
//! writer.match_local_reader(reader.clone());
//! writer.write(&Temperature { sensor_id: 1, celsius: 21.5 })?;
//! let (sample, _) = reader.take::<Temperature>().expect("sample")?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------+
//! |                          DDS Layer                            |
//! |   DataWriter | loans | topic filter | local readers | QoS     |
//! +---------------------------------------------------------------+
//! |                          Core Layer                           |
//! |   Serdata | SerdataPool | KeyHash | SerType | InstanceMap     |
//! +---------------------------------------------------------------+
//! |                        Transport Layer                        |
//! |   TransmitQueue / XmitPack | shared-memory segment            |
//! +---------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`core`] - datum engine: encoding, key hashes, pool, conversion
//! - [`dds`] - `DataWriter` and its collaborators
//! - [`transport`] - transmit queue and shared-memory seams
//! - [`config`] - tunables and YAML loading

pub mod config;
pub mod core;
pub mod dds;
pub mod transport;

#[cfg(test)]
mod testing;

pub use crate::config::{ConfigError, SerdataConfig};
pub use crate::core::guid::GUID;
pub use crate::core::keyhash::{KeyHash, KEYHASH_SIZE};
pub use crate::core::ser::{SerError, SerResult};
pub use crate::core::serdata::{
    convert_for_writer, Fragment, Serdata, SerdataPool, SerdataSlice, StatusInfo,
};
pub use crate::core::time::Timestamp;
pub use crate::core::tkmap::{InstanceMap, InstanceToken};
pub use crate::core::types::{CdrType, KeyLayout, OpaqueType, SampleKind, SerType, TypeFamily, DDS};
pub use crate::dds::{DataWriter, Error, Loan, Result, WriteAction, WriterBuilder, WriterQos};
