// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Core Components
//!
//! Serialized datum engine shared by writers, readers and transports.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `ser` | CDR cursors and the encapsulation header |
//! | `types` | `DDS` sample trait and type-erased `SerType` descriptors |
//! | `keyhash` | 16-byte instance key descriptors |
//! | `serdata` | Reference-counted datum, buffer pool, type conversion |
//! | `tkmap` | Instance identity map |
//! | `retry` | Bounded retry used on blocking paths |
//!
//! ## Architecture
//!
//! ```text
//! +------------------------------------------------------+
//! |                      DDS Layer                       |
//! |          (DataWriter, local readers, loans)          |
//! +------------------------------------------------------+
//! |                      Core Layer                      |
//! |  +---------+ +---------+ +---------+ +-------------+ |
//! |  | serdata | |  tkmap  | | keyhash | | ser / types | |
//! |  +---------+ +---------+ +---------+ +-------------+ |
//! +------------------------------------------------------+
//! ```

/// Endpoint identifiers.
pub mod guid;
/// MurmurHash3 and MD5 helpers.
pub mod hash;
pub mod keyhash;
/// Bounded retry with sleeps.
pub mod retry;
/// Serialization helpers (CDR encoding/decoding).
pub mod ser;
pub mod serdata;
/// Source timestamps.
pub mod time;
pub mod tkmap;
pub mod types;
