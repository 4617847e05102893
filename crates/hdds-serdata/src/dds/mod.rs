// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # DDS Write Path
//!
//! Typed [`DataWriter`] on top of the serialized datum engine.
//!
//! ## Overview
//!
//! - **DataWriter**: filters, serializes and delivers samples
//! - **Local readers**: same-process readers fed directly by the writer
//! - **Loans**: shared-memory chunks handed to the application to fill
//! - **QoS**: the handful of writer policies the write path depends on
//!
//! ## Delivery paths
//!
//! ```text
//!                          +--> transmit queue (network readers)
//! write(sample) --> datum -+--> shared-memory publish
//!                          +--> local readers (in GUID order)
//! ```
//!
//! A volatile writer with only shared-memory peers skips serialization and
//! publishes the loaned chunk itself.

pub mod filter;
pub mod qos;
pub mod reader;
mod writer;

pub use filter::TopicFilter;
pub use qos::{Durability, Reliability, ReliabilityKind, ShmPolicy, WriterQos};
pub use reader::{LocalReader, ReaderHistory, ReceivedSample, StoreOutcome, WriterInfo};
pub use writer::{DataWriter, Loan, WriteAction, WriterBuilder, WriterStats};

use crate::config::ConfigError;
use crate::core::ser::SerError;
use crate::transport::shm::ShmError;

/// Errors returned by write-path operations.
///
/// # Example
///
/// ```rust,ignore
/// match writer.write_ts(&sample, Timestamp::from_nanos(-5)) {
///     Err(Error::BadParameter(msg)) => println!("rejected: {}", msg),
///     Err(e) => println!("other error: {}", e),
///     Ok(()) => {}
/// }
/// ```
#[derive(Debug)]
pub enum Error {
    /// Generic failure (e.g. no shared-memory chunk could be obtained).
    Error(String),
    /// Malformed argument (bad timestamp, malformed wire input, unreadable loan).
    BadParameter(String),
    /// Operation not available in this configuration.
    Unsupported,
    /// Caller broke a usage rule (e.g. returned a loan it did not own).
    PreconditionNotMet(String),
    /// A blocking step exceeded the writer's max blocking time.
    Timeout,
    /// A bounded table is full.
    OutOfResources(String),
    /// QoS combination rejected at writer creation.
    InvalidQos(String),
    /// Datum construction or conversion failed.
    Serialization(SerError),
    /// Shared-memory operation failed.
    Shm(ShmError),
    /// Configuration could not be loaded.
    Config(ConfigError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Error(msg) => write!(f, "Error: {}", msg),
            Error::BadParameter(msg) => write!(f, "Bad parameter: {}", msg),
            Error::Unsupported => write!(f, "Unsupported operation"),
            Error::PreconditionNotMet(msg) => write!(f, "Precondition not met: {}", msg),
            Error::Timeout => write!(f, "Timeout"),
            Error::OutOfResources(msg) => write!(f, "Out of resources: {}", msg),
            Error::InvalidQos(msg) => write!(f, "Invalid QoS: {}", msg),
            Error::Serialization(e) => write!(f, "Serialization failed: {}", e),
            Error::Shm(e) => write!(f, "Shared memory: {}", e),
            Error::Config(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Serialization(e) => Some(e),
            Error::Shm(e) => Some(e),
            Error::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SerError> for Error {
    fn from(e: SerError) -> Self {
        Error::Serialization(e)
    }
}

impl From<ShmError> for Error {
    fn from(e: ShmError) -> Self {
        Error::Shm(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

/// Convenient alias for API results using the public `Error` type.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_and_source() {
        let e: Error = SerError::invalid("truncated").into();
        assert_eq!(e.to_string(), "Serialization failed: invalid data: truncated");
        assert!(std::error::Error::source(&e).is_some());
        assert_eq!(Error::Timeout.to_string(), "Timeout");
        assert!(std::error::Error::source(&Error::Unsupported).is_none());
    }
}
