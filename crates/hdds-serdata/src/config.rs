// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serdata configuration - single source of truth for sizing constants.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: compile-time constants (pool bounds, buffer growth,
//!   retry budgets).
//! - **Level 2 (Dynamic)**: [`SerdataConfig`], injected into the pool and the
//!   writers of one domain. Defaults equal the Level 1 constants.
//!
//! # Example
//!
//! ```ignore
//! use hdds_serdata::config::SerdataConfig;
//!
//! let cfg = SerdataConfig::from_yaml_str("pool_capacity: 1024")?;
//! assert_eq!(cfg.pool_capacity, 1024);
//! ```

use std::time::Duration;

// =======================================================================
// Serdata pool
// =======================================================================

/// Maximum number of recycled buffers kept by a [`SerdataPool`](crate::core::serdata::SerdataPool).
///
/// 8k entries is roughly what is needed to send minimum-size samples as fast
/// as possible over loopback with large messages.
pub const MAX_POOL_SIZE: usize = 8192;

/// Largest buffer capacity (bytes) that is returned to the pool on free.
pub const MAX_SIZE_FOR_POOL: usize = 256;

/// Initial buffer capacity for a datum built from a sample.
pub const DEFAULT_NEW_SIZE: usize = 128;

/// Buffer growth granularity; capacities are always a multiple of this.
pub const CHUNK_SIZE: usize = 128;

/// Largest accepted serialized datum (content + header), in bytes.
pub const MAX_SERDATA_SIZE: usize = (u32::MAX as usize) - 64;

// =======================================================================
// Writer delivery
// =======================================================================

/// Number of outstanding shared-memory loans a single writer can track.
pub const MAX_PUB_LOANS: usize = 8;

/// Attempts made to obtain a shared-memory chunk before falling back.
pub const SHM_ACQUIRE_ATTEMPTS: u32 = 10;

/// Pause between two shared-memory chunk acquisition attempts.
pub const SHM_ACQUIRE_INTERVAL: Duration = Duration::from_millis(1);

/// Pause between two attempts to store into a full local reader.
pub const LOCAL_DELIVERY_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Default reliability max blocking time (DDS default: 100 ms).
pub const DEFAULT_MAX_BLOCKING_TIME: Duration = Duration::from_millis(100);

/// Transmit batch budget before an automatic flush (bytes).
pub const DEFAULT_XMIT_BATCH_BYTES: usize = 64 * 1024;

/// Runtime configuration shared by the serdata pool and the writers of a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-loaders", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-loaders", serde(default))]
pub struct SerdataConfig {
    /// Bound on recycled buffers held by the pool.
    pub pool_capacity: usize,
    /// Buffers with a larger capacity are freed instead of pooled.
    pub pool_max_buffer: usize,
    /// Initial capacity of a freshly allocated buffer.
    pub initial_buffer: usize,
    /// Shared-memory chunk acquisition attempts per write.
    pub shm_acquire_attempts: u32,
    /// Pause between shared-memory acquisition attempts (milliseconds).
    pub shm_acquire_interval_ms: u64,
    /// Pause between local delivery retries (milliseconds).
    pub local_retry_interval_ms: u64,
    /// Transmit batch budget (bytes).
    pub xmit_batch_bytes: usize,
}

impl Default for SerdataConfig {
    fn default() -> Self {
        Self {
            pool_capacity: MAX_POOL_SIZE,
            pool_max_buffer: MAX_SIZE_FOR_POOL,
            initial_buffer: DEFAULT_NEW_SIZE,
            shm_acquire_attempts: SHM_ACQUIRE_ATTEMPTS,
            shm_acquire_interval_ms: SHM_ACQUIRE_INTERVAL.as_millis() as u64,
            local_retry_interval_ms: LOCAL_DELIVERY_RETRY_INTERVAL.as_millis() as u64,
            xmit_batch_bytes: DEFAULT_XMIT_BATCH_BYTES,
        }
    }
}

impl SerdataConfig {
    #[must_use]
    pub fn shm_acquire_interval(&self) -> Duration {
        Duration::from_millis(self.shm_acquire_interval_ms)
    }

    #[must_use]
    pub fn local_retry_interval(&self) -> Duration {
        Duration::from_millis(self.local_retry_interval_ms)
    }

    /// Reject values the pool and writers cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_capacity == 0 {
            return Err(ConfigError::Invalid("pool_capacity must be > 0".into()));
        }
        if self.initial_buffer == 0 {
            return Err(ConfigError::Invalid("initial_buffer must be > 0".into()));
        }
        if self.shm_acquire_attempts == 0 {
            return Err(ConfigError::Invalid(
                "shm_acquire_attempts must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Parse a YAML document; missing keys keep their default.
    #[cfg(feature = "config-loaders")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load a YAML file.
    #[cfg(feature = "config-loaders")]
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;
        log::debug!("[config] loading serdata config from {}", path.display());
        Self::from_yaml_str(&content)
    }
}

/// Configuration loading errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    FileNotFound(String),
    /// Document could not be parsed.
    Parse(String),
    /// A value is out of range.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
