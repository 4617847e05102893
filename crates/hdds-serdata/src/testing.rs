// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sample types shared by unit tests.

use crate::config::SerdataConfig;
use crate::core::ser::{CdrReader, CdrWriter, SerError, SerResult};
use crate::core::serdata::SerdataPool;
use crate::core::types::{KeyLayout, DDS};
use std::sync::Arc;

pub fn pool() -> Arc<SerdataPool> {
    Arc::new(SerdataPool::new(&SerdataConfig::default()))
}

/// Fixed `u32` key, loanable (12-byte little-endian footprint).
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    pub id: u32,
    pub value: f64,
}

impl Sensor {
    pub fn new(id: u32, value: f64) -> Self {
        Self { id, value }
    }
}

impl DDS for Sensor {
    const TYPE_NAME: &'static str = "test::Sensor";
    const KEY_LAYOUT: KeyLayout = KeyLayout::Fixed;

    fn encode(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
        w.write_u32(self.id)?;
        w.write_f64(self.value)
    }

    fn decode(r: &mut CdrReader<'_>) -> SerResult<Self> {
        Ok(Self {
            id: r.read_u32()?,
            value: r.read_f64()?,
        })
    }

    fn encode_key(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
        w.write_u32(self.id)
    }

    fn decode_key(r: &mut CdrReader<'_>) -> SerResult<Self> {
        Ok(Self {
            id: r.read_u32()?,
            value: 0.0,
        })
    }

    fn loan_size() -> Option<usize> {
        Some(12)
    }

    fn store_loan(&self, buf: &mut [u8]) -> SerResult<()> {
        if buf.len() < 12 {
            return Err(SerError::EncoderFailed {
                reason: "loan too small".into(),
            });
        }
        buf[..4].copy_from_slice(&self.id.to_le_bytes());
        buf[4..12].copy_from_slice(&self.value.to_le_bytes());
        Ok(())
    }

    fn load_loan(buf: &[u8]) -> SerResult<Self> {
        if buf.len() < 12 {
            return Err(SerError::DecoderFailed {
                reason: "loan too small".into(),
            });
        }
        let mut id = [0u8; 4];
        id.copy_from_slice(&buf[..4]);
        let mut value = [0u8; 8];
        value.copy_from_slice(&buf[4..12]);
        Ok(Self {
            id: u32::from_le_bytes(id),
            value: f64::from_le_bytes(value),
        })
    }
}

/// Variable (string) key.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub name: String,
    pub level: u32,
}

impl Label {
    pub fn new(name: &str, level: u32) -> Self {
        Self {
            name: name.to_string(),
            level,
        }
    }
}

impl DDS for Label {
    const TYPE_NAME: &'static str = "test::Label";
    const KEY_LAYOUT: KeyLayout = KeyLayout::Variable;

    fn encode(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
        w.write_string(&self.name)?;
        w.write_u32(self.level)
    }

    fn decode(r: &mut CdrReader<'_>) -> SerResult<Self> {
        Ok(Self {
            name: r.read_string()?,
            level: r.read_u32()?,
        })
    }

    fn encode_key(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
        w.write_string(&self.name)
    }

    fn decode_key(r: &mut CdrReader<'_>) -> SerResult<Self> {
        Ok(Self {
            name: r.read_string()?,
            level: 0,
        })
    }
}

/// Same layout as [`Label`] under another name.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelV2 {
    pub tag: String,
    pub rev: u32,
}

impl DDS for LabelV2 {
    const TYPE_NAME: &'static str = "test::LabelV2";
    const KEY_LAYOUT: KeyLayout = KeyLayout::Variable;

    fn encode(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
        w.write_string(&self.tag)?;
        w.write_u32(self.rev)
    }

    fn decode(r: &mut CdrReader<'_>) -> SerResult<Self> {
        Ok(Self {
            tag: r.read_string()?,
            rev: r.read_u32()?,
        })
    }

    fn encode_key(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
        w.write_string(&self.tag)
    }

    fn decode_key(r: &mut CdrReader<'_>) -> SerResult<Self> {
        Ok(Self {
            tag: r.read_string()?,
            rev: 0,
        })
    }
}

/// Fixed key of 20 bytes, too wide to be carried literally.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub ids: [u32; 5],
    pub speed: u32,
}

impl DDS for Track {
    const TYPE_NAME: &'static str = "test::Track";
    const KEY_LAYOUT: KeyLayout = KeyLayout::Fixed;

    fn encode(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
        self.encode_key(w)?;
        w.write_u32(self.speed)
    }

    fn decode(r: &mut CdrReader<'_>) -> SerResult<Self> {
        let mut track = Self::decode_key(r)?;
        track.speed = r.read_u32()?;
        Ok(track)
    }

    fn encode_key(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
        self.ids.iter().try_for_each(|id| w.write_u32(*id))
    }

    fn decode_key(r: &mut CdrReader<'_>) -> SerResult<Self> {
        let mut ids = [0u32; 5];
        for id in &mut ids {
            *id = r.read_u32()?;
        }
        Ok(Self { ids, speed: 0 })
    }
}

/// Keyless byte sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob(pub Vec<u8>);

impl DDS for Blob {
    const TYPE_NAME: &'static str = "test::Blob";

    fn encode(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
        w.write_seq_len(self.0.len())?;
        w.write_bytes(&self.0)
    }

    fn decode(r: &mut CdrReader<'_>) -> SerResult<Self> {
        let len = r.read_seq_len(1)?;
        Ok(Self(r.read_bytes(len)?.to_vec()))
    }
}
