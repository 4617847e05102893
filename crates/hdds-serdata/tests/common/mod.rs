// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sample types and collaborators shared by the integration tests.

#![allow(dead_code)]

use hdds_serdata::core::ser::{CdrReader, CdrWriter, SerError, SerResult};
use hdds_serdata::transport::{OutboundMessage, PacketSink};
use hdds_serdata::{KeyLayout, SerdataConfig, SerdataPool, DDS};
use std::sync::{Arc, Mutex};

pub fn pool() -> Arc<SerdataPool> {
    Arc::new(SerdataPool::new(&SerdataConfig::default()))
}

/// Fixed `u32` key; loanable with a 16-byte footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub sensor: u32,
    pub seq: u32,
    pub value: f64,
}

impl Reading {
    pub fn new(sensor: u32, seq: u32, value: f64) -> Self {
        Self { sensor, seq, value }
    }
}

impl DDS for Reading {
    const TYPE_NAME: &'static str = "it::Reading";
    const KEY_LAYOUT: KeyLayout = KeyLayout::Fixed;

    fn encode(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
        w.write_u32(self.sensor)?;
        w.write_u32(self.seq)?;
        w.write_f64(self.value)
    }

    fn decode(r: &mut CdrReader<'_>) -> SerResult<Self> {
        Ok(Self {
            sensor: r.read_u32()?,
            seq: r.read_u32()?,
            value: r.read_f64()?,
        })
    }

    fn encode_key(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
        w.write_u32(self.sensor)
    }

    fn decode_key(r: &mut CdrReader<'_>) -> SerResult<Self> {
        Ok(Self::new(r.read_u32()?, 0, 0.0))
    }

    fn loan_size() -> Option<usize> {
        Some(16)
    }

    fn store_loan(&self, buf: &mut [u8]) -> SerResult<()> {
        if buf.len() < 16 {
            return Err(SerError::EncoderFailed {
                reason: "loan too small".into(),
            });
        }
        buf[0..4].copy_from_slice(&self.sensor.to_ne_bytes());
        buf[4..8].copy_from_slice(&self.seq.to_ne_bytes());
        buf[8..16].copy_from_slice(&self.value.to_ne_bytes());
        Ok(())
    }

    fn load_loan(buf: &[u8]) -> SerResult<Self> {
        if buf.len() < 16 {
            return Err(SerError::DecoderFailed {
                reason: "loan too small".into(),
            });
        }
        let u32_at = |at: usize| u32::from_ne_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]);
        let mut value = [0u8; 8];
        value.copy_from_slice(&buf[8..16]);
        Ok(Self::new(u32_at(0), u32_at(4), f64::from_ne_bytes(value)))
    }
}

/// Variable (string) key.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub topic: String,
    pub body: String,
    pub priority: u16,
}

impl Note {
    pub fn new(topic: &str, body: &str, priority: u16) -> Self {
        Self {
            topic: topic.to_string(),
            body: body.to_string(),
            priority,
        }
    }
}

impl DDS for Note {
    const TYPE_NAME: &'static str = "it::Note";
    const KEY_LAYOUT: KeyLayout = KeyLayout::Variable;

    fn encode(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
        w.write_string(&self.topic)?;
        w.write_string(&self.body)?;
        w.write_u16(self.priority)
    }

    fn decode(r: &mut CdrReader<'_>) -> SerResult<Self> {
        Ok(Self {
            topic: r.read_string()?,
            body: r.read_string()?,
            priority: r.read_u16()?,
        })
    }

    fn encode_key(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
        w.write_string(&self.topic)
    }

    fn decode_key(r: &mut CdrReader<'_>) -> SerResult<Self> {
        Ok(Self::new(&r.read_string()?, "", 0))
    }
}

/// Records every batch handed to it.
#[derive(Default)]
pub struct RecordingSink {
    batches: Mutex<Vec<Vec<OutboundMessage>>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.batches
            .lock()
            .expect("sink lock")
            .iter()
            .flatten()
            .cloned()
            .collect()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.lock().expect("sink lock").len()
    }
}

impl PacketSink for RecordingSink {
    fn send_batch(&self, batch: &[OutboundMessage]) -> std::io::Result<()> {
        self.batches.lock().expect("sink lock").push(batch.to_vec());
        Ok(())
    }
}

/// Keyless sample whose encoding fails unless `valid` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Faulty {
    pub valid: bool,
}

impl DDS for Faulty {
    const TYPE_NAME: &'static str = "it::Faulty";

    fn encode(&self, w: &mut CdrWriter<'_>) -> SerResult<()> {
        if !self.valid {
            return Err(SerError::EncoderFailed {
                reason: "sample refuses to encode".into(),
            });
        }
        w.write_u32(1)
    }

    fn decode(r: &mut CdrReader<'_>) -> SerResult<Self> {
        r.read_u32()?;
        Ok(Self { valid: true })
    }
}
