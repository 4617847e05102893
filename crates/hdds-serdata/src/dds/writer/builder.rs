// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Builder pattern for DataWriter configuration.
//!
//! Collects QoS, topic filter, transport collaborators and tuning before
//! constructing a [`DataWriter`]. Shared memory is only kept when the writer
//! can use it: volatile durability and a loanable type.

use super::matched::LocalReaders;
use super::runtime::{Counters, DataWriter, WriterState};
use crate::config::SerdataConfig;
use crate::core::guid::GUID;
use crate::core::tkmap::InstanceMap;
use crate::core::types::{CdrType, SerType, DDS};
use crate::dds::filter::TopicFilter;
use crate::dds::qos::{ShmPolicy, WriterQos};
use crate::dds::{Error, Result};
use crate::transport::shm::ShmPublisherRef;
use crate::transport::TransmitQueue;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// User-defined writer entity kind (with key).
const ENTITY_KIND_WRITER: u8 = 0x02;

fn next_writer_guid() -> GUID {
    static NEXT_ENTITY: AtomicU32 = AtomicU32::new(1);
    let n = NEXT_ENTITY.fetch_add(1, Ordering::Relaxed).to_be_bytes();
    GUID::new([0; 12], [n[1], n[2], n[3], ENTITY_KIND_WRITER])
}

pub struct WriterBuilder<T: DDS> {
    topic: String,
    ser_type: Arc<CdrType<T>>,
    guid: Option<GUID>,
    qos: WriterQos,
    filter: TopicFilter<T>,
    transmit: Option<Arc<dyn TransmitQueue>>,
    shm: Option<ShmPublisherRef>,
    instances: Option<InstanceMap>,
    config: SerdataConfig,
}

impl<T: DDS> WriterBuilder<T> {
    pub fn new(topic: impl Into<String>, ser_type: Arc<CdrType<T>>) -> Self {
        Self {
            topic: topic.into(),
            ser_type,
            guid: None,
            qos: WriterQos::default(),
            filter: TopicFilter::None,
            transmit: None,
            shm: None,
            instances: None,
            config: SerdataConfig::default(),
        }
    }

    pub fn guid(mut self, guid: GUID) -> Self {
        self.guid = Some(guid);
        self
    }

    pub fn qos(mut self, qos: WriterQos) -> Self {
        self.qos = qos;
        self
    }

    pub fn filter(mut self, filter: TopicFilter<T>) -> Self {
        self.filter = filter;
        self
    }

    /// Network side; without one the writer only reaches shared-memory and
    /// local readers.
    pub fn transmit(mut self, transmit: Arc<dyn TransmitQueue>) -> Self {
        self.transmit = Some(transmit);
        self
    }

    pub fn shm_publisher(mut self, publisher: ShmPublisherRef) -> Self {
        self.shm = Some(publisher);
        self
    }

    /// Instance map shared with the readers of the domain.
    pub fn instances(mut self, instances: InstanceMap) -> Self {
        self.instances = Some(instances);
        self
    }

    pub fn config(mut self, config: SerdataConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<DataWriter<T>> {
        self.config.validate()?;
        let shm = self.resolve_shm()?;
        let guid = self.guid.unwrap_or_else(next_writer_guid);
        let erased_type: Arc<dyn SerType> = Arc::clone(&self.ser_type) as Arc<dyn SerType>;

        log::debug!(
            "[writer] created {} on '{}' type={} durability={:?} shm={} transmit={}",
            guid,
            self.topic,
            T::TYPE_NAME,
            self.qos.durability,
            shm.is_some(),
            self.transmit.is_some()
        );

        let (shm, loan_size) = match shm {
            Some((publisher, size)) => (Some(publisher), size),
            None => (None, 0),
        };
        Ok(DataWriter {
            guid,
            topic: self.topic,
            qos: self.qos,
            ser_type: self.ser_type,
            erased_type,
            filter: self.filter,
            transmit: self.transmit,
            shm,
            loan_size,
            instances: self.instances.unwrap_or_default(),
            state: Arc::new(Mutex::new(WriterState::default())),
            local: LocalReaders::new(),
            shm_attempts: self.config.shm_acquire_attempts,
            shm_interval: self.config.shm_acquire_interval(),
            local_retry_interval: self.config.local_retry_interval(),
            counters: Counters::default(),
        })
    }

    /// Publisher and loan size if shared memory is usable.
    fn resolve_shm(&self) -> Result<Option<(ShmPublisherRef, usize)>> {
        if self.qos.shm == ShmPolicy::Disable {
            return Ok(None);
        }
        let reason = match (&self.shm, T::loan_size()) {
            (None, _) => "no shared-memory publisher attached",
            (Some(_), None) => "type cannot be loaned",
            (Some(_), Some(_)) if !self.qos.durability.is_volatile() => "durability is not volatile",
            (Some(publisher), Some(size)) => return Ok(Some((Arc::clone(publisher), size))),
        };
        if self.qos.shm == ShmPolicy::Require {
            return Err(Error::InvalidQos(format!(
                "shared memory required on '{}' but {}",
                self.topic, reason
            )));
        }
        log::debug!("[writer] '{}' not using shared memory: {}", self.topic, reason);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dds::qos::Durability;
    use crate::testing::{pool, Label, Sensor};
    use crate::transport::shm::ShmSegment;

    fn segment() -> ShmPublisherRef {
        Arc::new(ShmSegment::new("builder", 4, 64).expect("segment"))
    }

    #[test]
    fn test_volatile_loanable_keeps_shm() {
        let w = WriterBuilder::new("t", CdrType::<Sensor>::new(pool()))
            .shm_publisher(segment())
            .build()
            .expect("writer");
        assert!(w.uses_shm());
    }

    #[test]
    fn test_durable_writer_drops_shm() {
        let w = WriterBuilder::new("t", CdrType::<Sensor>::new(pool()))
            .qos(WriterQos::reliable().durability(Durability::TransientLocal))
            .shm_publisher(segment())
            .build()
            .expect("writer");
        assert!(!w.uses_shm());
    }

    #[test]
    fn test_require_fails_for_unloanable_type() {
        let res = WriterBuilder::new("t", CdrType::<Label>::new(pool()))
            .qos(WriterQos::default().shm(ShmPolicy::Require))
            .shm_publisher(segment())
            .build();
        assert!(matches!(res, Err(Error::InvalidQos(_))));
    }

    #[test]
    fn test_disable_ignores_publisher() {
        let w = WriterBuilder::new("t", CdrType::<Sensor>::new(pool()))
            .qos(WriterQos::default().shm(ShmPolicy::Disable))
            .shm_publisher(segment())
            .build()
            .expect("writer");
        assert!(!w.uses_shm());
    }

    #[test]
    fn test_generated_guids_are_distinct() {
        let a = WriterBuilder::new("t", CdrType::<Sensor>::new(pool())).build().expect("a");
        let b = WriterBuilder::new("t", CdrType::<Sensor>::new(pool())).build().expect("b");
        assert_ne!(a.guid(), b.guid());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = SerdataConfig {
            shm_acquire_attempts: 0,
            ..SerdataConfig::default()
        };
        let res = WriterBuilder::new("t", CdrType::<Sensor>::new(pool()))
            .config(cfg)
            .build();
        assert!(matches!(res, Err(Error::Config(_))));
    }
}
