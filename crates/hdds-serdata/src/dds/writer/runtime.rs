// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::deliver::LocalDelivery;
use super::loan::{acquire_chunk, Loan, LoanTable};
use super::matched::{AddressSet, LocalReaders};
use super::WriteAction;
use crate::core::guid::GUID;
use crate::core::serdata::{convert_for_writer, Serdata, StatusInfo};
use crate::core::time::Timestamp;
use crate::core::tkmap::InstanceMap;
use crate::core::types::{CdrType, SampleKind, SerType, DDS};
use crate::dds::filter::TopicFilter;
use crate::dds::qos::WriterQos;
use crate::dds::reader::LocalReader;
use crate::dds::{Error, Result};
use crate::transport::shm::{ChunkHeader, ShmChunk, ShmPublisherRef};
use crate::transport::TransmitQueue;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// State guarded by the writer lock.
#[derive(Debug, Default)]
pub(crate) struct WriterState {
    pub(super) network: AddressSet,
    pub(super) loans: LoanTable,
}

#[derive(Default)]
pub(super) struct Counters {
    writes: AtomicU64,
    filtered: AtomicU64,
    lazy_publishes: AtomicU64,
    enqueued: AtomicU64,
    shm_publishes: AtomicU64,
    shm_fallbacks: AtomicU64,
    local_deliveries: AtomicU64,
    timeouts: AtomicU64,
}

impl Counters {
    fn inc(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }
}

/// Counters of a [`DataWriter`].
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterStats {
    /// Write calls that passed the filter.
    pub writes: u64,
    /// Samples dropped by the topic filter.
    pub filtered: u64,
    /// Writes published through shared memory without serializing.
    pub lazy_publishes: u64,
    /// Datums handed to the transmit queue.
    pub enqueued: u64,
    /// Chunks published on the eager path.
    pub shm_publishes: u64,
    /// Writes that could not get a chunk and went the network way.
    pub shm_fallbacks: u64,
    /// Samples stored by local readers.
    pub local_deliveries: u64,
    /// Local deliveries abandoned after the max blocking time.
    pub timeouts: u64,
}

/// A typed writer publishing samples of `T`.
///
/// Built with [`WriterBuilder`](super::WriterBuilder). All methods take
/// `&self`; a writer can be shared between threads.
///
/// # Example
///
/// ```rust,ignore
/// let writer = WriterBuilder::<Temperature>::new("sensors/temp", ty).build()?;
/// writer.write(&Temperature { sensor_id: 1, value: 21.0 })?;
/// writer.dispose(&Temperature { sensor_id: 1, value: 0.0 })?;
/// ```
///
/// # Errors
///
/// - `BadParameter`: negative timestamp, sample that cannot be serialized
/// - `Timeout`: a local reader stayed full past the max blocking time
/// - `Unsupported`: loan API without shared memory, or no path left at all
/// - `PreconditionNotMet`: loan not lent by this writer
pub struct DataWriter<T: DDS> {
    pub(super) guid: GUID,
    pub(super) topic: String,
    pub(super) qos: WriterQos,
    pub(super) ser_type: Arc<CdrType<T>>,
    pub(super) erased_type: Arc<dyn SerType>,
    pub(super) filter: TopicFilter<T>,
    pub(super) transmit: Option<Arc<dyn TransmitQueue>>,
    /// Set only when the writer may use shared memory (volatile, loanable).
    pub(super) shm: Option<ShmPublisherRef>,
    pub(super) loan_size: usize,
    pub(super) instances: InstanceMap,
    pub(super) state: Arc<Mutex<WriterState>>,
    pub(super) local: LocalReaders,
    pub(super) shm_attempts: u32,
    pub(super) shm_interval: Duration,
    pub(super) local_retry_interval: Duration,
    pub(super) counters: Counters,
}

enum Source<'a, T: DDS> {
    Sample(&'a T),
    Loan(Loan<T>),
}

/// How one write reaches its readers.
enum Route {
    /// Shared-memory subscribers only: publish the chunk as is.
    Lazy(ShmChunk),
    /// Serialize for the network; publish the chunk as well if there is one.
    Eager(Option<ShmChunk>),
}

impl<T: DDS> DataWriter<T> {
    pub fn guid(&self) -> GUID {
        self.guid
    }

    pub fn topic_name(&self) -> &str {
        &self.topic
    }

    pub fn qos(&self) -> &WriterQos {
        &self.qos
    }

    pub fn ser_type(&self) -> &Arc<CdrType<T>> {
        &self.ser_type
    }

    pub fn instances(&self) -> &InstanceMap {
        &self.instances
    }

    /// Whether writes may go through shared memory.
    pub fn uses_shm(&self) -> bool {
        self.shm.is_some()
    }

    #[must_use]
    pub fn stats(&self) -> WriterStats {
        let c = &self.counters;
        WriterStats {
            writes: c.writes.load(Ordering::Relaxed),
            filtered: c.filtered.load(Ordering::Relaxed),
            lazy_publishes: c.lazy_publishes.load(Ordering::Relaxed),
            enqueued: c.enqueued.load(Ordering::Relaxed),
            shm_publishes: c.shm_publishes.load(Ordering::Relaxed),
            shm_fallbacks: c.shm_fallbacks.load(Ordering::Relaxed),
            local_deliveries: c.local_deliveries.load(Ordering::Relaxed),
            timeouts: c.timeouts.load(Ordering::Relaxed),
        }
    }

    // ------------------------------------------------------------------
    // Matching
    // ------------------------------------------------------------------

    /// Add a network reader to the address set.
    pub fn match_network_reader(&self, reader: GUID) -> bool {
        let added = self.state.lock().network.insert(reader);
        if added {
            log::debug!("[writer] {} matched network reader {}", self.guid, reader);
        }
        added
    }

    pub fn unmatch_network_reader(&self, reader: &GUID) -> bool {
        self.state.lock().network.remove(reader)
    }

    pub fn network_reader_count(&self) -> usize {
        self.state.lock().network.len()
    }

    /// Add an in-process reader; a reader with the same GUID is replaced.
    pub fn match_local_reader(&self, reader: Arc<dyn LocalReader>) {
        log::debug!(
            "[writer] {} matched local reader {} ({})",
            self.guid,
            reader.guid(),
            reader.ser_type().type_name()
        );
        self.local.insert(reader);
    }

    pub fn unmatch_local_reader(&self, reader: &GUID) -> bool {
        self.local.remove(reader)
    }

    pub fn local_reader_count(&self) -> usize {
        self.local.len()
    }

    // ------------------------------------------------------------------
    // Write API
    // ------------------------------------------------------------------

    /// Publish `sample` stamped with the current time.
    pub fn write(&self, sample: &T) -> Result<()> {
        self.write_impl(Source::Sample(sample), Timestamp::now(), WriteAction::WRITE)
    }

    /// Publish `sample` with a caller-supplied source timestamp (>= 0).
    pub fn write_ts(&self, sample: &T, timestamp: Timestamp) -> Result<()> {
        self.write_impl(Source::Sample(sample), timestamp, WriteAction::WRITE)
    }

    /// Publish `sample` and dispose its instance.
    pub fn write_dispose(&self, sample: &T) -> Result<()> {
        self.write_dispose_ts(sample, Timestamp::now())
    }

    pub fn write_dispose_ts(&self, sample: &T, timestamp: Timestamp) -> Result<()> {
        self.write_impl(Source::Sample(sample), timestamp, WriteAction::WRITE_DISPOSE)
    }

    /// Dispose the instance identified by the key fields of `sample`.
    pub fn dispose(&self, sample: &T) -> Result<()> {
        self.dispose_ts(sample, Timestamp::now())
    }

    pub fn dispose_ts(&self, sample: &T, timestamp: Timestamp) -> Result<()> {
        self.write_impl(Source::Sample(sample), timestamp, WriteAction::DISPOSE_INSTANCE)
    }

    /// Unregister the instance identified by the key fields of `sample`.
    pub fn unregister_instance(&self, sample: &T) -> Result<()> {
        self.unregister_instance_ts(sample, Timestamp::now())
    }

    pub fn unregister_instance_ts(&self, sample: &T, timestamp: Timestamp) -> Result<()> {
        self.write_impl(Source::Sample(sample), timestamp, WriteAction::UNREGISTER_INSTANCE)
    }

    /// Publish a sample built in place in a loan from [`loan_sample`](Self::loan_sample).
    pub fn write_loan(&self, loan: Loan<T>) -> Result<()> {
        self.write_loan_ts(loan, Timestamp::now())
    }

    pub fn write_loan_ts(&self, loan: Loan<T>, timestamp: Timestamp) -> Result<()> {
        self.write_impl(Source::Loan(loan), timestamp, WriteAction::WRITE)
    }

    /// Publish a pre-built datum, resetting its status flags and stamping it
    /// with the current time. Refused on a filtered topic.
    pub fn write_encoded(&self, mut datum: Serdata) -> Result<()> {
        self.check_unfiltered()?;
        datum.set_statusinfo(StatusInfo::empty());
        datum.set_timestamp(Timestamp::now());
        self.count(&self.counters.writes, 1);
        self.deliver(datum, None)
    }

    /// Publish a pre-built datum keeping its status flags and timestamp.
    pub fn forward_encoded(&self, datum: Serdata) -> Result<()> {
        self.check_unfiltered()?;
        self.count(&self.counters.writes, 1);
        self.deliver(datum, None)
    }

    /// Send everything batched in the transmit queue now.
    pub fn flush(&self) {
        if let Some(xmit) = &self.transmit {
            xmit.flush(true);
        }
    }

    // ------------------------------------------------------------------
    // Loans
    // ------------------------------------------------------------------

    /// Borrow a shared-memory sample to fill in place.
    pub fn loan_sample(&self) -> Result<Loan<T>> {
        let Some(publisher) = &self.shm else {
            return Err(Error::Unsupported);
        };
        let chunk = acquire_chunk(
            publisher.as_ref(),
            self.loan_size,
            self.shm_attempts,
            self.shm_interval,
        )
        .ok_or_else(|| Error::Error("could not obtain a shared-memory chunk".to_string()))?;

        let mut state = self.state.lock();
        if !state.loans.register(chunk.id()) {
            drop(state);
            publisher.release(chunk);
            return Err(Error::OutOfResources(format!(
                "writer {} already has {} outstanding loans",
                self.guid,
                crate::config::MAX_PUB_LOANS
            )));
        }
        Ok(Loan::new(chunk, Arc::downgrade(&self.state)))
    }

    /// Give loans back without publishing them.
    ///
    /// Stops at the first empty entry (`BadParameter`) or the first loan this
    /// writer did not lend (`PreconditionNotMet`). Returned entries are
    /// cleared, so the first non-empty entry marks where it stopped.
    pub fn return_loan(&self, loans: &mut [Option<Loan<T>>]) -> Result<()> {
        let Some(publisher) = &self.shm else {
            return Err(Error::Unsupported);
        };
        let mut state = self.state.lock();
        for entry in loans.iter_mut() {
            let Some(loan) = entry.as_ref() else {
                return Err(Error::BadParameter("empty loan entry".to_string()));
            };
            if !state.loans.deregister(loan.id()) {
                return Err(Error::PreconditionNotMet(format!(
                    "chunk {} was not loaned by writer {}",
                    loan.id().as_u64(),
                    self.guid
                )));
            }
            if let Some(chunk) = entry.take().and_then(Loan::into_chunk) {
                publisher.release(chunk);
            }
        }
        Ok(())
    }

    /// Loans handed out and not yet written or returned.
    pub fn outstanding_loans(&self) -> usize {
        self.state.lock().loans.len()
    }

    // ------------------------------------------------------------------
    // Write path
    // ------------------------------------------------------------------

    fn write_impl(&self, source: Source<'_, T>, timestamp: Timestamp, action: WriteAction) -> Result<()> {
        if timestamp.as_nanos() < 0 {
            return Err(Error::BadParameter(format!(
                "negative timestamp {}",
                timestamp.as_nanos()
            )));
        }

        let loaded;
        let sample: &T = match &source {
            Source::Sample(sample) => *sample,
            Source::Loan(loan) => {
                loaded = loan
                    .get()
                    .map_err(|e| Error::BadParameter(format!("unreadable loan: {}", e)))?;
                &loaded
            }
        };

        // 1. Topic filter (key-only writes are never filtered)
        if !action.is_key() && !self.filter.accepts(sample) {
            self.count(&self.counters.filtered, 1);
            log::trace!("[writer] {} sample rejected by topic filter", self.guid);
            return Ok(());
        }
        self.count(&self.counters.writes, 1);

        // 2. Loan check
        let chunk = match source {
            Source::Loan(loan) => Some(self.take_loan(loan)?),
            Source::Sample(sample) => self.chunk_for(sample),
        };
        if self.shm.is_some() && chunk.is_none() && self.transmit.is_none() {
            return Err(Error::Unsupported);
        }

        // 3. Reader check
        let no_network_readers = self.state.lock().network.is_empty();
        let route = match chunk {
            Some(chunk) if no_network_readers => {
                debug_assert!(self.qos.durability.is_volatile());
                Route::Lazy(chunk)
            }
            chunk => Route::Eager(chunk),
        };

        // 4. Serialize, 5. Deliver
        let kind = if action.is_key() {
            SampleKind::Key
        } else {
            SampleKind::Data
        };
        match route {
            Route::Lazy(chunk) => self.publish_lazy(chunk, kind, timestamp, action.statusinfo()),
            Route::Eager(chunk) => {
                let mut datum = Serdata::from_sample(&self.ser_type, kind, sample).map_err(|e| {
                    log::debug!("[writer] {} cannot serialize sample: {}", self.guid, e);
                    Error::Error(format!("cannot serialize sample: {}", e))
                })?;
                datum.set_statusinfo(action.statusinfo());
                datum.set_timestamp(timestamp);
                self.deliver(datum, chunk)
            }
        }
    }

    /// Chunk holding a copy of `sample`, `None` to use the network path.
    fn chunk_for(&self, sample: &T) -> Option<ShmChunk> {
        let publisher = self.shm.as_ref()?;
        let Some(mut chunk) = acquire_chunk(
            publisher.as_ref(),
            self.loan_size,
            self.shm_attempts,
            self.shm_interval,
        ) else {
            self.count(&self.counters.shm_fallbacks, 1);
            log::debug!(
                "[writer] {} no shared-memory chunk, falling back to network path",
                self.guid
            );
            return None;
        };
        if let Err(e) = sample.store_loan(chunk.payload_mut()) {
            self.count(&self.counters.shm_fallbacks, 1);
            log::debug!(
                "[writer] {} cannot copy sample into chunk ({}), falling back to network path",
                self.guid,
                e
            );
            publisher.release(chunk);
            return None;
        }
        Some(chunk)
    }

    /// Chunk of a loan lent by this writer.
    fn take_loan(&self, loan: Loan<T>) -> Result<ShmChunk> {
        if self.shm.is_none() {
            return Err(Error::Unsupported);
        }
        let registered = self.state.lock().loans.deregister(loan.id());
        if !registered {
            return Err(Error::PreconditionNotMet(format!(
                "chunk {} was not loaned by writer {}",
                loan.id().as_u64(),
                self.guid
            )));
        }
        loan.into_chunk()
            .ok_or_else(|| Error::Error("loan holds no chunk".to_string()))
    }

    fn publish_lazy(
        &self,
        chunk: ShmChunk,
        kind: SampleKind,
        timestamp: Timestamp,
        statusinfo: StatusInfo,
    ) -> Result<()> {
        let Some(publisher) = &self.shm else {
            return Err(Error::Unsupported);
        };
        let mut datum = Serdata::from_loan(&self.erased_type, kind, chunk).map_err(|e| {
            log::debug!("[writer] {} cannot key loaned sample: {}", self.guid, e);
            Error::Error(format!("cannot build datum from loan: {}", e))
        })?;
        datum.set_statusinfo(statusinfo);
        datum.set_timestamp(timestamp);
        let stamp = self.chunk_header(&datum);
        let mut chunk = datum
            .into_loan_chunk()
            .map_err(|_| Error::Error("loaned chunk is still shared".to_string()))?;
        let header = chunk.header_mut();
        *header = ChunkHeader {
            data_size: header.data_size,
            ..stamp
        };
        publisher.publish(chunk)?;
        self.count(&self.counters.lazy_publishes, 1);
        Ok(())
    }

    /// Eager delivery of `din`: transmit queue, shared memory, local readers.
    fn deliver(&self, din: Serdata, chunk: Option<ShmChunk>) -> Result<()> {
        let datum = convert_for_writer(&self.erased_type, din).map_err(|e| {
            Error::Error(format!(
                "cannot convert datum to {}: {}",
                self.erased_type.type_name(),
                e
            ))
        })?;
        let tk = self.instances.acquire(&datum)?;

        if let Some(xmit) = &self.transmit {
            xmit.enqueue(&self.guid, datum.clone(), &tk)?;
            self.count(&self.counters.enqueued, 1);
            if !self.qos.batching {
                xmit.flush(false);
            }
        }

        if let Some(chunk) = chunk {
            if self.publish_chunk(chunk, &datum) {
                // in-process subscribers get it through the segment
                return Ok(());
            }
        }

        let readers = self.local.snapshot();
        if readers.is_empty() {
            return Ok(());
        }
        let delivery = LocalDelivery {
            writer: self.guid,
            instances: &self.instances,
            max_blocking_time: self.qos.reliability.max_blocking_time,
            retry_interval: self.local_retry_interval,
        };
        match delivery.run(&readers, &datum, &tk) {
            Ok(stored) => {
                self.count(&self.counters.local_deliveries, stored as u64);
                Ok(())
            }
            Err(e) => {
                if matches!(e, Error::Timeout) {
                    self.count(&self.counters.timeouts, 1);
                }
                Err(e)
            }
        }
    }

    fn publish_chunk(&self, mut chunk: ShmChunk, datum: &Serdata) -> bool {
        let Some(publisher) = &self.shm else {
            return false;
        };
        let stamp = self.chunk_header(datum);
        let header = chunk.header_mut();
        *header = ChunkHeader {
            data_size: header.data_size,
            ..stamp
        };
        match publisher.publish(chunk) {
            Ok(()) => {
                self.count(&self.counters.shm_publishes, 1);
                true
            }
            Err(e) => {
                log::debug!("[writer] {} shared-memory publish failed: {}", self.guid, e);
                false
            }
        }
    }

    fn chunk_header(&self, datum: &Serdata) -> ChunkHeader {
        ChunkHeader {
            writer: self.guid,
            timestamp: datum.timestamp(),
            statusinfo: datum.statusinfo(),
            kind: datum.kind(),
            keyhash: datum.get_keyhash(false),
            data_size: 0,
        }
    }

    fn check_unfiltered(&self) -> Result<()> {
        if self.filter.is_active() {
            return Err(Error::Error(format!(
                "topic '{}' has a content filter; encoded writes are not allowed",
                self.topic
            )));
        }
        Ok(())
    }

    #[inline]
    fn count(&self, counter: &AtomicU64, n: u64) {
        Counters::inc(counter, n);
    }
}

impl<T: DDS> fmt::Debug for DataWriter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataWriter")
            .field("guid", &self.guid)
            .field("topic", &self.topic)
            .field("type", &T::TYPE_NAME)
            .field("shm", &self.shm.is_some())
            .field("local_readers", &self.local.len())
            .finish()
    }
}
