// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Local delivery: hand a datum to every in-process reader of a writer.
//!
//! Readers are visited in GUID order. A full reader is retried every
//! `retry_interval` until the writer's max blocking time, counted from the
//! first failure of the whole fan-out, has passed; the call then fails with
//! `Error::Timeout`. Readers served before the timeout keep their sample.

use super::matched::ReaderList;
use crate::core::guid::GUID;
use crate::core::retry::{Backoff, RetryBudget};
use crate::core::serdata::Serdata;
use crate::core::tkmap::{InstanceMap, InstanceToken};
use crate::core::types::same_type;
use crate::dds::reader::{LocalReader, StoreOutcome, WriterInfo};
use crate::dds::{Error, Result};
use std::borrow::Cow;
use std::time::Duration;

pub(super) struct LocalDelivery<'a> {
    pub writer: GUID,
    pub instances: &'a InstanceMap,
    pub max_blocking_time: Duration,
    pub retry_interval: Duration,
}

impl LocalDelivery<'_> {
    /// Deliver `datum` (instance `tk`) to `readers`; returns how many stored it.
    pub(super) fn run(&self, readers: &ReaderList, datum: &Serdata, tk: &InstanceToken) -> Result<usize> {
        let info = WriterInfo::of(self.writer, datum);
        let mut backoff = Backoff::new(
            RetryBudget::Deadline(self.max_blocking_time),
            self.retry_interval,
        );
        let mut stored = 0;
        for reader in readers.iter() {
            let Some((sample, instance)) = self.make_sample(reader.as_ref(), datum, tk) else {
                continue;
            };
            loop {
                match reader.store(&sample, &instance, &info) {
                    StoreOutcome::Stored => {
                        stored += 1;
                        break;
                    }
                    StoreOutcome::Rejected => break,
                    StoreOutcome::Full => {
                        if backoff.wait().is_err() {
                            log::error!(
                                "[local] writer could not deliver data on time, probably due to a local reader resources being full"
                            );
                            return Err(Error::Timeout);
                        }
                    }
                }
            }
        }
        Ok(stored)
    }

    /// Datum and instance token as seen by `reader`.
    ///
    /// Readers of the datum's own type share the writer's token; others get
    /// a converted datum and their own lookup. `None` skips the reader.
    fn make_sample<'d>(
        &self,
        reader: &dyn LocalReader,
        datum: &'d Serdata,
        tk: &'d InstanceToken,
    ) -> Option<(Cow<'d, Serdata>, Cow<'d, InstanceToken>)> {
        let target = reader.ser_type();
        if datum.ser_type().is_some_and(|t| same_type(t, target)) {
            return Some((Cow::Borrowed(datum), Cow::Borrowed(tk)));
        }
        let converted = match datum.ref_as_type(target) {
            Ok(d) => d,
            Err(e) => {
                log::warn!(
                    "[local] deserialization {} failed in type conversion: {}",
                    target.type_name(),
                    e
                );
                return None;
            }
        };
        match self.instances.acquire(&converted) {
            Ok(instance) => Some((Cow::Owned(converted), Cow::Owned(instance))),
            Err(e) => {
                log::warn!(
                    "[local] no instance for {} sample: {}",
                    target.type_name(),
                    e
                );
                None
            }
        }
    }
}
