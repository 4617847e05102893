// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Topic content filter evaluated by the writer before serialization.

use std::fmt;
use std::sync::Arc;

type SamplePredicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Content filter attached to a writer's topic.
///
/// A rejected sample is dropped and the write still succeeds.
///
/// # Example
///
/// ```
/// use hdds_serdata::dds::TopicFilter;
///
/// let hot = TopicFilter::sample(|t: &f64| *t > 25.0);
/// assert!(hot.accepts(&30.0));
/// assert!(!hot.accepts(&12.5));
/// ```
pub enum TopicFilter<T> {
    /// No filter configured.
    None,
    /// Predicate on the sample value.
    Sample(SamplePredicate<T>),
    /// Filter that needs reader-side sample info; writers cannot evaluate
    /// it and let every sample through.
    SampleInfoOnly,
}

impl<T> TopicFilter<T> {
    pub fn sample(pred: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        TopicFilter::Sample(Arc::new(pred))
    }

    /// Whether a filter is configured at all (encoded writes are refused then).
    pub fn is_active(&self) -> bool {
        !matches!(self, TopicFilter::None)
    }

    pub fn accepts(&self, sample: &T) -> bool {
        match self {
            TopicFilter::None | TopicFilter::SampleInfoOnly => true,
            TopicFilter::Sample(pred) => pred(sample),
        }
    }
}

impl<T> Default for TopicFilter<T> {
    fn default() -> Self {
        TopicFilter::None
    }
}

impl<T> Clone for TopicFilter<T> {
    fn clone(&self) -> Self {
        match self {
            TopicFilter::None => TopicFilter::None,
            TopicFilter::Sample(pred) => TopicFilter::Sample(Arc::clone(pred)),
            TopicFilter::SampleInfoOnly => TopicFilter::SampleInfoOnly,
        }
    }
}

impl<T> fmt::Debug for TopicFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicFilter::None => write!(f, "TopicFilter::None"),
            TopicFilter::Sample(_) => write!(f, "TopicFilter::Sample(..)"),
            TopicFilter::SampleInfoOnly => write!(f, "TopicFilter::SampleInfoOnly"),
        }
    }
}
