//! Query metrics.
//!
//! Enable the `metrics` feature to record them. Every metric carries a
//! `keyspace` label.
//!
//! - `indexbox_query_find_total` - executed `find` queries
//! - `indexbox_query_find_duration_seconds` - `find` latency
//! - `indexbox_query_count_total` - executed `count` queries
//! - `indexbox_query_missing_entities_total` - ids skipped because their hash was gone

use std::time::Duration;

#[cfg(feature = "metrics")]
use std::time::Instant;

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

use indexbox_core::Keyspace;

/// Zero-cost timer for metrics collection.
///
/// Captures the start time only when the `metrics` feature is enabled.
pub struct Timer {
    #[cfg(feature = "metrics")]
    start: Instant,
}

impl Timer {
    /// Create a new timer.
    #[inline]
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "metrics")]
            start: Instant::now(),
        }
    }

    /// Elapsed time since creation, `Duration::ZERO` without the feature.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        #[cfg(feature = "metrics")]
        {
            self.start.elapsed()
        }
        #[cfg(not(feature = "metrics"))]
        {
            Duration::ZERO
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "metrics")]
lazy_static! {
    /// Metric name for executed find queries.
    pub static ref QUERY_FIND_TOTAL: &'static str = {
        metrics::describe_counter!(
            "indexbox_query_find_total",
            "Total number of executed find queries."
        );
        "indexbox_query_find_total"
    };

    /// Metric name for find query latency.
    pub static ref QUERY_FIND_DURATION: &'static str = {
        metrics::describe_histogram!(
            "indexbox_query_find_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of find queries in seconds."
        );
        "indexbox_query_find_duration_seconds"
    };

    /// Metric name for executed count queries.
    pub static ref QUERY_COUNT_TOTAL: &'static str = {
        metrics::describe_counter!(
            "indexbox_query_count_total",
            "Total number of executed count queries."
        );
        "indexbox_query_count_total"
    };

    /// Metric name for ids whose entity hash was missing at fetch time.
    pub static ref QUERY_MISSING_ENTITIES: &'static str = {
        metrics::describe_counter!(
            "indexbox_query_missing_entities_total",
            "Total number of indexed ids skipped because their hash was missing."
        );
        "indexbox_query_missing_entities_total"
    };
}

/// Record a finished find query.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_find(keyspace: &Keyspace, duration: Duration, missing: usize) {
    let keyspace = keyspace.to_string();
    metrics::counter!(*QUERY_FIND_TOTAL, "keyspace" => keyspace.clone()).increment(1);
    metrics::histogram!(*QUERY_FIND_DURATION, "keyspace" => keyspace.clone())
        .record(duration.as_secs_f64());
    if missing > 0 {
        metrics::counter!(*QUERY_MISSING_ENTITIES, "keyspace" => keyspace)
            .increment(missing as u64);
    }
}

/// No-op when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_find(_keyspace: &Keyspace, _duration: Duration, _missing: usize) {}

/// Record a finished count query.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_count(keyspace: &Keyspace) {
    metrics::counter!(*QUERY_COUNT_TOTAL, "keyspace" => keyspace.to_string()).increment(1);
}

/// No-op when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_count(_keyspace: &Keyspace) {}
