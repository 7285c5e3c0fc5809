//! Ingestion metrics

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Counters updated by the adapter and the ingestion worker
#[derive(Debug, Default)]
pub struct IngestMetrics {
    pub sequences_received: AtomicU64,
    pub sequences_processed: AtomicU64,
    pub sequences_failed: AtomicU64,
    pub samples_appended: AtomicU64,
}

/// Point-in-time copy of [`IngestMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub sequences_received: u64,
    pub sequences_processed: u64,
    pub sequences_failed: u64,
    pub samples_appended: u64,
}

impl IngestMetrics {
    pub fn record_received(&self) {
        self.sequences_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_processed(&self, samples: u64) {
        self.sequences_processed.fetch_add(1, Ordering::Relaxed);
        self.samples_appended.fetch_add(samples, Ordering::Relaxed);
    }

    /// A failed sequence may still have appended samples before aborting
    pub fn record_failed(&self, samples: u64) {
        self.sequences_failed.fetch_add(1, Ordering::Relaxed);
        self.samples_appended.fetch_add(samples, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sequences_received: self.sequences_received.load(Ordering::Relaxed),
            sequences_processed: self.sequences_processed.load(Ordering::Relaxed),
            sequences_failed: self.sequences_failed.load(Ordering::Relaxed),
            samples_appended: self.samples_appended.load(Ordering::Relaxed),
        }
    }
}
