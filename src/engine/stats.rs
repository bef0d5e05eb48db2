//! Per-index operation counters

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

/// Counters shared by a store and every snapshot taken from it.
#[derive(Debug, Default)]
pub struct IndexStats {
    searches: AtomicUsize,
    counts: AtomicUsize,
    records_read: AtomicUsize,
    records_written: AtomicUsize,
    deletes: AtomicUsize,
}

/// Point-in-time copy of [`IndexStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IndexStatsSnapshot {
    pub searches: usize,
    pub counts: usize,
    pub records_read: usize,
    pub records_written: usize,
    pub deletes: usize,
}

impl IndexStats {
    pub fn record_search(&self) {
        self.searches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_count(&self) {
        self.counts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_read(&self) {
        self.records_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write(&self) {
        self.records_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> IndexStatsSnapshot {
        IndexStatsSnapshot {
            searches: self.searches.load(Ordering::Relaxed),
            counts: self.counts.load(Ordering::Relaxed),
            records_read: self.records_read.load(Ordering::Relaxed),
            records_written: self.records_written.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.searches.store(0, Ordering::Relaxed);
        self.counts.store(0, Ordering::Relaxed);
        self.records_read.store(0, Ordering::Relaxed);
        self.records_written.store(0, Ordering::Relaxed);
        self.deletes.store(0, Ordering::Relaxed);
    }
}
