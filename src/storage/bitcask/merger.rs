//! Reclaim accounting for the compaction (merge) subsystem.
//!
//! The actual rewrite-and-swap algorithm lives on [`super::Handle`], since
//! it needs the IO layer and the index; this module only tracks, per
//! file, how much of it has become garbage so a caller can decide when a
//! merge is worth running.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::SystemTime,
};

use dashmap::DashMap;
use parking_lot::Mutex;

/// Per-file reclaim accounting: how many records, and how many bytes, have
/// become garbage (overwritten or tombstoned) in that file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Delta {
    pub entries: u64,
    pub length: u64,
}

#[derive(Debug, Default)]
pub struct Merger {
    reclaims: DashMap<String, Delta>,
    merges_count: AtomicU64,
    last_merged: Mutex<Option<SystemTime>>,
}

impl Merger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `length` additional reclaimable bytes in `file`, e.g.
    /// because a put/delete superseded the record that used to live there.
    pub fn add_reclaim(&self, file: &str, length: u64) {
        let mut entry = self.reclaims.entry(file.to_string()).or_default();
        entry.entries += 1;
        entry.length += length;
    }

    pub fn reclaim(&self, file: &str) -> Delta {
        self.reclaims.get(file).map(|e| *e).unwrap_or_default()
    }

    /// Drops the accounting for `file`, e.g. once it has been merged away
    /// or deleted.
    pub fn forget(&self, file: &str) {
        self.reclaims.remove(file);
    }

    /// Files whose reclaimable byte count exceeds `data_threshold`.
    pub fn files_over_threshold(&self, data_threshold: u64) -> Vec<String> {
        self.reclaims
            .iter()
            .filter(|e| e.value().length > data_threshold)
            .map(|e| e.key().clone())
            .collect()
    }

    pub fn record_merge(&self) {
        self.merges_count.fetch_add(1, Ordering::SeqCst);
        *self.last_merged.lock() = Some(SystemTime::now());
    }

    pub fn merges_count(&self) -> u64 {
        self.merges_count.load(Ordering::SeqCst)
    }

    pub fn last_merged(&self) -> Option<SystemTime> {
        *self.last_merged.lock()
    }

    /// A snapshot of the current reclaim table, for [`super::Stats`].
    pub fn snapshot(&self) -> Vec<(String, Delta)> {
        self.reclaims
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_reclaims_per_file() {
        let merger = Merger::new();
        merger.add_reclaim("1", 10);
        merger.add_reclaim("1", 20);
        let delta = merger.reclaim("1");
        assert_eq!(delta.entries, 2);
        assert_eq!(delta.length, 30);
    }

    #[test]
    fn files_over_threshold_filters_correctly() {
        let merger = Merger::new();
        merger.add_reclaim("1", 100);
        merger.add_reclaim("2", 10);
        let over = merger.files_over_threshold(50);
        assert_eq!(over, vec!["1".to_string()]);
    }

    #[test]
    fn forget_clears_accounting() {
        let merger = Merger::new();
        merger.add_reclaim("1", 100);
        merger.forget("1");
        assert_eq!(merger.reclaim("1").length, 0);
    }
}
