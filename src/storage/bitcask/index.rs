//! The in-memory mapping from key to the location of its latest record.

use bytes::Bytes;
use dashmap::{mapref::entry::Entry, DashMap};

/// The location and bookkeeping for the most recent record written for a
/// key. Uniquely identified by `(file_name, pos)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub file_name: String,
    pub pos: u64,
    pub length: u64,
    pub timestamp: u32,
}

/// `key -> IndexEntry`, concurrent and lock-free for single-key operations.
///
/// Keys are unique and iteration order is unspecified. Full snapshots
/// (`keys`/`values`) and the merge install step are the only operations
/// that need more than per-key
/// atomicity; they get it for free from `DashMap`'s sharded locking since
/// this store never needs a single atomic snapshot of the *whole* map -
/// only that each key's entry is internally consistent.
#[derive(Debug, Default)]
pub struct Index {
    entries: DashMap<Bytes, IndexEntry>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &Bytes) -> Option<IndexEntry> {
        self.entries.get(key).map(|e| e.clone())
    }

    /// Installs `entry` for `key`, returning the entry it replaced, if any.
    pub fn put(&self, key: Bytes, entry: IndexEntry) -> Option<IndexEntry> {
        self.entries.insert(key, entry)
    }

    /// Removes `key`, returning its entry if it was present.
    pub fn remove(&self, key: &Bytes) -> Option<IndexEntry> {
        self.entries.remove(key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &Bytes) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` when `key`'s current entry still names exactly `(file_name, pos)`.
    ///
    /// Used by the merger to tell a live record (still referenced by the
    /// index) from one that has since been superseded or deleted.
    pub fn has_entry(&self, key: &Bytes, file_name: &str, pos: u64) -> bool {
        match self.entries.get(key) {
            Some(e) => e.file_name == file_name && e.pos == pos,
            None => false,
        }
    }

    /// Atomically installs `new_entry` for `key` iff the entry currently
    /// there (if any) names a file in `candidate_files`. Returns whether
    /// the install happened.
    ///
    /// Used by the merger's install step: a write that lands for this
    /// key between the merge's scan and its
    /// install phase moves the key's entry to the active file, which is
    /// never in `candidate_files`, so that newer write is never clobbered.
    /// Implemented as a single entry-API operation rather than a separate
    /// get-then-put so the check and the swap are atomic with respect to
    /// concurrent `put`/`delete` on the same key.
    pub fn install_if_in(
        &self,
        key: &Bytes,
        candidate_files: &[String],
        new_entry: IndexEntry,
    ) -> bool {
        match self.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                if candidate_files.contains(&occupied.get().file_name) {
                    occupied.insert(new_entry);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(_) => false,
        }
    }

    /// A snapshot of the keys currently present.
    pub fn keys(&self) -> Vec<Bytes> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }

    /// A snapshot of `(key, entry)` pairs currently present.
    pub fn entries(&self) -> Vec<(Bytes, IndexEntry)> {
        self.entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(file: &str, pos: u64) -> IndexEntry {
        IndexEntry {
            file_name: file.to_string(),
            pos,
            length: 10,
            timestamp: 0,
        }
    }

    #[test]
    fn put_then_get_round_trips() {
        let index = Index::new();
        index.put(Bytes::from_static(b"k"), entry("0", 0));
        assert_eq!(index.get(&Bytes::from_static(b"k")), Some(entry("0", 0)));
    }

    #[test]
    fn remove_clears_the_entry() {
        let index = Index::new();
        let key = Bytes::from_static(b"k");
        index.put(key.clone(), entry("0", 0));
        assert!(index.remove(&key).is_some());
        assert!(!index.contains(&key));
    }

    #[test]
    fn install_if_in_clobbers_only_when_current_file_is_a_candidate() {
        let index = Index::new();
        let key = Bytes::from_static(b"k");
        index.put(key.clone(), entry("1", 0));

        assert!(index.install_if_in(&key, &["1".to_string()], entry("2", 0)));
        assert_eq!(index.get(&key), Some(entry("2", 0)));

        // A concurrent write moved the key to "0"; the merge install must
        // not clobber it even though "2" is still in the candidate set.
        index.put(key.clone(), entry("0", 99));
        assert!(!index.install_if_in(&key, &["1".to_string(), "2".to_string()], entry("3", 0)));
        assert_eq!(index.get(&key), Some(entry("0", 99)));
    }

    #[test]
    fn install_if_in_is_a_noop_for_absent_keys() {
        let index = Index::new();
        let key = Bytes::from_static(b"missing");
        assert!(!index.install_if_in(&key, &["1".to_string()], entry("2", 0)));
        assert!(index.get(&key).is_none());
    }

    #[test]
    fn has_entry_checks_the_exact_location() {
        let index = Index::new();
        let key = Bytes::from_static(b"k");
        index.put(key.clone(), entry("0", 42));
        assert!(index.has_entry(&key, "0", 42));
        assert!(!index.has_entry(&key, "0", 43));
        assert!(!index.has_entry(&key, "1", 42));
    }
}
