//! An implementation of [Bitcask](https://riak.com/assets/bitcask-intro.pdf):
//! an append-only log with an in-memory index, a pooled random-access read
//! path, file rotation, and a merge (compaction) subsystem that reclaims
//! space from overwritten and deleted records.

mod codec;
mod config;
mod error;
mod index;
mod io;
mod merger;
mod reader_pool;
mod utils;

use std::{
    io::{BufWriter, Write},
    path::Path,
    sync::Arc,
    time::SystemTime,
};

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, instrument};

pub use self::{
    config::{Config, SyncStrategy},
    error::{Error, Result},
};
use self::{
    index::{Index, IndexEntry},
    io::Io,
    merger::Merger,
};
use super::KeyValueStorage;

/// A Bitcask instance: a directory of append-only data files plus the
/// in-memory index built over them.
///
/// Operations are not performed directly on this struct; instead it hands
/// out [`Handle`]s, cheap to clone, that threads use to read and write
/// concurrently. The instance's lifetime is tied to this struct - dropping
/// it releases the directory lock, though any `Handle`s cloned out of it
/// remain individually usable until they too are dropped.
pub struct Bitcask {
    handle: Handle,
}

/// A cloneable handle to a [`Bitcask`] instance. All storage operations
/// are methods on `Handle`.
#[derive(Clone)]
pub struct Handle {
    ctx: Arc<Context>,
    /// Serializes the compound put/delete sequence (append, index update,
    /// reclaim bookkeeping) so that concurrent writers' index updates land
    /// in the same order as their underlying appends.
    append_lock: Arc<Mutex<()>>,
    /// Serializes merge runs against each other. Put/delete never take
    /// this, so writes to the active file proceed during a merge.
    merge_lock: Arc<Mutex<()>>,
}

struct Context {
    conf: Config,
    io: Io,
    index: Index,
    merger: Merger,
    /// Guards the moment a merge target file's on-disk meaning changes.
    /// `get` holds a read guard across its index lookup *and* its disk
    /// read so it never reads post-rename bytes through a pre-rename
    /// index entry or vice versa; merge takes the write guard across its
    /// index-install step and the delete-and-rename that follows it, so
    /// no reader can observe a new index entry before the file it points
    /// at actually holds that data.
    index_lock: RwLock<()>,
}

/// A point-in-time view of per-file reclaim accounting and merge history,
/// useful for deciding when to call [`Handle::merge_if_needed`] and for
/// tests that assert on compaction behavior.
#[derive(Debug, Clone)]
pub struct Stats {
    pub files: Vec<FileStats>,
    pub live_keys: usize,
    pub merges_count: u64,
    pub last_merged: Option<SystemTime>,
}

/// Reclaim accounting for one data file.
#[derive(Debug, Clone)]
pub struct FileStats {
    pub file_name: String,
    pub reclaimable_entries: u64,
    pub reclaimable_bytes: u64,
}

impl Bitcask {
    fn open<P: AsRef<Path>>(path: P, conf: Config) -> Result<Self> {
        let io = Io::open(&path, conf.concurrency)?;
        let index = Index::new();
        rebuild(&io, conf.prefixed_keys, &index)?;
        info!(dir = ?io.dir(), keys = index.len(), "opened bitcask store");

        let ctx = Arc::new(Context {
            conf,
            io,
            index,
            merger: Merger::new(),
            index_lock: RwLock::new(()),
        });
        let handle = Handle {
            ctx,
            append_lock: Arc::new(Mutex::new(())),
            merge_lock: Arc::new(Mutex::new(())),
        };
        Ok(Self { handle })
    }

    /// Returns a cloneable handle for performing operations on this store.
    pub fn get_handle(&self) -> Handle {
        self.handle.clone()
    }

    /// Closes the store. Equivalent to dropping it; provided as a named
    /// operation for callers that want one.
    pub fn close(self) {
        drop(self);
    }

    /// Closes the store and removes its entire directory from disk.
    pub fn destroy(self) -> Result<()> {
        let dir = self.handle.ctx.io.dir().to_path_buf();
        drop(self);
        std::fs::remove_dir_all(dir)?;
        Ok(())
    }
}

impl KeyValueStorage for Handle {
    type Error = Error;

    fn get(&self, key: Bytes) -> Result<Option<Bytes>> {
        self.get(key)
    }

    fn set(&self, key: Bytes, value: Bytes) -> Result<()> {
        self.put(key, value)
    }

    fn del(&self, key: Bytes) -> Result<bool> {
        self.delete(key)
    }
}

impl Handle {
    /// Sets `key` to `value`, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `key` is empty, `value` is
    /// empty, or either size bound is exceeded (checked against the
    /// on-disk key length when "prefixed keys" mode is enabled), before
    /// any disk write happens. Otherwise propagates I/O errors from the
    /// append.
    pub fn put(&self, key: Bytes, value: Bytes) -> Result<()> {
        codec::validate_sizes(&key, &value, self.ctx.conf.prefixed_keys)?;
        let _guard = self.append_lock.lock();
        self.write_record(key, Some(value))
    }

    /// Deletes `key`. Returns `true` if it was present.
    ///
    /// Deleting an absent key is treated as a no-op rather than writing a
    /// tombstone for a key nobody has seen, so it never leaks disk space
    /// for deletes of keys that were never there (see `DESIGN.md`).
    pub fn delete(&self, key: Bytes) -> Result<bool> {
        let _guard = self.append_lock.lock();
        if !self.ctx.index.contains(&key) {
            return Ok(false);
        }
        self.write_record(key, None)?;
        Ok(true)
    }

    #[instrument(level = "debug", skip(self, key, value))]
    fn write_record(&self, key: Bytes, value: Option<Bytes>) -> Result<()> {
        let on_disk_key: Bytes = if self.ctx.conf.prefixed_keys {
            codec::apply_key_prefix(&key)
        } else {
            key.clone()
        };
        let payload = value.as_deref().unwrap_or(&[]);
        let (file_name, pos, length, timestamp) = self.ctx.io.append(&on_disk_key, payload)?;
        let new_entry = IndexEntry {
            file_name,
            pos,
            length,
            timestamp,
        };

        match value {
            Some(_) => {
                if let Some(prev) = self.ctx.index.put(key, new_entry) {
                    self.ctx.merger.add_reclaim(&prev.file_name, prev.length);
                }
            }
            None => {
                if let Some(prev) = self.ctx.index.remove(&key) {
                    self.ctx.merger.add_reclaim(&prev.file_name, prev.length);
                }
                // The tombstone itself is garbage the moment it lands;
                // it only has to survive until the next merge of "0".
                self.ctx.merger.add_reclaim(&new_entry.file_name, new_entry.length);
            }
        }

        if self.ctx.io.active_len() > self.ctx.conf.max_file_size.as_u64() {
            let renamed = self.ctx.io.split()?;
            debug!(renamed, "rotated active file");
        }
        Ok(())
    }

    /// Fetches the current value for `key`, if any.
    pub fn get(&self, key: Bytes) -> Result<Option<Bytes>> {
        let _guard = self.ctx.index_lock.read();
        let Some(entry) = self.ctx.index.get(&key) else {
            return Ok(None);
        };
        let decoded = self.ctx.io.read(&entry)?;
        if decoded.value.is_empty() {
            return Ok(None);
        }
        Ok(Some(decoded.value))
    }

    /// A snapshot of every key currently present.
    pub fn keys(&self) -> Vec<Bytes> {
        self.ctx.index.keys()
    }

    /// A snapshot of every value currently present, in no particular
    /// order relative to [`Self::keys`].
    pub fn values(&self) -> Result<Vec<Bytes>> {
        let _guard = self.ctx.index_lock.read();
        self.ctx
            .index
            .entries()
            .into_iter()
            .map(|(_, entry)| Ok(self.ctx.io.read(&entry)?.value))
            .collect()
    }

    /// Runs a merge over every inactive file, oldest to newest. A no-op if
    /// fewer than one inactive file exists.
    pub fn force_merge(&self) -> Result<()> {
        let _merge_guard = self.merge_lock.lock();
        let mut ids = self.ctx.io.inactive_fileids()?;
        ids.sort_unstable();
        if ids.is_empty() {
            return Ok(());
        }
        let files: Vec<String> = ids.into_iter().map(|id| id.to_string()).collect();
        self.merge_files(&files)
    }

    /// Runs a merge over the inactive files whose reclaimable bytes exceed
    /// the configured merge data threshold, if more than one such file
    /// exists. Returns whether a merge ran.
    pub fn merge_if_needed(&self) -> Result<bool> {
        let _merge_guard = self.merge_lock.lock();
        let threshold = self.ctx.conf.merge_data_threshold.as_u64();
        let mut candidates = self.ctx.merger.files_over_threshold(threshold);
        if candidates.len() <= 1 {
            return Ok(false);
        }
        candidates.sort_by_key(|name| name.parse::<u64>().unwrap_or(u64::MAX));
        self.merge_files(&candidates)?;
        Ok(true)
    }

    /// Rewrites the live entries of `files` (ascending numeric order, the
    /// smallest being the merge target) into a single new file, persists a
    /// hint file alongside it, and removes the other source files.
    ///
    /// The target is deleted before the temp file is renamed into its
    /// place, since the target itself is usually among the files being
    /// rewritten.
    #[instrument(level = "debug", skip(self, files))]
    fn merge_files(&self, files: &[String]) -> Result<()> {
        let target = files[0].clone();
        debug!(target, n_files = files.len(), "starting merge");

        let mut temp_writer = BufWriter::new(self.ctx.io.create_merge_temp(&target)?);
        let mut temp_pos: u64 = 0;
        let mut staged: Vec<(Bytes, IndexEntry, u32, Bytes)> = Vec::new();

        for file in files {
            let mut collected = Vec::new();
            self.ctx.io.scan(file, |pos, entry| collected.push((pos, entry)))?;
            for (pos, entry) in collected {
                if entry.value.is_empty() {
                    continue;
                }
                let logical = io::logical_key(self.ctx.conf.prefixed_keys, entry.key.clone());
                if !self.ctx.index.has_entry(&logical, file, pos) {
                    continue;
                }
                let record = codec::encode_data(entry.timestamp, &entry.key, &entry.value);
                let record_len = record.len() as u64;
                temp_writer.write_all(&record)?;
                staged.push((
                    logical,
                    IndexEntry {
                        file_name: target.clone(),
                        pos: temp_pos,
                        length: record_len,
                        timestamp: entry.timestamp,
                    },
                    entry.value.len() as u32,
                    entry.key,
                ));
                temp_pos += record_len;
            }
        }
        temp_writer.flush()?;
        drop(temp_writer);

        // Everything that changes what a concurrent `get` can observe for a
        // key touched by this merge - the index install *and* the physical
        // swap that makes the renamed target file actually hold the data the
        // new index entries point at - must happen under one exclusive
        // guard. `get` holds the matching read guard across its own lookup
        // and disk read, so without this a reader could see an index entry
        // already pointing at `target` while `target` on disk still held its
        // pre-merge bytes (the rename hadn't happened yet).
        let mut installed: Vec<(IndexEntry, u32, Bytes)> = Vec::new();
        {
            let _index_guard = self.ctx.index_lock.write();
            for (logical, new_entry, value_size, raw_key) in staged {
                if self.ctx.index.install_if_in(&logical, files, new_entry.clone()) {
                    installed.push((new_entry, value_size, raw_key));
                }
            }
            for file in files.iter().filter(|f| **f != target) {
                self.ctx.io.delete_hint_file(file)?;
                self.ctx.io.delete_data_file(file)?;
            }
            self.ctx.io.delete_data_file(&target)?;
            self.ctx.io.finish_merge(&target)?;
            for file in files {
                self.ctx.merger.forget(file);
            }
        }

        // The hint file is a startup-recovery accelerator only - nothing
        // reads it while this process is running - so it is safe to write
        // after the lock above is released.
        let mut hint_writer = BufWriter::new(self.ctx.io.create_hint_file(&target)?);
        for (new_entry, value_size, raw_key) in &installed {
            let hint = codec::encode_hint(new_entry.timestamp, raw_key, *value_size, new_entry.pos as u32);
            hint_writer.write_all(&hint)?;
        }
        hint_writer.flush()?;
        drop(hint_writer);

        self.ctx.merger.record_merge();
        debug!(target, "finished merge");
        Ok(())
    }

    /// A snapshot of per-file reclaim accounting and merge history.
    pub fn stats(&self) -> Stats {
        let files = self
            .ctx
            .merger
            .snapshot()
            .into_iter()
            .map(|(file_name, delta)| FileStats {
                file_name,
                reclaimable_entries: delta.entries,
                reclaimable_bytes: delta.length,
            })
            .collect();
        Stats {
            files,
            live_keys: self.ctx.index.len(),
            merges_count: self.ctx.merger.merges_count(),
            last_merged: self.ctx.merger.last_merged(),
        }
    }
}

/// Rebuilds `index` from `io`'s directory: hint files where present, full
/// scans otherwise, and finally the active file `"0"` - which never has a
/// hint and, having kept accumulating writes across restarts, holds the
/// most recent data of any file even though it sorts numerically first.
///
/// A naive ascending-file-number scan order would visit `"0"` first,
/// which is wrong whenever the store has ever rotated: a rotated file's
/// contents are, by construction, *older* than whatever is still
/// accumulating in `"0"`. This scans the inactive files in ascending
/// numeric order and `"0"` last, so "later file wins" actually means
/// "chronologically later" (see `DESIGN.md`).
fn rebuild(io: &Io, prefixed_keys: bool, index: &Index) -> Result<()> {
    let mut ids = io.inactive_fileids()?;
    ids.sort_unstable();
    let mut names: Vec<String> = ids.into_iter().map(|id| id.to_string()).collect();
    names.push(utils::ACTIVE_FILE_NAME.to_string());

    for name in names {
        if let Some(hints) = io.read_hint_file(&name)? {
            for hint in hints {
                let on_disk_key_len = hint.key.len() as u64;
                let key = io::logical_key(prefixed_keys, hint.key);
                let length = codec::DATA_HEADER_SIZE as u64 + on_disk_key_len + hint.value_size as u64;
                index.put(
                    key,
                    IndexEntry {
                        file_name: name.clone(),
                        pos: hint.pos as u64,
                        length,
                        timestamp: hint.timestamp,
                    },
                );
            }
            continue;
        }

        let (outcome, end_pos) = io.scan(&name, |pos, entry| {
            let key = io::logical_key(prefixed_keys, entry.key.clone());
            if entry.value.is_empty() {
                index.remove(&key);
            } else {
                let length = codec::DATA_HEADER_SIZE as u64
                    + entry.key.len() as u64
                    + entry.value.len() as u64;
                index.put(
                    key,
                    IndexEntry {
                        file_name: name.clone(),
                        pos,
                        length,
                        timestamp: entry.timestamp,
                    },
                );
            }
        })?;

        if outcome == io::ScanOutcome::Truncated {
            debug!(file = name, end_pos, "tolerating torn tail record");
            io.truncate_to(&name, end_pos)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use bytesize::ByteSize;
    use proptest::{collection, prelude::*};

    use super::*;

    fn open(conf: Config, dir: &Path) -> Handle {
        conf.open(dir).unwrap().get_handle()
    }

    #[test]
    fn basic_put_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let kv = open(Config::default(), dir.path());

        kv.put(Bytes::from_static(b"foo"), Bytes::from_static(b"bar")).unwrap();
        kv.put(Bytes::from_static(b"baz"), Bytes::from_static(b"boo")).unwrap();

        assert_eq!(kv.get(Bytes::from_static(b"foo")).unwrap(), Some(Bytes::from_static(b"bar")));
        assert_eq!(kv.get(Bytes::from_static(b"baz")).unwrap(), Some(Bytes::from_static(b"boo")));
        let mut keys = kv.keys();
        keys.sort();
        assert_eq!(keys, vec![Bytes::from_static(b"baz"), Bytes::from_static(b"foo")]);
        assert_eq!(kv.values().unwrap().len(), 2);

        assert!(kv.delete(Bytes::from_static(b"foo")).unwrap());
        assert_eq!(kv.get(Bytes::from_static(b"foo")).unwrap(), None);
        assert_eq!(kv.keys(), vec![Bytes::from_static(b"baz")]);
    }

    #[test]
    fn overwrite_rotation_and_merge() {
        let dir = tempfile::tempdir().unwrap();
        let kv = open(Config::default().max_file_size(ByteSize::b(1)).to_owned(), dir.path());

        kv.put(Bytes::from_static(b"k"), Bytes::from_static(b"v1")).unwrap();
        kv.put(Bytes::from_static(b"k"), Bytes::from_static(b"v2")).unwrap();
        kv.put(Bytes::from_static(b"k"), Bytes::from_static(b"v3")).unwrap();
        kv.put(Bytes::from_static(b"k"), Bytes::from_static(b"v4")).unwrap();

        assert_eq!(kv.get(Bytes::from_static(b"k")).unwrap(), Some(Bytes::from_static(b"v4")));
        kv.force_merge().unwrap();
        assert_eq!(kv.get(Bytes::from_static(b"k")).unwrap(), Some(Bytes::from_static(b"v4")));

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .filter(|n| n != ".lock")
            .collect();
        names.sort();
        // One merged target data file, its hint file, and the active "0".
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"0".to_string()));
        assert!(names.iter().any(|n| n.ends_with('h')));
    }

    #[test]
    fn tombstone_survives_until_merge() {
        let dir = tempfile::tempdir().unwrap();
        {
            let kv = open(Config::default(), dir.path());
            kv.put(Bytes::from_static(b"k"), Bytes::from_static(b"v")).unwrap();
            kv.delete(Bytes::from_static(b"k")).unwrap();
        }
        let kv = open(Config::default(), dir.path());
        assert_eq!(kv.get(Bytes::from_static(b"k")).unwrap(), None);

        kv.force_merge().unwrap();
        drop(kv);
        let kv = open(Config::default(), dir.path());
        assert_eq!(kv.get(Bytes::from_static(b"k")).unwrap(), None);
    }

    #[test]
    fn corruption_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        {
            let kv = open(Config::default(), dir.path());
            kv.put(Bytes::from_static(b"k"), Bytes::from_static(b"hello")).unwrap();
        }

        let path = dir.path().join("0");
        let mut bytes = std::fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        std::fs::write(&path, bytes).unwrap();

        let kv = open(Config::default(), dir.path());
        let err = kv.get(Bytes::from_static(b"k")).unwrap_err();
        assert!(matches!(err, Error::Corrupt { .. }));
    }

    #[test]
    fn truncated_tail_recovery() {
        let dir = tempfile::tempdir().unwrap();
        {
            let kv = open(Config::default(), dir.path());
            kv.put(Bytes::from_static(b"k"), Bytes::from_static(b"v")).unwrap();
        }

        let path = dir.path().join("0");
        let full = std::fs::read(&path).unwrap();
        std::fs::write(&path, &full[..7]).unwrap();

        let kv = open(Config::default(), dir.path());
        assert_eq!(kv.get(Bytes::from_static(b"k")).unwrap(), None);
        kv.put(Bytes::from_static(b"k"), Bytes::from_static(b"w")).unwrap();
        assert_eq!(kv.get(Bytes::from_static(b"k")).unwrap(), Some(Bytes::from_static(b"w")));
    }

    #[test]
    fn concurrent_writers_disjoint_keys() {
        let dir = tempfile::tempdir().unwrap();
        let kv = open(Config::default(), dir.path());

        std::thread::scope(|scope| {
            for t in 0..8 {
                let kv = kv.clone();
                scope.spawn(move || {
                    for i in 0..1000 {
                        let key = Bytes::from(format!("t{t}-k{i}"));
                        let value = Bytes::from(format!("t{t}-v{i}"));
                        kv.put(key, value).unwrap();
                    }
                });
            }
        });

        assert_eq!(kv.keys().len(), 8000);
        for t in 0..8 {
            for i in 0..1000 {
                let key = Bytes::from(format!("t{t}-k{i}"));
                let want = Bytes::from(format!("t{t}-v{i}"));
                assert_eq!(kv.get(key).unwrap(), Some(want));
            }
        }
    }

    #[test]
    fn rotation_keeps_prior_entries_readable() {
        let dir = tempfile::tempdir().unwrap();
        let kv = open(Config::default().max_file_size(ByteSize::b(1)).to_owned(), dir.path());

        for i in 0..200 {
            let key = Bytes::from(format!("key{i}"));
            let value = Bytes::from(format!("value{i}"));
            kv.put(key, value).unwrap();
        }
        assert!(dir.path().join("1").exists());

        for i in 0..200 {
            let key = Bytes::from(format!("key{i}"));
            let want = Bytes::from(format!("value{i}"));
            assert_eq!(kv.get(key).unwrap(), Some(want));
        }
    }

    #[test]
    fn rebuild_after_reopen_matches_prior_state() {
        let dir = tempfile::tempdir().unwrap();
        let conf = Config::default().max_file_size(ByteSize::kib(1)).to_owned();
        {
            let kv = open(conf.clone(), dir.path());
            for i in 0..2000 {
                kv.put(Bytes::from(format!("key{i}")), Bytes::from(format!("value{i}"))).unwrap();
            }
            for i in 0..1000 {
                kv.put(Bytes::from(format!("key{i}")), Bytes::from(format!("updated{i}"))).unwrap();
            }
        }

        let kv = open(conf, dir.path());
        assert_eq!(kv.keys().len(), 2000);
        for i in 0..1000 {
            let want = Bytes::from(format!("updated{i}"));
            assert_eq!(kv.get(Bytes::from(format!("key{i}"))).unwrap(), Some(want));
        }
        for i in 1000..2000 {
            let want = Bytes::from(format!("value{i}"));
            assert_eq!(kv.get(Bytes::from(format!("key{i}"))).unwrap(), Some(want));
        }
    }

    #[test]
    fn merge_preserves_state_and_shrinks_storage() {
        let dir = tempfile::tempdir().unwrap();
        let kv = open(Config::default().max_file_size(ByteSize::kib(1)).to_owned(), dir.path());

        for i in 0..500 {
            kv.put(Bytes::from(format!("key{i}")), Bytes::from(format!("value{i}"))).unwrap();
        }
        for i in 0..500 {
            kv.put(Bytes::from(format!("key{i}")), Bytes::from(format!("overwritten{i}"))).unwrap();
        }

        let before: u64 = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().metadata().unwrap().len())
            .sum();
        let keys_before = kv.keys().len();

        kv.force_merge().unwrap();

        let after: u64 = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().metadata().unwrap().len())
            .sum();

        assert_eq!(kv.keys().len(), keys_before);
        assert!(after <= before);
        for i in 0..500 {
            let want = Bytes::from(format!("overwritten{i}"));
            assert_eq!(kv.get(Bytes::from(format!("key{i}"))).unwrap(), Some(want));
        }
    }

    #[test]
    fn delete_of_absent_key_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let kv = open(Config::default(), dir.path());
        assert!(!kv.delete(Bytes::from_static(b"never-written")).unwrap());
        assert!(kv.keys().is_empty());
    }

    #[test]
    fn prefixed_keys_mode_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let kv = open(Config::default().prefixed_keys(true).to_owned(), dir.path());
        kv.put(Bytes::from_static(b"k"), Bytes::from_static(b"v")).unwrap();
        assert_eq!(kv.get(Bytes::from_static(b"k")).unwrap(), Some(Bytes::from_static(b"v")));
        assert_eq!(kv.keys(), vec![Bytes::from_static(b"k")]);
    }

    proptest! {
        #[test]
        fn round_trip_and_last_writer_wins(
            key in collection::vec(any::<u8>(), 1..64),
            v1 in collection::vec(any::<u8>(), 1..256),
            v2 in collection::vec(any::<u8>(), 1..256),
        ) {
            let dir = tempfile::tempdir().unwrap();
            let kv = open(Config::default(), dir.path());
            let key = Bytes::from(key);

            kv.put(key.clone(), Bytes::from(v1.clone())).unwrap();
            prop_assert_eq!(kv.get(key.clone()).unwrap(), Some(Bytes::from(v1)));

            kv.put(key.clone(), Bytes::from(v2.clone())).unwrap();
            prop_assert_eq!(kv.get(key.clone()).unwrap(), Some(Bytes::from(v2)));

            prop_assert!(kv.delete(key.clone()).unwrap());
            prop_assert_eq!(kv.get(key).unwrap(), None);
        }
    }
}
