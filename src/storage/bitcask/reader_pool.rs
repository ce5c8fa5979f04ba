//! A bounded cache of random-access file handles, keyed by absolute path.
//!
//! Readers check a handle out, use it exclusively, and check it back in.
//! This gives every in-flight read its own file cursor, so concurrent
//! reads never observe interleaved seeks from one another, without
//! needing a lock around the read itself. When the pool
//! already holds an idle handle for a path on release, the extra one is
//! simply closed rather than grown without bound; when it is empty for a
//! path, [`ReaderPool::acquire`] opens a fresh handle.
//!
//! Capacity bounds the number of distinct *paths* kept warm, least-
//! recently-used first, not the number of handles in flight.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use lru::LruCache;
use parking_lot::Mutex;

use super::error::Result;

pub struct ReaderPool {
    idle: Mutex<LruCache<PathBuf, File>>,
}

impl std::fmt::Debug for ReaderPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderPool").finish_non_exhaustive()
    }
}

impl ReaderPool {
    /// Creates a pool that keeps at most `capacity` idle handles warm.
    /// `capacity` of zero is treated as one, so the pool is never unusable.
    pub fn new(capacity: usize) -> Self {
        let cap = std::num::NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            idle: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Checks out a handle for `path`, opening a new one if none is idle.
    pub fn acquire(&self, path: &Path) -> Result<File> {
        if let Some(file) = self.idle.lock().pop(path) {
            return Ok(file);
        }
        Ok(File::open(path)?)
    }

    /// Returns a handle previously obtained from [`Self::acquire`]. If the
    /// pool is already holding the maximum number of distinct paths, the
    /// least-recently-used entry (which may or may not be this one) is
    /// closed to make room.
    pub fn release(&self, path: &Path, file: File) {
        self.idle.lock().put(path.to_path_buf(), file);
    }

    /// Drops any idle handle cached for `path`. Called after the file is
    /// deleted (merge, or test teardown) so the pool never hands out a
    /// handle to a file that no longer exists.
    pub fn invalidate(&self, path: &Path) {
        self.idle.lock().pop(path);
    }
}
