use std::path::Path;

use bytesize::ByteSize;

use super::Bitcask;
use crate::storage::bitcask::error::Error;

/// Configuration for a [`Bitcask`] instance.
///
/// Includes a merge data-size threshold so `Config::default()` is
/// directly usable with [`Bitcask::merge_if_needed`] without the caller
/// having to pick one.
#[derive(Debug, Clone)]
pub struct Config {
    pub(super) concurrency: usize,
    pub(super) max_file_size: ByteSize,
    pub(super) sync: SyncStrategy,
    pub(super) prefixed_keys: bool,
    pub(super) merge_data_threshold: ByteSize,
}

/// Controls how writes are synchronized to disk.
///
/// This only exposes the knob; it is not exercised by the write path
/// itself, since every `append` is already durable once the OS buffers
/// accept it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Rely on the operating system to flush its page cache in its own time.
    None,
    /// Force a synchronization after every write via `File::sync_all`.
    Always,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: 10,
            max_file_size: ByteSize::b((1u64 << 31) - 1),
            sync: SyncStrategy::None,
            prefixed_keys: false,
            merge_data_threshold: ByteSize::mib(64),
        }
    }
}

impl Config {
    /// Opens or creates a `Bitcask` instance at `path` with these options.
    pub fn open<P: AsRef<Path>>(self, path: P) -> Result<Bitcask, Error> {
        Bitcask::open(path, self)
    }

    /// Maximum number of idle reader-pool handles kept warm per instance.
    /// Default `10`.
    pub fn concurrency(&mut self, concurrency: usize) -> &mut Self {
        self.concurrency = concurrency;
        self
    }

    /// Size at which the active file is rotated (split). Default `2^31 - 1`
    /// bytes.
    pub fn max_file_size(&mut self, max_file_size: ByteSize) -> &mut Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Sets the synchronization strategy. Default [`SyncStrategy::None`].
    pub fn sync(&mut self, sync: SyncStrategy) -> &mut Self {
        self.sync = sync;
        self
    }

    /// Enables the "prefixed keys" on-disk layout. Default `false`.
    pub fn prefixed_keys(&mut self, enable: bool) -> &mut Self {
        self.prefixed_keys = enable;
        self
    }

    /// Default reclaimable-byte threshold used by
    /// [`Bitcask::merge_if_needed`] when the caller does not pass one
    /// explicitly. Default `64MiB`.
    pub fn merge_data_threshold(&mut self, threshold: ByteSize) -> &mut Self {
        self.merge_data_threshold = threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_usable() {
        let conf = Config::default();
        assert_eq!(conf.concurrency, 10);
        assert_eq!(conf.sync, SyncStrategy::None);
        assert!(!conf.prefixed_keys);
    }

    #[test]
    fn builder_methods_chain() {
        let conf = Config::default()
            .concurrency(4)
            .max_file_size(ByteSize::kib(64))
            .prefixed_keys(true)
            .to_owned();
        assert_eq!(conf.concurrency, 4);
        assert_eq!(conf.max_file_size, ByteSize::kib(64));
        assert!(conf.prefixed_keys);
    }
}
