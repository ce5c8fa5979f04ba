//! `embercask` is an embedded key-value store organized as an append-only
//! log with an in-memory index, in the style of [Bitcask].
//!
//! The store maps opaque byte-string keys to opaque byte-string values and
//! persists every mutation as a record in a sequence of numbered data files
//! held in a single directory. It favors write throughput and per-write
//! durability over range queries: the full key set (plus a small constant
//! amount of metadata per key) is expected to fit in memory, while the
//! total volume of values may vastly exceed it.
//!
//! [Bitcask]: https://riak.com/assets/bitcask-intro.pdf

pub mod storage;

pub use storage::bitcask::{Bitcask, Config, Error, FileStats, Handle, Result, Stats, SyncStrategy};
pub use storage::KeyValueStorage;
