//! Error taxonomy for the storage engine.

use std::io;

use thiserror::Error;

/// Errors returned by the [`Bitcask`](super::Bitcask) storage engine.
#[derive(Error, Debug)]
pub enum Error {
    /// An OS-level read/write/open/rename/delete failure.
    #[error("I/O error - {0}")]
    Io(#[from] io::Error),

    /// A record's CRC did not match its payload.
    ///
    /// Surfaced to the caller; the rest of the store remains usable.
    #[error("corrupt record at {file}:{pos} (crc mismatch)")]
    Corrupt {
        /// Name of the data file holding the record.
        file: String,
        /// Byte offset of the record within that file.
        pos: u64,
    },

    /// A record could not be fully read - its header or payload ran past
    /// the bytes available.
    ///
    /// During recovery and merge this is tolerated as "end of live data";
    /// an indexed read hitting it indicates the file was truncated after
    /// the index was built.
    #[error("truncated record at {file}:{pos}")]
    Truncated {
        /// Name of the data file holding the record.
        file: String,
        /// Byte offset of the record within that file.
        pos: u64,
    },

    /// A key or value violated the size bounds in [`crate::storage::bitcask::codec`].
    #[error("invalid argument - {0}")]
    InvalidArgument(String),

    /// An operation was issued after the store was closed or destroyed.
    ///
    /// `Bitcask::close`/`destroy` consume the owning value, so well-typed
    /// callers can't reach this through it directly; it exists for a
    /// `Handle` cloned out beforehand and used after the owner dropped.
    #[error("storage engine has been closed")]
    Closed,
}

/// A specialized [`Result`](std::result::Result) for Bitcask operations.
pub type Result<T> = std::result::Result<T, Error>;
