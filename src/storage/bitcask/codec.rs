//! Pure encode/decode functions for one data or hint record.
//!
//! All multi-byte integers are big-endian. A data record on disk is:
//!
//! ```text
//! | crc32 (4) | timestamp (4) | key_size (2) | value_size (4) | key | value |
//! ```
//!
//! A hint record (sidecar to a merged file) carries the same bookkeeping
//! minus the value payload, plus the position of the corresponding data
//! record:
//!
//! ```text
//! | timestamp (4) | key_size (2) | value_size (4) | pos (4) | key |
//! ```

use bytes::{Bytes, BytesMut};

use super::error::{Error, Result};

/// Size in bytes of a data record's fixed header.
pub const DATA_HEADER_SIZE: usize = 14;

/// Size in bytes of a hint record's fixed header (everything but the key).
pub const HINT_HEADER_SIZE: usize = 14;

/// Largest key size this codec can address (`2^16 - 1`, bounded by the
/// 16-bit `key_size` field).
pub const MAX_KEY_SIZE: usize = u16::MAX as usize;

/// Largest value size this codec can address (`2^31 - 1`, kept within a
/// signed 32-bit range even though `value_size` is encoded unsigned).
pub const MAX_VALUE_SIZE: usize = i32::MAX as usize;

/// The decoded header of a data record, before the key/value bytes are read.
#[derive(Debug, Clone, Copy)]
pub struct DataHeader {
    pub crc: u32,
    pub timestamp: u32,
    pub key_size: u16,
    pub value_size: u32,
}

impl DataHeader {
    /// Total length of the record this header describes, header included.
    pub fn record_len(&self) -> u64 {
        DATA_HEADER_SIZE as u64 + self.key_size as u64 + self.value_size as u64
    }

    /// `true` when this header describes a tombstone (deletion marker).
    pub fn is_tombstone(&self) -> bool {
        self.value_size == 0
    }
}

/// A fully decoded and CRC-verified data record.
#[derive(Debug, Clone)]
pub struct DataEntry {
    pub timestamp: u32,
    pub key: Bytes,
    /// Empty iff this entry is a tombstone.
    pub value: Bytes,
}

/// Validates that `key` and `value` fall within the bounds this codec can
/// represent on disk.
///
/// `prefixed_keys` must match the store's configured on-disk layout: when
/// enabled, the key actually written is longer than `key` by
/// [`prefixed_key_overhead`], and it is that on-disk length - not the
/// logical one - that has to fit in the 16-bit `key_size` field.
pub fn validate_sizes(key: &[u8], value: &[u8], prefixed_keys: bool) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidArgument("key must not be empty".into()));
    }
    if value.is_empty() {
        return Err(Error::InvalidArgument("value must not be empty".into()));
    }
    let on_disk_key_len = key.len() + if prefixed_keys { prefixed_key_overhead(key.len()) } else { 0 };
    if on_disk_key_len > MAX_KEY_SIZE {
        return Err(Error::InvalidArgument(format!(
            "key of {} bytes (on disk: {on_disk_key_len}) exceeds the maximum of {MAX_KEY_SIZE}",
            key.len()
        )));
    }
    if value.len() > MAX_VALUE_SIZE {
        return Err(Error::InvalidArgument(format!(
            "value of {} bytes exceeds the maximum of {MAX_VALUE_SIZE}",
            value.len()
        )));
    }
    Ok(())
}

/// Encodes one data record (or a tombstone, when `value` is empty).
///
/// Caller must have already validated sizes with [`validate_sizes`].
pub fn encode_data(timestamp: u32, key: &[u8], value: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(DATA_HEADER_SIZE + key.len() + value.len());
    buf.resize(DATA_HEADER_SIZE, 0);
    buf[4..8].copy_from_slice(&timestamp.to_be_bytes());
    buf[8..10].copy_from_slice(&(key.len() as u16).to_be_bytes());
    buf[10..14].copy_from_slice(&(value.len() as u32).to_be_bytes());
    buf.extend_from_slice(key);
    buf.extend_from_slice(value);

    let crc = crc32fast::hash(&buf[4..]);
    buf[0..4].copy_from_slice(&crc.to_be_bytes());
    buf.freeze()
}

/// Decodes the fixed-size header of a data record.
///
/// Returns [`Error::Truncated`] if `buf` is shorter than [`DATA_HEADER_SIZE`].
pub fn decode_header(file: &str, pos: u64, buf: &[u8]) -> Result<DataHeader> {
    if buf.len() < DATA_HEADER_SIZE {
        return Err(Error::Truncated {
            file: file.to_string(),
            pos,
        });
    }
    let crc = u32::from_be_bytes(buf[0..4].try_into().unwrap());
    let timestamp = u32::from_be_bytes(buf[4..8].try_into().unwrap());
    let key_size = u16::from_be_bytes(buf[8..10].try_into().unwrap());
    let value_size = u32::from_be_bytes(buf[10..14].try_into().unwrap());
    Ok(DataHeader {
        crc,
        timestamp,
        key_size,
        value_size,
    })
}

/// Decodes and CRC-verifies a complete record buffer (header, key, and
/// value all present). `buf` must be exactly `header.record_len()` bytes.
pub fn verify_and_decode(file: &str, pos: u64, buf: &[u8]) -> Result<DataEntry> {
    let header = decode_header(file, pos, buf)?;
    let want_len = header.record_len() as usize;
    if buf.len() < want_len {
        return Err(Error::Truncated {
            file: file.to_string(),
            pos,
        });
    }
    let crc = crc32fast::hash(&buf[4..want_len]);
    if crc != header.crc {
        return Err(Error::Corrupt {
            file: file.to_string(),
            pos,
        });
    }
    let key_start = DATA_HEADER_SIZE;
    let key_end = key_start + header.key_size as usize;
    let value_end = key_end + header.value_size as usize;
    Ok(DataEntry {
        timestamp: header.timestamp,
        key: Bytes::copy_from_slice(&buf[key_start..key_end]),
        value: Bytes::copy_from_slice(&buf[key_end..value_end]),
    })
}

/// Number of leading key bytes mirrored into the "prefixed keys" header.
const KEY_PREFIX_LEN: usize = 4;

/// Number of extra bytes [`apply_key_prefix`] adds on top of a logical key
/// of length `key_len`: the one-byte length marker plus the mirrored
/// prefix itself. `validate_sizes` uses this to check the *on-disk* key
/// length against [`MAX_KEY_SIZE`] before a key is ever prefixed, since
/// the 16-bit `key_size` field has to hold the post-prefix length, not the
/// logical one.
pub fn prefixed_key_overhead(key_len: usize) -> usize {
    1 + key_len.min(KEY_PREFIX_LEN)
}

/// Applies the optional "prefixed keys" on-disk layout: a one-byte length
/// marker followed by up to [`KEY_PREFIX_LEN`] bytes
/// copied from the front of `key`, followed by `key` itself. The
/// transform is deterministic (same key always yields the same prefix)
/// and reversible by [`strip_key_prefix`], so callers can filter on-disk
/// key bytes by a fixed-width scan before ever decoding the full key.
/// The index itself always stores logical keys - this is a cosmetic
/// on-disk detail.
pub fn apply_key_prefix(key: &[u8]) -> Bytes {
    let prefix_len = key.len().min(KEY_PREFIX_LEN);
    let mut buf = BytesMut::with_capacity(prefixed_key_overhead(key.len()) + key.len());
    buf.extend_from_slice(&[prefix_len as u8]);
    buf.extend_from_slice(&key[..prefix_len]);
    buf.extend_from_slice(key);
    buf.freeze()
}

/// Reverses [`apply_key_prefix`], returning the logical key.
pub fn strip_key_prefix(bytes: &[u8]) -> Bytes {
    if bytes.is_empty() {
        return Bytes::new();
    }
    let prefix_len = bytes[0] as usize;
    Bytes::copy_from_slice(&bytes[1 + prefix_len..])
}

/// A decoded hint record, as written into a merge target's sidecar hint
/// file.
#[derive(Debug, Clone)]
pub struct HintEntry {
    pub timestamp: u32,
    pub key: Bytes,
    pub value_size: u32,
    pub pos: u32,
}

/// Encodes one hint record.
pub fn encode_hint(timestamp: u32, key: &[u8], value_size: u32, pos: u32) -> Bytes {
    let mut buf = BytesMut::with_capacity(HINT_HEADER_SIZE + key.len());
    buf.resize(HINT_HEADER_SIZE, 0);
    buf[0..4].copy_from_slice(&timestamp.to_be_bytes());
    buf[4..6].copy_from_slice(&(key.len() as u16).to_be_bytes());
    buf[6..10].copy_from_slice(&value_size.to_be_bytes());
    buf[10..14].copy_from_slice(&pos.to_be_bytes());
    buf.extend_from_slice(key);
    buf.freeze()
}

/// Decodes one hint record from the front of `buf`, returning the entry
/// and the number of bytes it consumed.
///
/// Returns `Ok(None)` when `buf` holds a truncated tail shorter than one
/// full header - callers treat this as end-of-file, not an error, since
/// hint files are only ever read during best-effort recovery.
pub fn decode_hint(buf: &[u8]) -> Result<Option<(HintEntry, usize)>> {
    if buf.len() < HINT_HEADER_SIZE {
        return Ok(None);
    }
    let timestamp = u32::from_be_bytes(buf[0..4].try_into().unwrap());
    let key_size = u16::from_be_bytes(buf[4..6].try_into().unwrap());
    let value_size = u32::from_be_bytes(buf[6..10].try_into().unwrap());
    let pos = u32::from_be_bytes(buf[10..14].try_into().unwrap());
    let total = HINT_HEADER_SIZE + key_size as usize;
    if buf.len() < total {
        return Ok(None);
    }
    let key = Bytes::copy_from_slice(&buf[HINT_HEADER_SIZE..total]);
    Ok(Some((
        HintEntry {
            timestamp,
            key,
            value_size,
            pos,
        },
        total,
    )))
}
