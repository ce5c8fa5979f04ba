//! Owns the active file appender, the reader pool, and the directory:
//! append, indexed read, full-file scan, file deletion, and rotation.

use std::{
    fs::{self, File, OpenOptions},
    io::{BufReader, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use bytes::Bytes;
use fs4::FileExt;
use parking_lot::Mutex;
use tracing::debug;

use super::{
    codec::{self, DataEntry},
    error::{Error, Result},
    index::IndexEntry,
    reader_pool::ReaderPool,
    utils,
};

/// The write side of the IO layer: the currently active file and how many
/// bytes have been appended to it so far.
struct Appender {
    file: File,
    name: String,
    len: u64,
}

/// The directory-owning half of the storage engine. `append` and `split`
/// are serialized against each other by [`Io::appender`]; reads proceed
/// concurrently, mediated only by the reader pool.
pub struct Io {
    dir: PathBuf,
    appender: Mutex<Appender>,
    reader_pool: ReaderPool,
    splits: AtomicU64,
    /// Holds an `flock`-style exclusive lock on the directory for the
    /// lifetime of this `Io`, so a second process cannot open the same
    /// store and corrupt the active file concurrently.
    _lock: File,
}

/// Outcome of a full-file scan: whether it ran to a clean end-of-file or
/// stopped early because it hit a record it could not decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Complete,
    Truncated,
}

impl Io {
    /// Opens `dir`, creating it and a fresh active file `"0"` if absent,
    /// otherwise positioning the active appender at the end of the
    /// existing `"0"`. Does not touch any other file - recovery (scanning
    /// inactive files and hint files into the index) is the caller's job.
    pub fn open<P: AsRef<Path>>(dir: P, reader_capacity: usize) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(".lock"))?;
        lock.try_lock_exclusive()
            .map_err(|_| Error::Io(std::io::Error::other("storage directory is already locked")))?;

        let active_path = utils::datafile_path(&dir, utils::ACTIVE_FILE_NAME);
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&active_path)?;
        let len = file.metadata()?.len();
        debug!(?active_path, len, "opened active file");

        Ok(Self {
            dir,
            appender: Mutex::new(Appender {
                file,
                name: utils::ACTIVE_FILE_NAME.to_string(),
                len,
            }),
            reader_pool: ReaderPool::new(reader_capacity),
            splits: AtomicU64::new(0),
            _lock: lock,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Appends one record to the active file and returns where it landed.
    /// `pos`/`length` describe the byte range just written; `timestamp` is
    /// the value encoded into the record.
    #[tracing::instrument(level = "debug", skip(self, key, value))]
    pub fn append(&self, key: &[u8], value: &[u8]) -> Result<(String, u64, u64, u32)> {
        let timestamp = utils::timestamp();
        let record = codec::encode_data(timestamp, key, value);

        let mut appender = self.appender.lock();
        let pos = appender.len;
        appender.file.write_all(&record)?;
        appender.file.flush()?;
        appender.len += record.len() as u64;

        debug!(
            file = %appender.name,
            pos,
            length = record.len(),
            "appended record"
        );
        Ok((appender.name.clone(), pos, record.len() as u64, timestamp))
    }

    /// Current length of the active file, for rotation decisions.
    pub fn active_len(&self) -> u64 {
        self.appender.lock().len
    }

    /// Reads and CRC-verifies exactly the record described by `entry`.
    pub fn read(&self, entry: &IndexEntry) -> Result<DataEntry> {
        let path = utils::datafile_path(&self.dir, &entry.file_name);
        let mut file = self.reader_pool.acquire(&path)?;
        let mut buf = vec![0u8; entry.length as usize];
        let result = (|| {
            file.seek(SeekFrom::Start(entry.pos))?;
            file.read_exact(&mut buf)?;
            Ok::<_, std::io::Error>(())
        })();
        self.reader_pool.release(&path, file);
        result?;
        codec::verify_and_decode(&entry.file_name, entry.pos, &buf)
    }

    /// Scans `file_name` from offset zero, calling `visitor` with the
    /// position and decoded entry of every fully-readable record. Stops at
    /// the first record it cannot decode (including CRC failure) and
    /// reports that as [`ScanOutcome::Truncated`] rather than an error -
    /// this is a best-effort primitive used by recovery and merge to
    /// tolerate a torn tail record.
    ///
    /// Also returns the byte offset at which the scan stopped, so a
    /// caller recovering the active file can physically truncate away a
    /// torn tail record before resuming appends.
    pub fn scan(
        &self,
        file_name: &str,
        mut visitor: impl FnMut(u64, DataEntry),
    ) -> Result<(ScanOutcome, u64)> {
        let path = utils::datafile_path(&self.dir, file_name);
        let file = File::open(&path)?;
        let mut reader = BufReader::new(file);
        let mut pos = 0u64;

        loop {
            let mut header_buf = [0u8; codec::DATA_HEADER_SIZE];
            match read_fully(&mut reader, &mut header_buf) {
                ReadOutcome::Full => {}
                ReadOutcome::Eof => return Ok((ScanOutcome::Complete, pos)),
                ReadOutcome::Short => return Ok((ScanOutcome::Truncated, pos)),
            }
            let header = match codec::decode_header(file_name, pos, &header_buf) {
                Ok(h) => h,
                Err(_) => return Ok((ScanOutcome::Truncated, pos)),
            };
            let payload_len = header.key_size as usize + header.value_size as usize;
            let mut record_buf = vec![0u8; codec::DATA_HEADER_SIZE + payload_len];
            record_buf[..codec::DATA_HEADER_SIZE].copy_from_slice(&header_buf);
            match read_fully(&mut reader, &mut record_buf[codec::DATA_HEADER_SIZE..]) {
                ReadOutcome::Full => {}
                _ => return Ok((ScanOutcome::Truncated, pos)),
            }
            match codec::verify_and_decode(file_name, pos, &record_buf) {
                Ok(entry) => {
                    let record_len = header.record_len();
                    visitor(pos, entry);
                    pos += record_len;
                }
                Err(_) => return Ok((ScanOutcome::Truncated, pos)),
            }
        }
    }

    /// Physically truncates `file_name` to `len` bytes. Used after
    /// recovery finds a torn tail record in the active file, so that
    /// future appends do not leave garbage bytes stranded before them.
    pub fn truncate_to(&self, file_name: &str, len: u64) -> Result<()> {
        let path = utils::datafile_path(&self.dir, file_name);
        let file = OpenOptions::new().write(true).open(&path)?;
        file.set_len(len)?;
        if file_name == utils::ACTIVE_FILE_NAME {
            let mut appender = self.appender.lock();
            appender.len = len;
        }
        Ok(())
    }

    /// Closes the active appender, renames it to the next free inactive
    /// slot, and opens a fresh `"0"`. Returns the name the old active file
    /// was renamed to.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn split(&self) -> Result<String> {
        let mut appender = self.appender.lock();
        appender.file.flush()?;

        let existing = utils::sorted_inactive_fileids(&self.dir)?;
        let new_name = utils::next_fileid(&existing).to_string();

        let active_path = utils::datafile_path(&self.dir, utils::ACTIVE_FILE_NAME);
        let inactive_path = utils::datafile_path(&self.dir, &new_name);
        fs::rename(&active_path, &inactive_path)?;

        let fresh = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&active_path)?;
        appender.file = fresh;
        appender.len = 0;
        self.splits.fetch_add(1, Ordering::SeqCst);

        debug!(new_name = %new_name, "split active file");
        Ok(new_name)
    }

    pub fn splits(&self) -> u64 {
        self.splits.load(Ordering::SeqCst)
    }

    /// Deletes a data file and invalidates any pooled reader for it.
    pub fn delete_data_file(&self, file_name: &str) -> Result<()> {
        let path = utils::datafile_path(&self.dir, file_name);
        self.reader_pool.invalidate(&path);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes a hint file, tolerating its absence.
    pub fn delete_hint_file(&self, file_name: &str) -> Result<()> {
        let path = utils::hintfile_path(&self.dir, file_name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Creates (truncating any existing contents) the merge temp file for
    /// `target`, ready for appends.
    pub fn create_merge_temp(&self, target: &str) -> Result<File> {
        let path = utils::merge_temp_path(&self.dir, target);
        Ok(OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?)
    }

    /// Renames the merge temp file for `target` into place as the new
    /// `target` data file. The caller must have already deleted the
    /// original `target`.
    pub fn finish_merge(&self, target: &str) -> Result<()> {
        let temp_path = utils::merge_temp_path(&self.dir, target);
        let final_path = utils::datafile_path(&self.dir, target);
        fs::rename(temp_path, final_path)?;
        Ok(())
    }

    /// Opens (or creates) the hint file for `target`, ready for appends.
    pub fn create_hint_file(&self, target: &str) -> Result<File> {
        let path = utils::hintfile_path(&self.dir, target);
        Ok(OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?)
    }

    /// Reads a hint file for `fileid`, returning `Ok(None)` if it does not
    /// exist so the caller can fall back to a full data-file scan.
    pub fn read_hint_file(&self, file_name: &str) -> Result<Option<Vec<codec::HintEntry>>> {
        let path = utils::hintfile_path(&self.dir, file_name);
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut entries = Vec::new();
        let mut offset = 0usize;
        while offset < bytes.len() {
            match codec::decode_hint(&bytes[offset..])? {
                Some((entry, consumed)) => {
                    offset += consumed;
                    entries.push(entry);
                }
                None => break,
            }
        }
        Ok(Some(entries))
    }

    /// All integer-named files in the directory except the active file,
    /// ascending by numeric name.
    pub fn inactive_fileids(&self) -> Result<Vec<u64>> {
        utils::sorted_inactive_fileids(&self.dir)
    }
}

enum ReadOutcome {
    Full,
    Eof,
    Short,
}

/// Like `Read::read_exact`, but distinguishes a clean EOF at the very
/// start of the read (nothing left in the file) from a short/partial
/// read (a torn record at the tail).
fn read_fully(reader: &mut impl Read, buf: &mut [u8]) -> ReadOutcome {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(_) => break,
        }
    }
    if filled == buf.len() {
        ReadOutcome::Full
    } else if filled == 0 {
        ReadOutcome::Eof
    } else {
        ReadOutcome::Short
    }
}

/// Owned copy of decoded key bytes alongside their logical length, used
/// when the "prefixed keys" layout needs to be unwound during scans.
pub fn logical_key(prefixed: bool, raw: Bytes) -> Bytes {
    if prefixed {
        codec::strip_key_prefix(&raw)
    } else {
        raw
    }
}
