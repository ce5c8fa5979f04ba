//! Directory/file-naming helpers shared by the IO layer, merger, and
//! recovery.
//!
//! A data file is named with the decimal ASCII of a nonnegative integer;
//! `"0"` is always the active file. A hint file for data file `<n>` is
//! named `<n>h`; a merge-in-progress temp file is named `<n>_`.

use std::{
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use super::error::Result;

/// Name of the active data file.
pub const ACTIVE_FILE_NAME: &str = "0";

pub fn datafile_path<P: AsRef<Path>>(dir: P, name: &str) -> PathBuf {
    dir.as_ref().join(name)
}

pub fn hintfile_path<P: AsRef<Path>>(dir: P, name: &str) -> PathBuf {
    dir.as_ref().join(format!("{name}h"))
}

pub fn merge_temp_path<P: AsRef<Path>>(dir: P, name: &str) -> PathBuf {
    dir.as_ref().join(format!("{name}_"))
}

/// Current wall-clock time truncated to whole seconds since the epoch,
/// as an unsigned 32-bit integer.
pub fn timestamp() -> u32 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    secs as u32
}

/// Lists the integer-named files in `dir`, excluding the active file
/// `"0"`, sorted ascending by numeric value.
pub fn sorted_inactive_fileids<P: AsRef<Path>>(dir: P) -> Result<Vec<u64>> {
    let mut ids = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name == ACTIVE_FILE_NAME {
            continue;
        }
        if let Ok(id) = name.parse::<u64>() {
            ids.push(id);
        }
    }
    ids.sort_unstable();
    Ok(ids)
}

/// Picks the name for a newly-rotated inactive file: the smallest positive
/// integer not already present among `existing`, reusing holes left by a
/// previous merge before growing past the maximum.
pub fn next_fileid(existing: &[u64]) -> u64 {
    let mut sorted = existing.to_vec();
    sorted.sort_unstable();
    let mut candidate = 1u64;
    for &id in &sorted {
        if id == candidate {
            candidate += 1;
        } else if id > candidate {
            break;
        }
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_fileid_fills_holes_first() {
        assert_eq!(next_fileid(&[]), 1);
        assert_eq!(next_fileid(&[1, 2, 3]), 4);
        assert_eq!(next_fileid(&[1, 3, 4]), 2);
        assert_eq!(next_fileid(&[2, 3]), 1);
    }

    #[test]
    fn file_paths_follow_the_naming_scheme() {
        let dir = Path::new("/tmp/store");
        assert_eq!(datafile_path(dir, "3"), dir.join("3"));
        assert_eq!(hintfile_path(dir, "3"), dir.join("3h"));
        assert_eq!(merge_temp_path(dir, "3"), dir.join("3_"));
    }
}
