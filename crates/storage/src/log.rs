// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-task plaintext log file
//!
//! Created empty at submit time, written line-buffered by the callback, and
//! readable from any offset while the task runs.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Creates an empty log file at `path`, truncating if one already exists.
pub fn create_empty(path: &Path) -> std::io::Result<()> {
    File::create(path)?;
    Ok(())
}

/// Reads bytes `[offset..EOF)` of the log file at `path`.
///
/// An `offset` at or beyond EOF yields an empty body, not an error.
pub fn read_log_from_offset(path: &Path, offset: u64) -> std::io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    if offset >= len {
        return Ok(Vec::new());
    }
    file.seek(SeekFrom::Start(offset))?;
    let mut buf = Vec::with_capacity((len - offset) as usize);
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn create_empty_produces_a_zero_byte_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t_x.txt");
        create_empty(&path).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn reads_from_offset_to_eof() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t_x.txt");
        std::fs::write(&path, b"hello world").unwrap();
        assert_eq!(read_log_from_offset(&path, 6).unwrap(), b"world");
        assert_eq!(read_log_from_offset(&path, 0).unwrap(), b"hello world");
    }

    #[test]
    fn offset_beyond_eof_returns_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t_x.txt");
        std::fs::write(&path, b"short").unwrap();
        assert_eq!(read_log_from_offset(&path, 1000).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn append_mode_is_visible_mid_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t_x.txt");
        create_empty(&path).unwrap();
        let mut writer = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writer.write_all(b"line one\n").unwrap();
        writer.flush().unwrap();
        assert_eq!(read_log_from_offset(&path, 0).unwrap(), b"line one\n");
    }
}
