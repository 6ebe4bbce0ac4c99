//! Segment file open helpers with platform-independent append semantics.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom};
use std::path::Path;

/// Open a table file for read-write append, creating it if absent.
///
/// The cursor is positioned at end-of-file with an explicit seek instead of
/// O_APPEND: append-mode handles interact with truncate differently across
/// platforms.
pub fn open_for_append(path: &Path) -> Result<File> {
    let mut f = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)
        .with_context(|| format!("open {} for append", path.display()))?;
    f.seek(SeekFrom::End(0))
        .with_context(|| format!("seek {} to end", path.display()))?;
    Ok(f)
}

/// Open a table file for read-only access; fails if the file is absent.
pub fn open_read_only(path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .open(path)
        .with_context(|| format!("open {} read-only", path.display()))
}

/// Open a table file for read-write, discarding any existing content.
pub fn open_truncated(path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("open {} truncated", path.display()))
}

/// Resize a table file to exactly `size` bytes and reposition the cursor at
/// the new end, so subsequent appends continue from the truncation point.
pub fn resize(file: &mut File, size: u64) -> Result<()> {
    file.set_len(size).context("resize file")?;
    file.seek(SeekFrom::End(0)).context("seek to end after resize")?;
    Ok(())
}
