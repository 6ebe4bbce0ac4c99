//! Fixed-width index entry codec and index-file I/O.
//!
//! A table index is a flat array of 8-byte records with no separators:
//! [segment u32 BE][offset u32 BE]. Record `i` marks the end of item `i`
//! (`offset` bytes into `segment`); the start bound is the previous record,
//! or offset 0 of the tail segment for item 0. An empty table has an empty
//! index.

use anyhow::{Context, Result};
use byteorder::{BigEndian, ByteOrder};
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};

use crate::consts::INDEX_ENTRY_SIZE;

/// End-of-item marker: item `i` ends `offset` bytes into segment `segment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub segment: u32,
    pub offset: u32,
}

impl IndexEntry {
    pub fn to_bytes(self) -> [u8; INDEX_ENTRY_SIZE] {
        let mut buf = [0u8; INDEX_ENTRY_SIZE];
        BigEndian::write_u32(&mut buf[0..4], self.segment);
        BigEndian::write_u32(&mut buf[4..8], self.offset);
        buf
    }

    pub fn from_bytes(buf: &[u8; INDEX_ENTRY_SIZE]) -> Self {
        Self {
            segment: BigEndian::read_u32(&buf[0..4]),
            offset: BigEndian::read_u32(&buf[4..8]),
        }
    }
}

/// Read index record `i` by direct seek to `i * INDEX_ENTRY_SIZE`.
///
/// Returns `Ok(None)` at end-of-index (including a trailing partial
/// record); that is the normal scan termination signal, not an error.
pub fn read_entry(index: &mut File, i: u64) -> Result<Option<IndexEntry>> {
    index
        .seek(SeekFrom::Start(i * INDEX_ENTRY_SIZE as u64))
        .with_context(|| format!("seek index to record {}", i))?;
    let mut buf = [0u8; INDEX_ENTRY_SIZE];
    match index.read_exact(&mut buf) {
        Ok(()) => Ok(Some(IndexEntry::from_bytes(&buf))),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e).with_context(|| format!("read index record {}", i)),
    }
}

/// Number of whole records in an index file of `len` bytes.
pub fn entry_count(len: u64) -> u64 {
    len / INDEX_ENTRY_SIZE as u64
}
