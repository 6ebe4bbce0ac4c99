//! One append-only, segmented, indexed table.
//!
//! A table is an index file `<name>.cidx` plus numbered segment data files
//! `<name>.NNNN.seg`. Segment numbers are contiguous from `tail_id` (oldest
//! retained) to `head_id` (currently writable); gaps are never valid on
//! disk. Items are raw byte blobs; record encoding, compression and
//! pruning live above this layer.

use anyhow::{anyhow, bail, Context, Result};
use log::warn;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::FreezerOptions;
use crate::consts::{INDEX_ENTRY_SIZE, INDEX_FILE_EXT, SEGMENT_FILE_EXT};
use crate::index::{self, IndexEntry};
use crate::segment;

pub struct Table {
    name: String,
    dir: PathBuf,
    /// Index file, read-write, cursor parked at end between operations.
    index: File,
    /// Head segment, open for append.
    head: File,
    tail_id: u32,
    head_id: u32,
    /// Bytes recorded in the head segment (last index entry's offset).
    head_bytes: u32,
    items: u64,
    max_segment_size: u32,
}

impl Table {
    /// Open a table under `dir`, creating it if absent.
    ///
    /// `tail_id`/`head_id`/item count are derived from the first and last
    /// index records. Crash leftovers are repaired the way they are
    /// detected: a trailing partial index record is truncated away, and a
    /// head segment longer than its last recorded offset is resized down.
    pub fn open(dir: &Path, name: &str, opts: &FreezerOptions) -> Result<Self> {
        let index_path = index_path(dir, name);
        let mut index = segment::open_for_append(&index_path)?;

        let len = index
            .metadata()
            .with_context(|| format!("stat {}", index_path.display()))?
            .len();
        let items = index::entry_count(len);
        if len % INDEX_ENTRY_SIZE as u64 != 0 {
            warn!(
                "table {}: dropping partial index record ({} trailing bytes)",
                name,
                len % INDEX_ENTRY_SIZE as u64
            );
            segment::resize(&mut index, items * INDEX_ENTRY_SIZE as u64)
                .with_context(|| format!("truncate index {}", index_path.display()))?;
        }

        let (tail_id, head_id, head_bytes) = if items == 0 {
            (0, 0, 0)
        } else {
            let first = index::read_entry(&mut index, 0)?
                .ok_or_else(|| anyhow!("index {} shrank under us", index_path.display()))?;
            let last = index::read_entry(&mut index, items - 1)?
                .ok_or_else(|| anyhow!("index {} shrank under us", index_path.display()))?;
            index.seek(SeekFrom::End(0))?;
            (first.segment, last.segment, last.offset)
        };

        let head_path = segment_path(dir, name, head_id);
        let mut head = segment::open_for_append(&head_path)?;
        let head_len = head
            .metadata()
            .with_context(|| format!("stat {}", head_path.display()))?
            .len();
        if head_len > head_bytes as u64 {
            warn!(
                "table {}: head segment {} has {} unindexed byte(s), truncating",
                name,
                head_id,
                head_len - head_bytes as u64
            );
            segment::resize(&mut head, head_bytes as u64)
                .with_context(|| format!("truncate head segment {}", head_path.display()))?;
        } else if head_len < head_bytes as u64 {
            bail!(
                "table {}: head segment {} is {} byte(s), index records {}",
                name,
                head_id,
                head_len,
                head_bytes
            );
        }

        Ok(Self {
            name: name.to_string(),
            dir: dir.to_path_buf(),
            index,
            head,
            tail_id,
            head_id,
            head_bytes,
            items,
            max_segment_size: opts.max_segment_size,
        })
    }

    /// Append one item, rotating to a fresh segment when the current head
    /// would outgrow the configured cap. Returns the item number.
    pub fn append_item(&mut self, data: &[u8]) -> Result<u64> {
        let len = u32::try_from(data.len())
            .map_err(|_| anyhow!("item of {} bytes exceeds offset width", data.len()))?;

        if self.head_bytes > 0
            && self.head_bytes as u64 + len as u64 > self.max_segment_size as u64
        {
            self.head
                .sync_all()
                .with_context(|| format!("seal segment {} of table {}", self.head_id, self.name))?;
            self.head_id += 1;
            self.head = segment::open_truncated(&self.file_name(self.head_id))?;
            self.head_bytes = 0;
        }

        self.head
            .write_all(data)
            .with_context(|| format!("append to segment {} of table {}", self.head_id, self.name))?;
        self.head_bytes += len;

        let entry = IndexEntry {
            segment: self.head_id,
            offset: self.head_bytes,
        };
        self.index.seek(SeekFrom::End(0))?;
        self.index
            .write_all(&entry.to_bytes())
            .with_context(|| format!("append index record for table {}", self.name))?;

        self.items += 1;
        Ok(self.items - 1)
    }

    /// Read item `n` back.
    ///
    /// Bounds come from records `n-1` and `n`; item 0, and the first item
    /// of every segment, starts at offset 0 of its end-bound's segment.
    pub fn retrieve_item(&mut self, n: u64) -> Result<Vec<u8>> {
        if n >= self.items {
            bail!(
                "item {} out of range (table {} holds {})",
                n,
                self.name,
                self.items
            );
        }
        let end = index::read_entry(&mut self.index, n)?
            .ok_or_else(|| anyhow!("index record {} missing in table {}", n, self.name))?;
        let start_off = if n == 0 {
            0
        } else {
            let start = index::read_entry(&mut self.index, n - 1)?
                .ok_or_else(|| anyhow!("index record {} missing in table {}", n - 1, self.name))?;
            if start.segment != end.segment {
                0
            } else {
                start.offset
            }
        };
        self.index.seek(SeekFrom::End(0))?;

        let len = end
            .offset
            .checked_sub(start_off)
            .ok_or_else(|| anyhow!("corrupt index bounds for item {} of table {}", n, self.name))?;
        let mut buf = vec![0u8; len as usize];
        let path = self.file_name(end.segment);
        let mut seg = segment::open_read_only(&path)?;
        seg.seek(SeekFrom::Start(start_off as u64))?;
        seg.read_exact(&mut buf)
            .with_context(|| format!("read item {} from {}", n, path.display()))?;
        Ok(buf)
    }

    /// Flush head segment and index to disk.
    pub fn sync(&mut self) -> Result<()> {
        self.head
            .sync_all()
            .with_context(|| format!("sync head segment of table {}", self.name))?;
        self.index
            .sync_all()
            .with_context(|| format!("sync index of table {}", self.name))?;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tail_id(&self) -> u32 {
        self.tail_id
    }

    pub fn head_id(&self) -> u32 {
        self.head_id
    }

    pub fn items(&self) -> u64 {
        self.items
    }

    /// Deterministic path of segment `seg` for this table.
    pub fn file_name(&self, seg: u32) -> PathBuf {
        segment_path(&self.dir, &self.name, seg)
    }

    pub fn index_path(&self) -> PathBuf {
        index_path(&self.dir, &self.name)
    }
}

pub(crate) fn index_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.{}", name, INDEX_FILE_EXT))
}

pub(crate) fn segment_path(dir: &Path, name: &str, seg: u32) -> PathBuf {
    dir.join(format!("{}.{:04}.{}", name, seg, SEGMENT_FILE_EXT))
}
