//! Atomic whole-file replacement (temp file + rename).

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Replace the bytes of `dst` with `src[offset..]`, optionally prefixed by
/// whatever `before` writes into the fresh temp file.
///
/// The temp file is created in `dst`'s directory so the final rename never
/// crosses a filesystem boundary. `src == dst` is valid and is how a prefix
/// is inserted into or stripped from a file in place: the source handle is
/// fully drained and closed before the rename reassigns the name.
///
/// Until the final rename nothing observable changes at `dst`; on any
/// earlier failure the temp file is removed and `dst` keeps its previous
/// content.
pub fn replace_file<F>(src: &Path, dst: &Path, offset: u64, before: Option<F>) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let tmp_path = tmp_path_for(dst);
    // Single-writer context: a leftover temp from an earlier crash is stale.
    let _ = fs::remove_file(&tmp_path);

    let mut tmp = OpenOptions::new()
        .create_new(true)
        .read(true)
        .write(true)
        .open(&tmp_path)
        .with_context(|| format!("create temp file {}", tmp_path.display()))?;

    let res = (|| -> Result<()> {
        if let Some(before) = before {
            before(&mut tmp).context("prefix callback")?;
        }
        let mut from =
            File::open(src).with_context(|| format!("open source {}", src.display()))?;
        from.seek(SeekFrom::Start(offset))
            .with_context(|| format!("seek source {} to {}", src.display(), offset))?;
        // io::copy streams through a fixed-size buffer, never the whole file.
        io::copy(&mut from, &mut tmp)
            .with_context(|| format!("copy {} into {}", src.display(), tmp_path.display()))?;
        // The source must be closed before its name can be reused below.
        drop(from);
        tmp.sync_all()
            .with_context(|| format!("sync {}", tmp_path.display()))?;
        Ok(())
    })();

    // Close the temp handle before renaming or removing it (Windows).
    drop(tmp);

    if let Err(e) = res {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    if let Err(e) = fs::rename(&tmp_path, dst) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e).with_context(|| {
            format!("rename {} -> {}", tmp_path.display(), dst.display())
        });
    }

    let _ = fsync_parent_dir(dst);
    Ok(())
}

fn tmp_path_for(dst: &Path) -> PathBuf {
    let mut name = dst
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    dst.with_file_name(name)
}

// Best-effort fsync of the parent directory after a rename (Unix only).
#[cfg(unix)]
pub(crate) fn fsync_parent_dir(p: &Path) -> std::io::Result<()> {
    if let Some(parent) = p.parent() {
        if !parent.as_os_str().is_empty() {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }
    }
    Ok(())
}
#[cfg(not(unix))]
pub(crate) fn fsync_parent_dir(_p: &Path) -> std::io::Result<()> {
    Ok(())
}
