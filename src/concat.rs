//! Table and store concatenation: splice one freezer onto the end of
//! another, renumbering the source's segment files so they continue the
//! destination's numbering.
//!
//! This is a one-shot offline operation. Individual renames are atomic but
//! the whole sequence (index appends + renames + root promotion) is not; a
//! failure mid-merge leaves the destination partially extended and is not
//! safely retriable without manual cleanup. Progress is logged at debug
//! level and tallied in the returned reports to make such cleanup
//! diagnosable.

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::error::FreezerError;
use crate::freezer::Freezer;
use crate::index;
use crate::segment;
use crate::table::Table;

/// One planned segment rename, derived from table metadata before any
/// filesystem mutation happens.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SegmentRename {
    from: PathBuf,
    to: PathBuf,
}

/// Per-table merge tallies.
#[derive(Debug, Serialize)]
pub struct TableMergeReport {
    pub table: String,
    /// Index records translated and appended to the destination.
    pub entries_moved: u64,
    /// Segment files renamed into the destination.
    pub segments_moved: u32,
    /// Destination segment numbers now occupied by the source's data:
    /// `first_new_segment ..= last_new_segment`, contiguous.
    pub first_new_segment: u32,
    pub last_new_segment: u32,
}

/// Whole-store merge outcome.
#[derive(Debug, Serialize)]
pub struct StoreMergeReport {
    pub tables: Vec<TableMergeReport>,
    /// Path the merged store now occupies (the source's original root).
    pub promoted_root: PathBuf,
    /// Where the superseded source root was moved aside.
    pub superseded_root: PathBuf,
}

/// Rename schedule for splicing `src`'s segments after `dest`'s head:
/// source segment `tail + k` becomes destination segment `head + 1 + k`.
fn plan_renames(dest: &Table, src: &Table) -> Vec<SegmentRename> {
    (0..=src.head_id() - src.tail_id())
        .map(|k| SegmentRename {
            from: src.file_name(src.tail_id() + k),
            to: dest.file_name(dest.head_id() + 1 + k),
        })
        .collect()
}

/// Append all items of `src` onto `dest`.
///
/// Single forward pass over the source index: every record is re-tagged
/// into destination numbering and appended to the destination index; each
/// time the scan crosses a segment boundary the completed source segment
/// file is renamed to its destination name. The source's segment files are
/// consumed as a side effect.
///
/// Contiguity of source segment numbers is an on-disk invariant: any jump
/// larger than one aborts with [`FreezerError::SegmentGap`], leaving the
/// destination index holding exactly the translated prefix written so far.
///
/// Both tables' in-memory handles are stale afterwards; reopen them before
/// further use.
pub fn concat_tables(dest: &Table, src: &Table) -> Result<TableMergeReport> {
    let plan = plan_renames(dest, src);
    debug!(
        "table {}: splicing {} source segment(s) after destination segment {}",
        src.name(),
        plan.len(),
        dest.head_id()
    );
    for op in &plan {
        debug!("planned rename {} -> {}", op.from.display(), op.to.display());
    }

    let dest_index = segment::open_for_append(&dest.index_path())
        .with_context(|| format!("open destination index of table {}", dest.name()))?;
    let mut out = BufWriter::new(dest_index);
    let mut src_index = segment::open_read_only(&src.index_path())
        .with_context(|| format!("open source index of table {}", src.name()))?;

    let mut to_id = dest.head_id() + 1;
    let mut from_id = src.tail_id();
    let mut renamed = 0u32;
    let mut moved = 0u64;

    // End-of-index is the normal termination condition of this scan.
    let mut cur = 0u64;
    while let Some(mut entry) = index::read_entry(&mut src_index, cur)
        .with_context(|| format!("scan source index of table {}", src.name()))?
    {
        if entry.segment != from_id {
            // Boundary crossed: source segment `from_id` is fully accounted
            // for and can take its destination name.
            let op = next_rename(&plan, renamed, src, entry.segment)?;
            debug!(
                "table {}: segment {} complete, renaming {} -> {}",
                src.name(),
                from_id,
                op.from.display(),
                op.to.display()
            );
            fs::rename(&op.from, &op.to)
                .with_context(|| format!("rename {} -> {}", op.from.display(), op.to.display()))?;
            renamed += 1;

            if entry.segment != from_id + 1 {
                // Flush so the destination index holds the translated
                // prefix that was already accounted for.
                out.flush()
                    .with_context(|| format!("flush destination index of table {}", dest.name()))?;
                return Err(FreezerError::SegmentGap {
                    table: src.name().to_string(),
                    from: from_id,
                    found: entry.segment,
                }
                .into());
            }
            from_id = entry.segment;
            to_id += 1;
        }

        entry.segment = to_id;
        out.write_all(&entry.to_bytes())
            .with_context(|| format!("append index record to table {}", dest.name()))?;
        moved += 1;
        cur += 1;
    }

    let dest_index = out
        .into_inner()
        .map_err(|e| anyhow!("flush destination index of table {}: {}", dest.name(), e))?;
    dest_index
        .sync_all()
        .with_context(|| format!("sync destination index of table {}", dest.name()))?;
    drop(dest_index);

    // The last source segment has no successor record to trigger its rename
    // inside the loop; move it now. On an empty source this is the only
    // rename that runs.
    let op = next_rename(&plan, renamed, src, from_id)?;
    debug!(
        "table {}: index done, renaming final segment {} -> {}",
        src.name(),
        op.from.display(),
        op.to.display()
    );
    fs::rename(&op.from, &op.to)
        .with_context(|| format!("rename {} -> {}", op.from.display(), op.to.display()))?;
    renamed += 1;

    info!(
        "table {}: moved {} record(s), {} segment(s) now occupy {}..={}",
        dest.name(),
        moved,
        renamed,
        dest.head_id() + 1,
        to_id
    );
    Ok(TableMergeReport {
        table: dest.name().to_string(),
        entries_moved: moved,
        segments_moved: renamed,
        first_new_segment: dest.head_id() + 1,
        last_new_segment: to_id,
    })
}

/// The plan covers `tail..=head` of the source; an index that walks past it
/// contradicts the table metadata.
fn next_rename<'p>(
    plan: &'p [SegmentRename],
    done: u32,
    src: &Table,
    seen: u32,
) -> Result<&'p SegmentRename> {
    plan.get(done as usize).ok_or_else(|| {
        anyhow!(
            "index of table {} references segment {} beyond head {}",
            src.name(),
            seen,
            src.head_id()
        )
    })
}

/// Merge every table of `src` into `dest`, then promote the merged store to
/// the source's path.
///
/// Every destination table must have a same-named source counterpart;
/// [`FreezerError::MissingTable`] aborts the merge at the first mismatch,
/// with tables merged before it left merged. After all tables succeed the
/// source root is renamed aside (`<root>.old`) and the destination root is
/// renamed to the source's original path, handing the merged data to
/// whatever path the caller's process expects. If the second rename fails
/// the first is reversed; failing that too surfaces
/// [`FreezerError::PartiallyPromoted`].
pub fn concat_stores(dest: Freezer, src: Freezer) -> Result<StoreMergeReport> {
    let mut reports = Vec::new();
    for (name, to_table) in dest.tables() {
        debug!("backfilling table {}", name);
        let from_table = src
            .table(name)
            .ok_or_else(|| FreezerError::MissingTable(name.clone()))?;
        let report = concat_tables(to_table, from_table)
            .with_context(|| format!("concatenating table {}", name))?;
        reports.push(report);
    }

    let to_root = dest.root().to_path_buf();
    let from_root = src.root().to_path_buf();
    // Close every table handle and release both locks before the roots move.
    drop(dest);
    drop(src);

    let old_root = {
        let mut s = from_root.clone().into_os_string();
        s.push(crate::consts::OLD_ROOT_SUFFIX);
        PathBuf::from(s)
    };

    info!(
        "moving store root {} -> {}",
        from_root.display(),
        old_root.display()
    );
    fs::rename(&from_root, &old_root).with_context(|| {
        format!(
            "move source root {} aside to {}",
            from_root.display(),
            old_root.display()
        )
    })?;

    info!(
        "promoting merged root {} -> {}",
        to_root.display(),
        from_root.display()
    );
    if let Err(promote) = fs::rename(&to_root, &from_root) {
        // Put the superseded root back so the original path is not left
        // dangling; if even that fails the stores need manual cleanup.
        return match fs::rename(&old_root, &from_root) {
            Ok(()) => Err(anyhow!(promote).context(format!(
                "promote merged root {} to {} (source root restored)",
                to_root.display(),
                from_root.display()
            ))),
            Err(undo) => Err(FreezerError::PartiallyPromoted {
                detail: format!(
                    "{} was moved to {}, promoting {} failed ({}), restoring failed too ({})",
                    from_root.display(),
                    old_root.display(),
                    to_root.display(),
                    promote,
                    undo
                ),
            }
            .into()),
        };
    }

    Ok(StoreMergeReport {
        tables: reports,
        promoted_root: from_root,
        superseded_root: old_root,
    })
}
