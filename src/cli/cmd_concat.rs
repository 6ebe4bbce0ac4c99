use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::concat::concat_stores;
use crate::config::FreezerOptions;
use crate::freezer::Freezer;

pub fn exec(path: PathBuf, from: PathBuf, json: bool) -> Result<()> {
    let opts = FreezerOptions::from_env();
    let dest = Freezer::open_existing(&path, &opts)
        .with_context(|| format!("open destination freezer {}", path.display()))?;
    let src = Freezer::open_existing(&from, &opts)
        .with_context(|| format!("open source freezer {}", from.display()))?;

    let report = concat_stores(dest, src)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for t in &report.tables {
        println!(
            "table {}: {} record(s) moved, {} segment(s) now {}..={}",
            t.table, t.entries_moved, t.segments_moved, t.first_new_segment, t.last_new_segment
        );
    }
    println!(
        "merged store promoted to {} (superseded root at {})",
        report.promoted_root.display(),
        report.superseded_root.display()
    );
    Ok(())
}
