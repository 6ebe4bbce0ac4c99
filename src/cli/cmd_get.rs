use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::config::FreezerOptions;
use crate::freezer::Freezer;

pub fn exec(path: PathBuf, table: String, item: u64, out: Option<PathBuf>) -> Result<()> {
    let mut freezer = Freezer::open_existing(&path, &FreezerOptions::from_env())?;
    let tab = freezer
        .table_mut(&table)
        .ok_or_else(|| anyhow!("no table {} at {}", table, path.display()))?;
    let bytes = tab.retrieve_item(item)?;

    match out {
        Some(file) => {
            fs::write(&file, &bytes)
                .with_context(|| format!("write item to {}", file.display()))?;
            println!("table {}: item {} -> {} ({} bytes)", table, item, file.display(), bytes.len());
        }
        None => {
            io::stdout().write_all(&bytes)?;
        }
    }
    Ok(())
}
