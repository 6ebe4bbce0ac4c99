use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::config::FreezerOptions;
use crate::freezer::Freezer;

pub fn exec(
    path: PathBuf,
    table: String,
    value: Option<String>,
    value_file: Option<PathBuf>,
) -> Result<()> {
    let bytes: Vec<u8> = if let Some(file) = value_file {
        fs::read(&file).with_context(|| format!("read value file {}", file.display()))?
    } else if let Some(v) = value {
        v.into_bytes()
    } else {
        return Err(anyhow!("either --value or --value-file is required"));
    };

    let mut freezer = Freezer::open_existing(&path, &FreezerOptions::from_env())?;
    let tab = freezer
        .table_mut(&table)
        .ok_or_else(|| anyhow!("no table {} at {} (run init first)", table, path.display()))?;
    let item = tab.append_item(&bytes)?;
    tab.sync()?;
    println!("table {}: item {} appended ({} bytes)", table, item, bytes.len());
    Ok(())
}
