use anyhow::Result;
use std::path::PathBuf;

use crate::config::FreezerOptions;
use crate::freezer::Freezer;

pub fn exec(path: PathBuf, tables: Vec<String>) -> Result<()> {
    let opts = FreezerOptions::from_env();
    let freezer = Freezer::open(&path, &tables, &opts)?;
    println!(
        "initialized freezer at {} with {} table(s)",
        freezer.root().display(),
        tables.len()
    );
    Ok(())
}
