use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;

use crate::config::FreezerOptions;
use crate::freezer::Freezer;

pub fn exec(path: PathBuf, json: bool) -> Result<()> {
    let freezer = Freezer::open_existing(&path, &FreezerOptions::from_env())?;

    if json {
        let tables: Vec<_> = freezer
            .tables()
            .map(|(name, t)| {
                json!({
                    "table": name,
                    "items": t.items(),
                    "tail_segment": t.tail_id(),
                    "head_segment": t.head_id(),
                })
            })
            .collect();
        let obj = json!({
            "root": freezer.root(),
            "tables": tables,
        });
        println!("{}", serde_json::to_string_pretty(&obj)?);
        return Ok(());
    }

    println!("freezer {}", freezer.root().display());
    for (name, t) in freezer.tables() {
        println!(
            "  {}: {} item(s), segments {}..={}",
            name,
            t.items(),
            t.tail_id(),
            t.head_id()
        );
    }
    Ok(())
}
