//! A freezer store: a directory of named append-only tables.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::FreezerOptions;
use crate::consts::INDEX_FILE_EXT;
use crate::lock::{try_acquire_exclusive_lock, LockGuard};
use crate::table::Table;

/// An open store. Holds the exclusive root lock for its lifetime; dropping
/// the store closes every table handle and releases the lock.
pub struct Freezer {
    root: PathBuf,
    tables: BTreeMap<String, Table>,
    _lock: LockGuard,
}

impl Freezer {
    /// Open a store with the given table set, creating the root directory
    /// and any missing tables.
    pub fn open<S: AsRef<str>>(root: &Path, names: &[S], opts: &FreezerOptions) -> Result<Self> {
        fs::create_dir_all(root)
            .with_context(|| format!("create store root {}", root.display()))?;
        let lock = try_acquire_exclusive_lock(root)?;
        let mut tables = BTreeMap::new();
        for name in names {
            let name = name.as_ref();
            let table = Table::open(root, name, opts)
                .with_context(|| format!("open table {}", name))?;
            tables.insert(name.to_string(), table);
        }
        Ok(Self {
            root: root.to_path_buf(),
            tables,
            _lock: lock,
        })
    }

    /// Open every table already present under `root`.
    pub fn open_existing(root: &Path, opts: &FreezerOptions) -> Result<Self> {
        let names = discover_tables(root)?;
        Self::open(root, &names, opts)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    /// Tables in deterministic (name) order.
    pub fn tables(&self) -> impl Iterator<Item = (&String, &Table)> {
        self.tables.iter()
    }

    pub fn sync(&mut self) -> Result<()> {
        for table in self.tables.values_mut() {
            table.sync()?;
        }
        Ok(())
    }
}

/// Table names under `root`, found by scanning for index files.
pub fn discover_tables(root: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let entries =
        fs::read_dir(root).with_context(|| format!("read store root {}", root.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some(INDEX_FILE_EXT) {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}
