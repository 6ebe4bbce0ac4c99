use anyhow::Result;
use std::fs::{self, OpenOptions};
use std::io::Write;

use coldstore::config::FreezerOptions;
use coldstore::table::Table;

/// Items rotate into new segments once the cap is hit; every item reads
/// back byte-identical, before and after reopening.
#[test]
fn append_retrieve_across_segments() -> Result<()> {
    let root = unique_root("table-rotate");
    fs::create_dir_all(&root)?;
    let opts = FreezerOptions::default().with_segment_size(16);

    let items: Vec<Vec<u8>> = (0u8..10).map(|i| build_pattern(6, i)).collect();

    {
        let mut tab = Table::open(&root, "bodies", &opts)?;
        assert_eq!(tab.items(), 0);
        for (i, item) in items.iter().enumerate() {
            let n = tab.append_item(item)?;
            assert_eq!(n, i as u64);
        }
        tab.sync()?;

        // 16-byte cap, 6-byte items: two items per segment.
        assert_eq!(tab.tail_id(), 0);
        assert_eq!(tab.head_id(), 4);
        for (i, item) in items.iter().enumerate() {
            assert_eq!(&tab.retrieve_item(i as u64)?, item);
        }
    }

    // Reopen and read everything again.
    let mut tab = Table::open(&root, "bodies", &opts)?;
    assert_eq!(tab.items(), 10);
    assert_eq!(tab.tail_id(), 0);
    assert_eq!(tab.head_id(), 4);
    for (i, item) in items.iter().enumerate() {
        assert_eq!(&tab.retrieve_item(i as u64)?, item);
    }

    // Segment files 0..=4 exist, nothing beyond.
    for seg in 0..=4u32 {
        assert!(tab.file_name(seg).exists(), "segment {} missing", seg);
    }
    assert!(!tab.file_name(5).exists());
    Ok(())
}

/// An item larger than the cap still fits: it gets a segment to itself.
#[test]
fn oversized_item_gets_own_segment() -> Result<()> {
    let root = unique_root("table-oversize");
    fs::create_dir_all(&root)?;
    let opts = FreezerOptions::default().with_segment_size(8);

    let mut tab = Table::open(&root, "bodies", &opts)?;
    tab.append_item(b"abc")?;
    let big = build_pattern(20, 0xEE);
    tab.append_item(&big)?;
    tab.append_item(b"xyz")?;

    assert_eq!(tab.head_id(), 2);
    assert_eq!(tab.retrieve_item(0)?, b"abc");
    assert_eq!(tab.retrieve_item(1)?, big);
    assert_eq!(tab.retrieve_item(2)?, b"xyz");
    Ok(())
}

/// Unindexed head-segment bytes and a partial trailing index record are
/// crash leftovers; open truncates both away.
#[test]
fn open_repairs_crash_leftovers() -> Result<()> {
    let root = unique_root("table-repair");
    fs::create_dir_all(&root)?;
    let opts = FreezerOptions::default().with_segment_size(64);

    let (head_path, index_path) = {
        let mut tab = Table::open(&root, "headers", &opts)?;
        tab.append_item(b"one")?;
        tab.append_item(b"two!")?;
        tab.sync()?;
        (tab.file_name(tab.head_id()), tab.index_path())
    };

    // Simulate a torn write: garbage after the last indexed byte plus a
    // partial index record.
    let mut seg = OpenOptions::new().append(true).open(&head_path)?;
    seg.write_all(b"GARBAGE")?;
    drop(seg);
    let mut idx = OpenOptions::new().append(true).open(&index_path)?;
    idx.write_all(&[0xAA, 0xBB, 0xCC])?;
    drop(idx);

    let mut tab = Table::open(&root, "headers", &opts)?;
    assert_eq!(tab.items(), 2);
    assert_eq!(tab.retrieve_item(0)?, b"one");
    assert_eq!(tab.retrieve_item(1)?, b"two!");
    assert_eq!(fs::metadata(&head_path)?.len(), 7); // "one" + "two!"
    assert_eq!(fs::metadata(&index_path)?.len(), 16);

    // Appends continue cleanly after the repair.
    tab.append_item(b"three")?;
    assert_eq!(tab.retrieve_item(2)?, b"three");
    Ok(())
}

#[test]
fn retrieve_out_of_range_fails() -> Result<()> {
    let root = unique_root("table-range");
    fs::create_dir_all(&root)?;

    let mut tab = Table::open(&root, "headers", &FreezerOptions::default())?;
    tab.append_item(b"only")?;
    assert!(tab.retrieve_item(1).is_err());
    Ok(())
}

// ---------- helpers ----------

fn unique_root(prefix: &str) -> std::path::PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("coldstore-{}-{}-{}", prefix, pid, t))
}

fn build_pattern(len: usize, byte: u8) -> Vec<u8> {
    let mut v = vec![byte; len];
    if len >= 2 {
        v[0] = byte ^ 0x55;
        v[len - 1] = byte ^ 0x11;
    }
    v
}
