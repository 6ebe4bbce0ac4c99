use anyhow::{anyhow, Result};
use std::fs::{self, File};
use std::io::Write;

use coldstore::replace_file;

/// Result is always prefix ++ source[offset..], built next to the
/// destination and swapped in with one rename.
#[test]
fn replace_prefix_and_offset() -> Result<()> {
    let root = unique_root("replace-basic");
    fs::create_dir_all(&root)?;

    let src = root.join("src.bin");
    let dst = root.join("dst.bin");
    fs::write(&src, b"hello world")?;
    fs::write(&dst, b"previous content")?;

    replace_file(
        &src,
        &dst,
        6,
        Some(|f: &mut File| {
            f.write_all(b"XY")?;
            Ok(())
        }),
    )?;

    assert_eq!(fs::read(&dst)?, b"XYworld");
    // Source is only read.
    assert_eq!(fs::read(&src)?, b"hello world");
    Ok(())
}

#[test]
fn replace_without_prefix_copies_suffix() -> Result<()> {
    let root = unique_root("replace-suffix");
    fs::create_dir_all(&root)?;

    let src = root.join("src.bin");
    let dst = root.join("dst.bin");
    fs::write(&src, b"0123456789")?;

    replace_file(&src, &dst, 4, None::<fn(&mut File) -> Result<()>>)?;
    assert_eq!(fs::read(&dst)?, b"456789");
    Ok(())
}

#[test]
fn replace_offset_zero_is_full_copy() -> Result<()> {
    let root = unique_root("replace-full");
    fs::create_dir_all(&root)?;

    let src = root.join("src.bin");
    let dst = root.join("dst.bin");
    fs::write(&src, b"abc")?;

    replace_file(&src, &dst, 0, None::<fn(&mut File) -> Result<()>>)?;
    assert_eq!(fs::read(&dst)?, b"abc");
    Ok(())
}

/// src == dst: insert a prefix into a file in place.
#[test]
fn replace_in_place_inserts_prefix() -> Result<()> {
    let root = unique_root("replace-inplace");
    fs::create_dir_all(&root)?;

    let path = root.join("file.bin");
    fs::write(&path, b"payload")?;

    replace_file(
        &path,
        &path,
        0,
        Some(|f: &mut File| {
            f.write_all(b"HDR:")?;
            Ok(())
        }),
    )?;
    assert_eq!(fs::read(&path)?, b"HDR:payload");

    // And strip it again via the offset.
    replace_file(&path, &path, 4, None::<fn(&mut File) -> Result<()>>)?;
    assert_eq!(fs::read(&path)?, b"payload");
    Ok(())
}

/// A failure before the final rename must leave the destination untouched
/// and no temp file behind.
#[test]
fn replace_failure_leaves_destination_untouched() -> Result<()> {
    let root = unique_root("replace-fail");
    fs::create_dir_all(&root)?;

    let src = root.join("src.bin");
    let dst = root.join("dst.bin");
    fs::write(&src, b"new bytes")?;
    fs::write(&dst, b"old bytes")?;

    let err = replace_file(
        &src,
        &dst,
        0,
        Some(|_f: &mut File| Err(anyhow!("injected failure"))),
    );
    assert!(err.is_err());
    assert_eq!(fs::read(&dst)?, b"old bytes");

    // Nothing else may be left in the directory.
    let names: Vec<String> = fs::read_dir(&root)?
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert!(
        names.iter().all(|n| !n.ends_with(".tmp")),
        "stale temp file left behind: {:?}",
        names
    );
    Ok(())
}

/// A missing source is also a pre-rename failure.
#[test]
fn replace_missing_source_fails_clean() -> Result<()> {
    let root = unique_root("replace-nosrc");
    fs::create_dir_all(&root)?;

    let dst = root.join("dst.bin");
    fs::write(&dst, b"keep me")?;

    let err = replace_file(
        &root.join("absent.bin"),
        &dst,
        0,
        None::<fn(&mut File) -> Result<()>>,
    );
    assert!(err.is_err());
    assert_eq!(fs::read(&dst)?, b"keep me");
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
