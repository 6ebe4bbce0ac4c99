//! On-disk format constants (index entries, segment files, promotion).

// -------- Index --------
/// Extension of a table's index file: `<name>.cidx`.
pub const INDEX_FILE_EXT: &str = "cidx";
/// Width of one index entry: [segment u32 BE][offset u32 BE].
pub const INDEX_ENTRY_SIZE: usize = 8;

// -------- Data segments --------
/// Extension of a segment data file: `<name>.NNNN.seg`.
pub const SEGMENT_FILE_EXT: &str = "seg";
/// Default cap on a single segment file. Offsets are u32, so the cap must
/// stay below u32::MAX.
pub const DEFAULT_SEGMENT_SIZE: u32 = 2 * 1024 * 1024 * 1024;

// -------- Store root --------
/// Lock file name inside a store root.
pub const LOCK_FILE: &str = "LOCK";
/// Suffix appended to the superseded store root during promotion.
pub const OLD_ROOT_SUFFIX: &str = ".old";
