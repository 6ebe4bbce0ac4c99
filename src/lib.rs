//! coldstore — low-level persistence primitives for an append-only,
//! segmented, indexed table store ("freezer"), plus the offline
//! concatenation tooling that fuses two stores into one.
//!
//! The write/read hot path of a live node, record encoding, compression
//! and pruning all live above this crate; what lives here is the on-disk
//! machinery: atomic file replacement, segment-file lifecycle, the index
//! entry codec, and the table/store concatenation algorithm.

// Base modules
pub mod config;
pub mod consts;
pub mod error;
pub mod lock;

// On-disk primitives
pub mod index;
pub mod replace;
pub mod segment;

// Tables, stores and the merge algorithm
pub mod concat;
pub mod freezer;
pub mod table;

// CLI (used by the `coldstore` binary)
pub mod cli;

// Convenience re-exports
pub use concat::{concat_stores, concat_tables, StoreMergeReport, TableMergeReport};
pub use config::FreezerOptions;
pub use error::FreezerError;
pub use freezer::{discover_tables, Freezer};
pub use index::IndexEntry;
pub use replace::replace_file;
pub use table::Table;
