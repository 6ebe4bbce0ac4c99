//! Fatal invariant violations surfaced by freezer maintenance operations.
//!
//! These are carried inside `anyhow::Error` and can be recovered with
//! `err.downcast_ref::<FreezerError>()`. Plain I/O failures stay as
//! context-annotated `anyhow` errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FreezerError {
    /// The source index referenced a segment number that does not directly
    /// follow the one being drained. The destination index already holds
    /// the translated prefix written before the gap; the merge is not
    /// safely retriable without discarding that prefix.
    #[error("table {table}: segment numbers jump from {from} to {found}")]
    SegmentGap { table: String, from: u32, found: u32 },

    /// A destination table has no same-named counterpart in the source
    /// freezer. Tables merged before the mismatch stay merged.
    #[error("table {0} not in source freezer")]
    MissingTable(String),

    /// The source root was renamed aside but the merged root could not be
    /// moved into its place, and moving the source root back failed too.
    /// Manual cleanup is required.
    #[error("store promotion left partially applied: {detail}")]
    PartiallyPromoted { detail: String },
}
