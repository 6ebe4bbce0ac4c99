//! Freezer tunables: defaults plus environment overrides.

use crate::consts::DEFAULT_SEGMENT_SIZE;

/// Options applied to every table of a store.
#[derive(Clone, Debug)]
pub struct FreezerOptions {
    /// Cap on a single segment data file in bytes. An item never spans two
    /// segments; an item larger than the cap gets a segment to itself.
    /// Env: COLDSTORE_SEGMENT_BYTES
    pub max_segment_size: u32,
}

impl Default for FreezerOptions {
    fn default() -> Self {
        Self {
            max_segment_size: DEFAULT_SEGMENT_SIZE,
        }
    }
}

impl FreezerOptions {
    /// Load options from environment variables, keeping defaults for
    /// anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Ok(v) = std::env::var("COLDSTORE_SEGMENT_BYTES") {
            if let Ok(n) = v.trim().parse::<u32>() {
                if n > 0 {
                    opts.max_segment_size = n;
                }
            }
        }
        opts
    }

    pub fn with_segment_size(mut self, bytes: u32) -> Self {
        self.max_segment_size = bytes;
        self
    }
}
