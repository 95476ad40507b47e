use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::units::format_bytes;

/// Aggregate resident memory measured in one poll cycle
///
/// Produced fresh each cycle and discarded after evaluation; carries no
/// identity or history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MemorySample {
    /// Aggregate RSS in bytes
    pub bytes: u64,
}

impl MemorySample {
    /// Create a sample from a raw byte count
    pub fn from_bytes(bytes: u64) -> Self {
        Self { bytes }
    }

    /// Strict threshold comparison: a sample exactly equal to the threshold
    /// does not trigger.
    pub fn exceeds(&self, threshold_bytes: u64) -> bool {
        self.bytes > threshold_bytes
    }
}

impl fmt::Display for MemorySample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_bytes(self.bytes))
    }
}
