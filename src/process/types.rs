#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One row of the process table
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProcessRecord {
    /// Process ID
    pub pid: u32,
    /// Resident set size as reported by the process table (kilobytes)
    pub rss_kb: u64,
    /// Full command line
    pub command: String,
}

impl ProcessRecord {
    /// Create a new ProcessRecord instance
    pub fn new(pid: u32, rss_kb: u64, command: impl Into<String>) -> Self {
        Self {
            pid,
            rss_kb,
            command: command.into(),
        }
    }
}
