//! Resident memory aggregation
//!
//! Given a sampled process table, sum the resident set size of every row
//! whose command line contains the F5 VPN helper path. The process table
//! reports RSS in kilobytes; the aggregate is kept as a raw byte count and
//! only formatted for humans at the logging/notification edge.

/// Aggregation constants
pub mod constants;

/// Memory data types
pub mod types;

pub use types::MemorySample;

use tracing::debug;

use crate::process::ProcessRecord;
use constants::{BYTES_PER_KIB, COMMAND_LOG_LIMIT, TARGET_COMMAND_PATH};

/// Sum resident memory over the rows matching the helper path.
///
/// Non-matching rows contribute nothing; an empty table yields a zero
/// sample. Every row is logged at debug level for postmortems on what the
/// filter saw.
pub fn aggregate_usage(records: &[ProcessRecord]) -> MemorySample {
    let mut usage = 0u64;
    for record in records {
        debug!(
            pid = record.pid,
            rss_kb = record.rss_kb,
            command = truncate_command(&record.command),
            "ps row"
        );
        if record.command.contains(TARGET_COMMAND_PATH) {
            usage += record.rss_kb * BYTES_PER_KIB;
        }
    }
    MemorySample::from_bytes(usage)
}

fn truncate_command(command: &str) -> &str {
    match command.char_indices().nth(COMMAND_LOG_LIMIT) {
        Some((index, _)) => &command[..index],
        None => command,
    }
}
