//! Process table sampling
//!
//! The sampler produces the current process table rows for the F5 VPN helper
//! executable. Production builds shell out to `ps(1)`; the [`ProcessLister`]
//! trait is the seam that lets tests drive the watcher with canned tables.
//!
//! `ps -C <name> -o pid=,rss=,args=` prints one whitespace-column row per
//! matching process with no header. Note that `ps -C` exits non-zero when no
//! process matches, which this implementation surfaces as a fatal
//! [`Error::Execution`](crate::Error::Execution) just like every other
//! listing failure.

/// Process row data types
pub mod types;

pub use types::ProcessRecord;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::warn;

use crate::error::{Error, Result};

#[cfg(test)]
use mockall::automock;

/// Executable name handed to the process lister
pub const TARGET_PROCESS_NAME: &str = "QtWebEngineProcess";

/// Source of process table rows for the target executable
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProcessLister: Send + Sync {
    /// Produce the current process table as a sequence of rows
    async fn list_processes(&self) -> Result<Vec<ProcessRecord>>;
}

/// Production lister backed by `ps(1)`
#[derive(Debug, Default)]
pub struct PsProcessLister;

impl PsProcessLister {
    /// Create a new PsProcessLister instance
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessLister for PsProcessLister {
    async fn list_processes(&self) -> Result<Vec<ProcessRecord>> {
        let output = Command::new("ps")
            .args(["-C", TARGET_PROCESS_NAME, "-o", "pid=,rss=,args="])
            .output()
            .await
            .map_err(|e| Error::execution(format!("failed to invoke ps: {e}")))?;

        if !output.status.success() {
            return Err(Error::execution(format!(
                "ps exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let table = String::from_utf8(output.stdout)
            .map_err(|e| Error::parse(format!("ps output is not valid UTF-8: {e}")))?;

        Ok(parse_table(&table))
    }
}

/// Parse the whitespace-column `pid rss args` table emitted by `ps`.
///
/// Rows with missing columns or non-numeric pid/rss fields are skipped with a
/// warning; a damaged row must not abort the cycle.
pub fn parse_table(table: &str) -> Vec<ProcessRecord> {
    table
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match parse_row(line) {
            Some(record) => Some(record),
            None => {
                warn!(line, "skipping malformed process table row");
                None
            }
        })
        .collect()
}

fn parse_row(line: &str) -> Option<ProcessRecord> {
    let line = line.trim_start();
    let (pid, rest) = line.split_once(char::is_whitespace)?;
    let rest = rest.trim_start();
    let (rss, command) = rest.split_once(char::is_whitespace)?;
    Some(ProcessRecord::new(
        pid.parse().ok()?,
        rss.parse().ok()?,
        command.trim_start(),
    ))
}
