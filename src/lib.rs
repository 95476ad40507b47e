//! f5vpn-memwatch - A memory watchdog for the F5 VPN browser helper processes
//!
//! The F5 VPN client on Linux spawns a family of `QtWebEngineProcess` helper
//! processes that are prone to leaking memory over long sessions. This crate
//! polls the process table on a fixed interval, sums the resident set size of
//! every helper, and raises a desktop notification whenever the aggregate
//! crosses a configured threshold.
//!
//! # Pipeline
//!
//! Each cycle runs the same linear pipeline:
//!
//! - **Sampler**: [`process::ProcessLister`] produces the current process
//!   table rows for the target executable
//! - **Aggregator**: [`memory::aggregate_usage`] filters rows by the helper's
//!   absolute path and sums resident memory into a [`memory::MemorySample`]
//! - **Evaluator**: [`memory::MemorySample::exceeds`] compares the sample
//!   against the configured byte threshold (strictly greater)
//! - **Notifier**: [`notify::Notifier`] fires a desktop notification,
//!   best-effort
//! - **Scheduler**: [`watcher::MemoryWatcher`] repeats the cycle after a
//!   fixed sleep, forever
//!
//! # Examples
//!
//! ```no_run
//! use f5vpn_memwatch::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = WatcherConfig::default();
//!     let watcher = MemoryWatcher::with_defaults(config);
//!     watcher.run().await
//! }
//! ```
//!
//! # Error Handling
//!
//! The crate uses a small [`Error`] taxonomy matching the failure model of
//! the tool: a failing process listing is fatal and terminates the loop, a
//! failing notification is logged and swallowed, and invalid configuration is
//! rejected before the loop starts. There are no retries and no backoff.
//!
//! # External collaborators
//!
//! Production builds bind the process table to `ps(1)` and notifications to
//! `notify-send(1)`. Both sit behind narrow async traits so tests can
//! substitute fakes and drive cycles without touching the real system.

mod error;

pub use error::{Error, Result};

// Public modules
pub mod config;
pub mod memory;
pub mod notify;
pub mod process;
pub mod units;
pub mod watcher;

/// Re-export common types for convenience
pub mod prelude {
    pub use crate::Error;
    pub use crate::Result;
    pub use crate::config::WatcherConfig;
    pub use crate::memory::MemorySample;
    pub use crate::notify::Notifier;
    pub use crate::process::{ProcessLister, ProcessRecord};
    pub use crate::units::format_bytes;
    pub use crate::watcher::MemoryWatcher;
}
