//! Watcher configuration
//!
//! Two scalars fixed at process start: the byte threshold that triggers a
//! notification and the sleep between poll cycles. Both must be strictly
//! positive; everything else about a run is constant.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default memory threshold when no CLI value is given (GiB)
pub const DEFAULT_THRESHOLD_GIB: f64 = 1.0;

/// Default polling interval when no CLI value is given (seconds)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 600;

const BYTES_PER_GIB: f64 = 1_073_741_824.0;

/// Immutable runtime configuration for the watcher loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WatcherConfig {
    /// Notification threshold in bytes
    pub threshold_bytes: u64,
    /// Sleep between successive poll cycles
    pub poll_interval: Duration,
}

impl WatcherConfig {
    /// Create a validated configuration from raw values
    pub fn new(threshold_bytes: u64, poll_interval: Duration) -> Result<Self> {
        if threshold_bytes == 0 {
            return Err(Error::invalid_argument(
                "threshold must be positive",
                threshold_bytes.to_string(),
            ));
        }
        if poll_interval.is_zero() {
            return Err(Error::invalid_argument(
                "poll interval must be positive",
                format!("{poll_interval:?}"),
            ));
        }
        Ok(Self {
            threshold_bytes,
            poll_interval,
        })
    }

    /// Create a configuration from the units the CLI exposes: a fractional
    /// GiB threshold and a whole-second interval. The byte count truncates.
    pub fn from_cli_units(threshold_gib: f64, interval_secs: u64) -> Result<Self> {
        if !threshold_gib.is_finite() || threshold_gib <= 0.0 {
            return Err(Error::invalid_argument(
                "threshold must be a positive number of GiB",
                threshold_gib.to_string(),
            ));
        }
        Self::new(
            (threshold_gib * BYTES_PER_GIB) as u64,
            Duration::from_secs(interval_secs),
        )
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            threshold_bytes: BYTES_PER_GIB as u64,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}
