//! f5vpn-memwatch CLI entry point.
//!
//! Parses the threshold/interval flags, installs the log subscriber and runs
//! the watcher until killed or until the process listing fails.

use clap::Parser;
use f5vpn_memwatch::config::{WatcherConfig, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_THRESHOLD_GIB};
use f5vpn_memwatch::watcher::MemoryWatcher;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "f5vpn-memwatch")]
#[command(
    version,
    about = "Notify when the F5 VPN helper processes eat too much memory",
    after_help = "EXAMPLES:
    # Default: notify above 1 GiB, poll every 10 minutes
    f5vpn-memwatch

    # Tighter budget, faster polling
    f5vpn-memwatch --threshold 0.5 --interval 60

LOGGING:
    Set RUST_LOG to adjust verbosity (defaults to debug, which includes
    one line per sampled process row)."
)]
struct Cli {
    /// Memory threshold in GiB.
    #[arg(long, default_value_t = DEFAULT_THRESHOLD_GIB)]
    threshold: f64,

    /// Polling interval in seconds.
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    interval: u64,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let config = match WatcherConfig::from_cli_units(cli.threshold, cli.interval) {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let watcher = MemoryWatcher::with_defaults(config);
    if let Err(e) = watcher.run().await {
        error!("watcher stopped: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_flags() {
        let cli = Cli::try_parse_from(["f5vpn-memwatch"]).unwrap();
        assert_eq!(cli.threshold, 1.0);
        assert_eq!(cli.interval, 600);
    }

    #[test]
    fn flags_override_defaults() {
        let cli =
            Cli::try_parse_from(["f5vpn-memwatch", "--threshold", "2.5", "--interval", "30"])
                .unwrap();
        assert_eq!(cli.threshold, 2.5);
        assert_eq!(cli.interval, 30);
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        assert!(Cli::try_parse_from(["f5vpn-memwatch", "--threshold", "lots"]).is_err());
        assert!(Cli::try_parse_from(["f5vpn-memwatch", "--interval", "1.5"]).is_err());
    }

    #[test]
    fn version_flag_is_configured() {
        let err = Cli::try_parse_from(["f5vpn-memwatch", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
