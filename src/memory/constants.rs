/// Absolute path substring identifying the F5 VPN helper processes
pub const TARGET_COMMAND_PATH: &str = "/opt/f5/vpn/libexec/QtWebEngineProcess";

/// The process table reports RSS in kilobytes
pub const BYTES_PER_KIB: u64 = 1024;

/// Command lines are truncated to this many characters in debug logs
pub const COMMAND_LOG_LIMIT: usize = 100;
