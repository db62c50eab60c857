//! System-wide constants and defaults.

/// Application name used in CLI output.
pub const APP_NAME: &str = "ClaraVerse";

/// Container runtime binary probed and driven by the installer.
pub const RUNTIME_BINARY: &str = "docker";

/// Subcommand of the runtime binary that provides compose orchestration.
pub const COMPOSE_SUBCOMMAND: &str = "compose";

/// Vendor diagnostic tool used to detect a GPU accelerator.
pub const ACCELERATOR_COMMAND: &str = "nvidia-smi";

/// Marker that must appear in the diagnostic output for the GPU to count.
pub const ACCELERATOR_MARKER: &str = "NVIDIA";

/// Timeout for quick, output-capturing checks.
pub const QUICK_COMMAND_TIMEOUT_SECS: u64 = 30;

/// Timeout for long-running, terminal-streaming operations.
pub const LONG_COMMAND_TIMEOUT_SECS: u64 = 60;

/// Number of health rounds before giving up.
pub const HEALTH_MAX_ATTEMPTS: u32 = 24;

/// Pause between health rounds.
pub const HEALTH_INTERVAL_SECS: u64 = 5;

/// Per-request timeout of a single health check.
pub const HEALTH_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Host used for health checks.
pub const HEALTH_HOST: &str = "localhost";

/// Host shown in the summary when the local address cannot be resolved.
pub const LOOPBACK_HOST: &str = "localhost";

/// Exit code for a successful run.
pub const EXIT_SUCCESS: u8 = 0;

/// Exit code for any failure or cancellation.
pub const EXIT_FAILURE: u8 = 1;
