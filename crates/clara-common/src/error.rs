//! Unified error types for the Clara installer workspace.
//!
//! Higher-level crates define their own domain-specific error enums that
//! wrap these variants when appropriate.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum ClaraError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A child process could not be spawned.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program that could not be started.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A child process exited unsuccessfully.
    #[error("{program} exited with {}", exit_label(*.code))]
    CommandFailed {
        /// Program that failed.
        program: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
    },

    /// A child process exceeded its time budget and was killed.
    #[error("{program} timed out after {timeout_secs}s")]
    CommandTimedOut {
        /// Program that timed out.
        program: String,
        /// Timeout that was exceeded.
        timeout_secs: u64,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

fn exit_label(code: Option<i32>) -> String {
    code.map_or_else(|| "no exit code (signal)".into(), |c| format!("exit code {c}"))
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ClaraError>;
