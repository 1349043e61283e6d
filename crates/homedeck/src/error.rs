//! CLI error types with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

use homedeck_config::ConfigError;
use homedeck_core::{CoreError, RelayError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(homedeck::config),
        help("Run: homedeck config path  to see which file is read.")
    )]
    Config(#[from] ConfigError),

    #[error("Could not listen on {addr}")]
    #[diagnostic(
        code(homedeck::bind),
        help("Pick another address with --bind or set server.bind in the config file.")
    )]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    // ── Delivery ─────────────────────────────────────────────────────
    #[error("Could not reach {url}")]
    #[diagnostic(
        code(homedeck::connection_failed),
        help("Check that the destination is up and the URL is correct.")
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Delivery to {url} timed out after {seconds}s")]
    #[diagnostic(
        code(homedeck::timeout),
        help("Raise relay.timeout_secs or check the destination's responsiveness.")
    )]
    Timeout { url: String, seconds: u64 },

    #[error("Delivery to {url} failed: {message}")]
    #[diagnostic(code(homedeck::delivery))]
    Delivery { url: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(homedeck::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(homedeck::core))]
    Core(#[from] CoreError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(homedeck::json), help("Check the JSON and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render output: {0}")]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Bind { .. } => exit_code::CONFIG,
            Self::ConnectionFailed { .. } | Self::Delivery { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::Json(_) => exit_code::USAGE,
            Self::Core(e) if e.is_server_side() => exit_code::CONFIG,
            _ => exit_code::GENERAL,
        }
    }

    /// Translate a failed relay for the operator. `timeout_secs` is the
    /// configured bound, reported on timeouts.
    pub fn from_relay(err: RelayError, url: &str, timeout_secs: u64) -> Self {
        match err {
            RelayError::Transport(e) if e.is_timeout() => Self::Timeout {
                url: url.into(),
                seconds: timeout_secs,
            },
            RelayError::Transport(e) if e.is_unreachable() => Self::ConnectionFailed {
                url: url.into(),
                source: Box::new(e),
            },
            RelayError::MissingUrl => Self::Validation {
                field: "url".into(),
                reason: "must not be empty".into(),
            },
            other => Self::Delivery {
                url: url.into(),
                message: other.to_string(),
            },
        }
    }
}
