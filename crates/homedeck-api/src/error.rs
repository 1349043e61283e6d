use thiserror::Error;

/// Top-level error type for the `homedeck-api` crate.
///
/// Covers every failure mode of the two HTTP surfaces: the data-service
/// REST API and arbitrary outbound webhook destinations.
/// `homedeck-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data service ────────────────────────────────────────────────
    /// The service key cannot be carried in an HTTP header.
    #[error("Invalid service key: {message}")]
    InvalidServiceKey { message: String },

    /// Structured error from the data service (PostgREST error body).
    #[error("Data service error (HTTP {status}): {message}")]
    DataService {
        status: u16,
        message: String,
        code: Option<String>,
        details: Option<String>,
        hint: Option<String>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the request never produced an HTTP response
    /// because the destination could not be reached in time or at all.
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` if the outbound request hit the configured timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Extract the data-service error code (e.g. `23505`), if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::DataService { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
