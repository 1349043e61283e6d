// ── Core error types ──
//
// Domain errors from homedeck-core. Consumers never match on reqwest or
// HTTP details directly: the `From<homedeck_api::Error>` impl translates
// transport-layer errors into these variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Store errors ─────────────────────────────────────────────────
    /// The data service rejected the operation. `message` is the service's
    /// own wording and is shown to callers unchanged.
    #[error("{message}")]
    Store {
        message: String,
        /// Service-specific code (e.g. a Postgres SQLSTATE like `23505`).
        code: Option<String>,
        status: Option<u16>,
    },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach data service at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Data service request timed out")]
    Timeout,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Errors caused by the deployment rather than by the request.
    pub fn is_server_side(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::Internal(_))
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<homedeck_api::Error> for CoreError {
    fn from(err: homedeck_api::Error) -> Self {
        match err {
            homedeck_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Store {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            homedeck_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            homedeck_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            homedeck_api::Error::InvalidServiceKey { message } => CoreError::Config {
                message: format!("Invalid service key: {message}"),
            },
            homedeck_api::Error::DataService {
                status,
                message,
                code,
                ..
            } => CoreError::Store {
                message,
                code,
                status: Some(status),
            },
            homedeck_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_message_is_passed_through_verbatim() {
        let err = CoreError::from(homedeck_api::Error::DataService {
            status: 409,
            message: "duplicate key value violates unique constraint \"devices_pkey\"".into(),
            code: Some("23505".into()),
            details: None,
            hint: None,
        });
        assert_eq!(
            err.to_string(),
            "duplicate key value violates unique constraint \"devices_pkey\""
        );
        assert!(!err.is_server_side());
    }

    #[test]
    fn bad_service_key_is_a_config_error() {
        let err = CoreError::from(homedeck_api::Error::InvalidServiceKey {
            message: "contains newline".into(),
        });
        assert!(err.is_server_side());
    }
}
