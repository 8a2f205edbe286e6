// ── Core error types ──
//
// Callers see three families: authentication failures (the only ones the
// voucher client retries), validation failures (rejected before any remote
// call), and everything else, which counts as a remote failure.
// The `From<voucherly_api::Error>` impl does the translation.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Caller input ─────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Remote ───────────────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Controller request timed out")]
    Timeout,

    #[error("Site not found: {name}")]
    SiteNotFound { name: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Operation not supported by this controller: {operation}")]
    Unsupported { operation: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// The API-specific error code (e.g. "api.hotspot.voucher.not-found").
        code: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Local ────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// Login or authorization failure.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Malformed caller input; never retried.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationFailed { .. })
    }

    /// Any other failure talking to the controller.
    pub fn is_remote(&self) -> bool {
        !self.is_auth() && !self.is_validation()
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<voucherly_api::Error> for CoreError {
    fn from(err: voucherly_api::Error) -> Self {
        match err {
            voucherly_api::Error::Authentication { message } => {
                CoreError::Authentication { message }
            }
            voucherly_api::Error::SessionExpired => CoreError::Authentication {
                message: "session expired".into(),
            },
            voucherly_api::Error::InvalidApiKey => CoreError::Authentication {
                message: "invalid API key".into(),
            },
            voucherly_api::Error::Transport(ref e) => {
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
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            voucherly_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid URL: {e}"),
            },
            voucherly_api::Error::Timeout { .. } => CoreError::Timeout,
            voucherly_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            voucherly_api::Error::Integration {
                message,
                code,
                status,
            } => CoreError::Api {
                message,
                code,
                status: Some(status),
            },
            voucherly_api::Error::LegacyApi { message } => CoreError::Api {
                message,
                code: None,
                status: None,
            },
            voucherly_api::Error::NotFound { message } => CoreError::NotFound { message },
            voucherly_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("unexpected controller payload: {message}"))
            }
            voucherly_api::Error::UnsupportedOperation(op) => CoreError::Unsupported {
                operation: op.to_owned(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CoreError;

    #[test]
    fn auth_errors_classify_as_auth() {
        let err = CoreError::from(voucherly_api::Error::SessionExpired);
        assert!(err.is_auth());
        assert!(!err.is_remote());

        let err = CoreError::from(voucherly_api::Error::InvalidApiKey);
        assert!(err.is_auth());
    }

    #[test]
    fn api_errors_classify_as_remote() {
        let err = CoreError::from(voucherly_api::Error::LegacyApi {
            message: "api.err.IdInvalid".into(),
        });
        assert!(err.is_remote());
        assert!(!err.is_validation());

        let err = CoreError::from(voucherly_api::Error::Timeout { timeout_secs: 30 });
        assert!(err.is_timeout());
        assert!(err.is_remote());
    }

    #[test]
    fn validation_is_its_own_family() {
        let err = CoreError::validation("amount must be at least 1");
        assert!(err.is_validation());
        assert!(!err.is_remote());
        assert!(!err.is_auth());
    }
}
