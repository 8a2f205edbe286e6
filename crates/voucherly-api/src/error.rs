use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong talking to a controller.
///
/// `voucherly-core` folds these into auth / validation / remote failures;
/// the predicates below are what its retry loop looks at.
#[derive(Debug, Error)]
pub enum Error {
    // Credentials and sessions
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The controller dropped the session cookie.
    #[error("Session expired, login required")]
    SessionExpired,

    /// HTTP 401 on an `X-API-KEY` request.
    #[error("Invalid API key")]
    InvalidApiKey,

    // Network
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("No response within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("TLS error: {0}")]
    Tls(String),

    // Controller replies
    /// Non-2xx reply from `/integration/v1/`.
    #[error("Integration API error (HTTP {status}): {message}")]
    Integration {
        message: String,
        code: Option<String>,
        status: u16,
    },

    /// `meta.rc` was not `"ok"`, or a UniFi OS error object came back.
    #[error("Legacy API error: {message}")]
    LegacyApi { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    /// The reply parsed as neither the expected payload nor an error.
    #[error("Unexpected response body: {message}")]
    Deserialization { message: String, body: String },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
}

impl Error {
    /// A fresh login (or key check) might make the request succeed.
    pub fn is_auth_expired(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::SessionExpired | Self::InvalidApiKey
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
            || matches!(self, Self::Transport(e) if e.is_timeout())
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Integration { status, .. } => *status == StatusCode::NOT_FOUND.as_u16(),
            Self::Transport(e) => e.status() == Some(StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// Machine-readable code from an Integration API error body.
    pub fn api_error_code(&self) -> Option<&str> {
        if let Self::Integration { code, .. } = self {
            code.as_deref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn session_failures_invite_a_new_login() {
        assert!(Error::InvalidApiKey.is_auth_expired());
        assert!(Error::SessionExpired.is_auth_expired());
        let rejected = Error::Authentication {
            message: "bad password".into(),
        };
        assert!(rejected.is_auth_expired());

        let invalid_id = Error::LegacyApi {
            message: "api.err.IdInvalid".into(),
        };
        assert!(!invalid_id.is_auth_expired());
    }

    #[test]
    fn timeout_is_not_an_auth_failure() {
        let err = Error::Timeout { timeout_secs: 5 };
        assert!(err.is_timeout());
        assert!(!err.is_auth_expired());
        assert_eq!(err.to_string(), "No response within 5s");
    }

    #[test]
    fn missing_voucher_carries_its_code() {
        let err = Error::Integration {
            message: "Voucher not found".into(),
            code: Some("api.hotspot.voucher.not-found".into()),
            status: 404,
        };
        assert!(err.is_not_found());
        assert_eq!(err.api_error_code(), Some("api.hotspot.voucher.not-found"));
        assert_eq!(Error::SessionExpired.api_error_code(), None);
    }
}
