//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use voucherly_config::ConfigError;
use voucherly_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const UNSUPPORTED: i32 = 5;
    pub const CONFIG: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to controller at {url}")]
    #[diagnostic(
        code(voucherly::connection_failed),
        help(
            "Check that the controller is running and reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to the controller timed out")]
    #[diagnostic(
        code(voucherly::timeout),
        help("Raise TIMEOUT or check controller responsiveness.")
    )]
    Timeout,

    #[error("Could not load vouchers from the controller")]
    #[diagnostic(
        code(voucherly::sync_failed),
        help("The controller error was logged above; run with -v for details.")
    )]
    SyncFailed,

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(voucherly::auth_failed),
        help(
            "Verify UNIFI_TOKEN (Integration API key from Settings > Integrations),\n\
             or UNIFI_USERNAME / UNIFI_PASSWORD for a local controller account."
        )
    )]
    AuthFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(voucherly::not_found),
        help("Run: voucherly {list_command}")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Controller error ({code}): {message}")]
    #[diagnostic(code(voucherly::api_error))]
    ApiError { code: String, message: String },

    #[error("Operation '{operation}' is not supported by this controller")]
    #[diagnostic(code(voucherly::unsupported))]
    Unsupported { operation: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid input: {reason}")]
    #[diagnostic(code(voucherly::validation))]
    Validation { reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("{source}")]
    #[diagnostic(
        code(voucherly::config),
        help(
            "Settings come from {path}, /data/options.json, ./.options.json\n\
             and UNIFI_* / VOUCHER_TYPES environment variables."
        )
    )]
    Config {
        source: ConfigError,
        path: String,
    },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(voucherly::json))]
    Json(#[from] serde_json::Error),
}

impl From<ConfigError> for CliError {
    fn from(source: ConfigError) -> Self {
        Self::Config {
            source,
            path: voucherly_config::config_path().display().to_string(),
        }
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::SyncFailed => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Unsupported { .. } => exit_code::UNSUPPORTED,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Config { .. } => exit_code::CONFIG,
            Self::ApiError { .. } | Self::Io(_) | Self::Json(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Authentication { message } => CliError::AuthFailed { message },

            CoreError::ValidationFailed { message } => CliError::Validation { reason: message },

            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }

            CoreError::Timeout => CliError::Timeout,

            CoreError::SiteNotFound { name } => CliError::NotFound {
                resource_type: "site".into(),
                identifier: name,
                list_command: "config".into(),
            },

            CoreError::NotFound { message } => CliError::NotFound {
                resource_type: "voucher".into(),
                identifier: message,
                list_command: "list".into(),
            },

            CoreError::Unsupported { operation } => CliError::Unsupported { operation },

            CoreError::Api {
                message,
                code,
                status,
            } => CliError::ApiError {
                code: code
                    .or_else(|| status.map(|s| s.to_string()))
                    .unwrap_or_else(|| "unknown".into()),
                message,
            },

            CoreError::Config { message } => CliError::Validation { reason: message },

            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}
