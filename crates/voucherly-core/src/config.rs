// ── Runtime service configuration ──
//
// Describes how to reach the controller and how the service maintains its
// cache. Carries credentials but never touches disk; `voucherly-config`
// (or a test) builds one and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;
use voucherly_api::ControllerPlatform;

use crate::grammar::{self, DEFAULT_VOUCHER_TYPES, VoucherTypeSpec};

/// How to authenticate with the controller.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// Integration API key (`X-API-KEY`).
    ApiKey(SecretString),
    /// Legacy cookie session.
    Credentials {
        username: String,
        password: SecretString,
    },
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification. Default, since controllers ship self-signed.
    #[default]
    DangerAcceptInvalid,
}

/// Which cleanup sweeps the background task runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupPolicy {
    pub expired: bool,
    pub unused: bool,
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self {
            expired: true,
            unused: false,
        }
    }
}

/// Everything the service needs to run.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Controller root, e.g. `https://192.168.1.1`.
    pub url: Url,
    pub auth: AuthCredentials,
    /// Site name (`default`) or Integration API site UUID.
    pub site: String,
    /// `None` probes the controller on first login.
    pub platform: Option<ControllerPlatform>,
    pub tls: TlsVerification,
    /// Upper bound for every remote call.
    pub timeout: Duration,
    /// Retire sessions shortly before this age. `None` = only on 401.
    pub session_lifetime: Option<Duration>,
    pub voucher_types: Vec<VoucherTypeSpec>,
    pub kiosk_voucher_types: Vec<VoucherTypeSpec>,
    /// Background refresh + sweep period. Zero disables the task.
    pub refresh_interval: Duration,
    pub cleanup: CleanupPolicy,
}

impl ServiceConfig {
    /// Config with the stock defaults for everything but the connection.
    pub fn new(url: Url, auth: AuthCredentials) -> Self {
        Self {
            url,
            auth,
            site: "default".into(),
            platform: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            session_lifetime: None,
            voucher_types: grammar::parse_all(DEFAULT_VOUCHER_TYPES),
            kiosk_voucher_types: grammar::parse_all(DEFAULT_VOUCHER_TYPES),
            refresh_interval: Duration::from_secs(900),
            cleanup: CleanupPolicy::default(),
        }
    }
}
