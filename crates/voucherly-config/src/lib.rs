//! Configuration for voucherly.
//!
//! Settings are layered with `figment`, lowest priority first: built-in
//! defaults, the TOML config file, the add-on options file
//! (`/data/options.json`, then `./.options.json`), and finally plain
//! environment variables (`UNIFI_IP`, `VOUCHER_TYPES`, ...). The result is
//! translated into a `voucherly_core::ServiceConfig`, which never touches
//! disk itself.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use voucherly_core::grammar::{self, DEFAULT_VOUCHER_TYPES};
use voucherly_core::{
    AuthCredentials, CleanupPolicy, ControllerPlatform, ServiceConfig, TlsVerification,
};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no controller credentials configured (set UNIFI_TOKEN, or UNIFI_USERNAME and UNIFI_PASSWORD)")]
    NoCredentials,

    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings ────────────────────────────────────────────────────────

/// Add-on options files, in increasing priority.
pub const OPTIONS_FILES: [&str; 2] = ["/data/options.json", ".options.json"];

/// Environment variables read verbatim (lowercased to the field name).
pub const ENV_KEYS: &[&str] = &[
    "UNIFI_IP",
    "UNIFI_PORT",
    "UNIFI_TOKEN",
    "UNIFI_USERNAME",
    "UNIFI_PASSWORD",
    "UNIFI_SITE_ID",
    "UNIFI_PLATFORM",
    "UNIFI_INSECURE",
    "VOUCHER_TYPES",
    "KIOSK_VOUCHER_TYPES",
    "LOG_LEVEL",
    "CACHE_REFRESH_INTERVAL",
    "CLEANUP_EXPIRED",
    "CLEANUP_UNUSED",
    "SESSION_LIFETIME",
    "TIMEOUT",
];

/// Flat settings, keyed the same way in every layer.
///
/// Secrets are never serialized back out.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Controller host name or IP. A full `https://...` URL is accepted too.
    pub unifi_ip: String,
    pub unifi_port: u16,
    /// Integration API key. When set, the Integration API is used.
    #[serde(skip_serializing)]
    pub unifi_token: Option<SecretString>,
    pub unifi_username: Option<String>,
    #[serde(skip_serializing)]
    pub unifi_password: Option<SecretString>,
    /// Site name, or a site UUID for the Integration API.
    pub unifi_site_id: String,
    /// `auto`, `unifi-os` or `classic`.
    pub unifi_platform: String,
    /// Accept self-signed controller certificates.
    pub unifi_insecure: bool,
    /// Custom CA bundle; ignored when `unifi_insecure` is set.
    pub unifi_ca_cert: Option<PathBuf>,
    pub voucher_types: String,
    pub kiosk_voucher_types: String,
    pub log_level: String,
    /// Seconds between background refreshes; 0 disables them.
    pub cache_refresh_interval: u64,
    pub cleanup_expired: bool,
    pub cleanup_unused: bool,
    /// Seconds after which a session is proactively replaced.
    pub session_lifetime: Option<u64>,
    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unifi_ip: "192.168.1.1".into(),
            unifi_port: 443,
            unifi_token: None,
            unifi_username: None,
            unifi_password: None,
            unifi_site_id: "default".into(),
            unifi_platform: "auto".into(),
            unifi_insecure: true,
            unifi_ca_cert: None,
            voucher_types: DEFAULT_VOUCHER_TYPES.into(),
            kiosk_voucher_types: DEFAULT_VOUCHER_TYPES.into(),
            log_level: "info".into(),
            cache_refresh_interval: 900,
            cleanup_expired: true,
            cleanup_unused: false,
            session_lifetime: None,
            timeout: 30,
        }
    }
}

impl Config {
    /// Controller root URL.
    pub fn controller_url(&self) -> Result<Url, ConfigError> {
        let host = self.unifi_ip.trim();
        if host.is_empty() {
            return Err(ConfigError::Validation {
                field: "unifi_ip".into(),
                reason: "must not be empty".into(),
            });
        }

        let raw = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_owned()
        } else {
            format!("https://{host}:{}", self.unifi_port)
        };

        raw.parse().map_err(|_| ConfigError::Validation {
            field: "unifi_ip".into(),
            reason: format!("invalid controller address: {raw}"),
        })
    }

    /// Pick the auth mode from whichever secrets are present.
    ///
    /// An API key wins; otherwise both username and password are needed.
    pub fn auth(&self) -> Result<AuthCredentials, ConfigError> {
        if let Some(token) = non_blank_secret(self.unifi_token.as_ref()) {
            return Ok(AuthCredentials::ApiKey(token.clone()));
        }

        let username = self
            .unifi_username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty());
        match (username, non_blank_secret(self.unifi_password.as_ref())) {
            (Some(username), Some(password)) => Ok(AuthCredentials::Credentials {
                username: username.to_owned(),
                password: password.clone(),
            }),
            _ => Err(ConfigError::NoCredentials),
        }
    }

    /// `None` means probe the controller on first login.
    pub fn platform(&self) -> Result<Option<ControllerPlatform>, ConfigError> {
        match self.unifi_platform.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(None),
            "unifi-os" | "unifios" | "unifi_os" => Ok(Some(ControllerPlatform::UnifiOs)),
            "classic" | "standalone" => Ok(Some(ControllerPlatform::ClassicController)),
            other => Err(ConfigError::Validation {
                field: "unifi_platform".into(),
                reason: format!("expected 'auto', 'unifi-os' or 'classic', got '{other}'"),
            }),
        }
    }

    pub fn tls(&self) -> TlsVerification {
        if self.unifi_insecure {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ref ca) = self.unifi_ca_cert {
            TlsVerification::CustomCa(ca.clone())
        } else {
            TlsVerification::SystemDefaults
        }
    }

    /// Build the runtime service config.
    pub fn to_service_config(&self) -> Result<ServiceConfig, ConfigError> {
        let voucher_types = grammar::parse_all(&self.voucher_types);
        if voucher_types.is_empty() {
            return Err(ConfigError::Validation {
                field: "voucher_types".into(),
                reason: format!("no valid voucher type in {:?}", self.voucher_types),
            });
        }
        if self.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }

        let mut config = ServiceConfig::new(self.controller_url()?, self.auth()?);
        config.site = self.unifi_site_id.trim().to_owned();
        config.platform = self.platform()?;
        config.tls = self.tls();
        config.timeout = Duration::from_secs(self.timeout);
        config.session_lifetime = self
            .session_lifetime
            .filter(|s| *s > 0)
            .map(Duration::from_secs);
        config.voucher_types = voucher_types;
        config.kiosk_voucher_types = grammar::parse_all(&self.kiosk_voucher_types);
        config.refresh_interval = Duration::from_secs(self.cache_refresh_interval);
        config.cleanup = CleanupPolicy {
            expired: self.cleanup_expired,
            unused: self.cleanup_unused,
        };
        Ok(config)
    }

    /// The effective settings as TOML, without secrets.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn non_blank_secret(secret: Option<&SecretString>) -> Option<&SecretString> {
    secret.filter(|s| !s.expose_secret().trim().is_empty())
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "voucherly", "voucherly").map_or_else(
        || PathBuf::from(".voucherly.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Loading ─────────────────────────────────────────────────────────

/// Where settings are read from.
#[derive(Debug, Clone)]
pub struct ConfigSources {
    /// TOML file; a missing file is skipped unless `file_required`.
    pub file: PathBuf,
    pub file_required: bool,
    /// JSON option files, lowest priority first. Missing files are skipped.
    pub options: Vec<PathBuf>,
    /// Read the process environment last.
    pub env: bool,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            file: config_path(),
            file_required: false,
            options: OPTIONS_FILES.iter().map(PathBuf::from).collect(),
            env: true,
        }
    }
}

impl ConfigSources {
    /// Default sources, but with an explicit TOML file that must exist.
    pub fn with_file(path: impl AsRef<Path>) -> Self {
        Self {
            file: path.as_ref().to_path_buf(),
            file_required: true,
            ..Self::default()
        }
    }

    /// Only the given TOML file and nothing else.
    pub fn file_only(path: impl AsRef<Path>) -> Self {
        Self {
            file: path.as_ref().to_path_buf(),
            file_required: true,
            options: Vec::new(),
            env: false,
        }
    }

    pub fn figment(&self) -> Figment {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&self.file));

        for path in &self.options {
            figment = figment.merge(Json::file(path));
        }
        if self.env {
            figment = figment.merge(Env::raw().only(ENV_KEYS));
        }
        figment
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.file_required && !self.file.is_file() {
            return Err(ConfigError::NotFound {
                path: self.file.clone(),
            });
        }
        Ok(self.figment().extract()?)
    }
}
