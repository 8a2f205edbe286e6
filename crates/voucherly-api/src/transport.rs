// HTTP client construction shared by the Integration and Legacy clients.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::HeaderMap;
use reqwest::{Certificate, Client, RequestBuilder, Response};

use crate::error::Error;

const USER_AGENT: &str = concat!("voucherly/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How the controller's certificate is checked.
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Platform trust store.
    System,
    /// Trust the PEM bundle at this path in addition to the platform store.
    CustomCa(PathBuf),
    /// No verification. Most controllers ship a self-signed certificate.
    DangerAcceptInvalid,
}

/// Everything needed to build a `reqwest::Client` for one controller.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Applies to the whole request, connect through body.
    pub timeout: Duration,
    /// Session cookies for the Legacy API. `None` for API-key clients.
    pub cookie_jar: Option<Arc<Jar>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: DEFAULT_TIMEOUT,
            cookie_jar: None,
        }
    }
}

impl TransportConfig {
    pub fn build_client(&self) -> Result<Client, Error> {
        self.build_client_with_headers(HeaderMap::new())
    }

    /// Build a client that sends `headers` on every request.
    pub fn build_client_with_headers(&self, headers: HeaderMap) -> Result<Client, Error> {
        let builder = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers);

        let builder = match &self.tls {
            TlsMode::System => builder,
            TlsMode::CustomCa(path) => builder.add_root_certificate(load_ca(path)?),
            TlsMode::DangerAcceptInvalid => builder.danger_accept_invalid_certs(true),
        };

        let builder = match &self.cookie_jar {
            Some(jar) => builder.cookie_provider(Arc::clone(jar)),
            None => builder,
        };

        builder
            .build()
            .map_err(|e| Error::Tls(format!("cannot build HTTP client: {e}")))
    }

    /// Same settings, plus an empty cookie jar.
    pub fn with_cookie_jar(mut self) -> Self {
        self.cookie_jar = Some(Arc::new(Jar::default()));
        self
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout.as_secs()
    }
}

fn load_ca(path: &std::path::Path) -> Result<Certificate, Error> {
    let pem = std::fs::read(path)
        .map_err(|e| Error::Tls(format!("cannot read CA bundle {}: {e}", path.display())))?;
    Certificate::from_pem(&pem).map_err(|e| Error::Tls(format!("bad CA bundle: {e}")))
}

/// Send a request, reporting an elapsed deadline as [`Error::Timeout`].
pub(crate) async fn send(request: RequestBuilder, timeout: Duration) -> Result<Response, Error> {
    request.send().await.map_err(|e| {
        if e.is_timeout() {
            Error::Timeout {
                timeout_secs: timeout.as_secs(),
            }
        } else {
            Error::Transport(e)
        }
    })
}

/// First 200 characters of a response body, for error messages.
pub(crate) fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}

/// Decode a JSON body, keeping the raw text when it doesn't fit `T`.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(body: String) -> Result<T, Error> {
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body starts with {:?})", preview(&body)),
        body,
    })
}
