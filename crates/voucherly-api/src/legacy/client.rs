// Transport for the cookie-authenticated controller API.
//
// Every reply is a `{ meta: { rc, msg }, data: [...] }` envelope; callers
// only ever see `data`.

use std::sync::RwLock;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::legacy::models::LegacyResponse;
use crate::platform::ControllerPlatform;
use crate::transport::{self, TransportConfig};

/// `meta.msg` the controller sends once the session cookie is gone.
const LOGIN_REQUIRED: &str = "api.err.LoginRequired";

/// Client for one site on a controller, authenticated by session cookie.
///
/// Obtain a session with [`LegacyClient::login`]. On UniFi OS the client
/// also tracks the CSRF token that the `/proxy/network/` path demands on
/// every write.
pub struct LegacyClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: Url,
    pub(crate) platform: ControllerPlatform,
    pub(crate) timeout: Duration,
    site: String,
    csrf: RwLock<Option<String>>,
}

impl LegacyClient {
    /// Build a client with its own cookie jar. `base_url` is the
    /// controller root, e.g. `https://192.168.1.1`.
    pub fn new(
        base_url: Url,
        site: String,
        platform: ControllerPlatform,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = match transport.cookie_jar {
            Some(_) => transport.build_client()?,
            None => transport.clone().with_cookie_jar().build_client()?,
        };
        let mut client = Self::with_client(http, base_url, site, platform);
        client.timeout = transport.timeout;
        Ok(client)
    }

    /// Wrap a prepared `reqwest::Client`. It needs a cookie store for
    /// `login` to have any effect.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        site: String,
        platform: ControllerPlatform,
    ) -> Self {
        Self {
            http,
            base_url,
            platform,
            timeout: TransportConfig::default().timeout,
            site,
            csrf: RwLock::new(None),
        }
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn platform(&self) -> ControllerPlatform {
        self.platform
    }

    /// Remember a CSRF token if the reply carried one.
    pub(crate) fn capture_csrf(&self, headers: &HeaderMap) {
        let token = ["X-Updated-CSRF-Token", "X-CSRF-Token"]
            .iter()
            .find_map(|name| headers.get(*name))
            .and_then(|v| v.to_str().ok());
        let Some(token) = token else {
            return;
        };

        if let Ok(mut slot) = self.csrf.write() {
            trace!("CSRF token updated");
            *slot = Some(token.to_owned());
        }
    }

    fn with_csrf(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.csrf.read().ok().and_then(|slot| slot.clone());
        match token {
            Some(token) => request.header("X-CSRF-Token", token),
            None => request,
        }
    }

    /// `{base}{platform prefix}/api/s/{site}/{path}`
    pub(crate) fn site_url(&self, path: &str) -> Result<Url, Error> {
        let root = self.base_url.as_str().trim_end_matches('/');
        let prefix = self.platform.legacy_prefix();
        Ok(Url::parse(&format!(
            "{root}{prefix}/api/s/{}/{path}",
            self.site
        ))?)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, Error> {
        self.call(Method::GET, url, None::<&()>).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<Vec<T>, Error> {
        self.call(Method::POST, url, Some(body)).await
    }

    async fn call<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Vec<T>, Error> {
        debug!(%method, %url, "legacy request");
        let mut request = self.http.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }
        if method != Method::GET {
            request = self.with_csrf(request);
        }

        let resp = transport::send(request, self.timeout).await?;
        self.capture_csrf(resp.headers());
        unwrap_envelope(resp).await
    }
}

/// UniFi OS reports some failures as `{"error": {...}}` with HTTP 200.
#[derive(Deserialize)]
struct OsErrorReply {
    error: OsError,
}

#[derive(Deserialize)]
struct OsError {
    code: u16,
    #[serde(default)]
    message: String,
}

async fn unwrap_envelope<T: DeserializeOwned>(resp: Response) -> Result<Vec<T>, Error> {
    let status = resp.status();
    match status {
        StatusCode::UNAUTHORIZED => return Err(Error::SessionExpired),
        StatusCode::NOT_FOUND => {
            return Err(Error::NotFound {
                message: format!("HTTP {status}"),
            });
        }
        _ => {}
    }

    let body = resp.text().await?;
    if !status.is_success() {
        return Err(Error::LegacyApi {
            message: format!("HTTP {status}: {}", transport::preview(&body)),
        });
    }

    if let Ok(OsErrorReply { error }) = serde_json::from_str(&body) {
        return Err(if error.code == StatusCode::UNAUTHORIZED.as_u16() {
            Error::Authentication {
                message: error.message,
            }
        } else {
            Error::LegacyApi {
                message: format!("UniFi OS error {}: {}", error.code, error.message),
            }
        });
    }

    let envelope: LegacyResponse<T> = transport::decode(body)?;
    if envelope.meta.rc == "ok" {
        return Ok(envelope.data);
    }

    match envelope.meta.msg {
        Some(msg) if msg == LOGIN_REQUIRED => Err(Error::SessionExpired),
        Some(message) => Err(Error::LegacyApi { message }),
        None => Err(Error::LegacyApi {
            message: format!("rc={}", envelope.meta.rc),
        }),
    }
}
