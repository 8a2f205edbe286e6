// Client for the hotspot voucher and site endpoints under `/integration/v1/`.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use super::types::{
    Page, SiteResponse, VoucherCreateRequest, VoucherCreateResponse, VoucherDeletionResults,
    VoucherResponse,
};
use crate::error::Error;
use crate::platform::ControllerPlatform;
use crate::transport::{self, TransportConfig};

/// Async client for the UniFi Network Integration API.
///
/// Every request carries the `X-API-KEY` header; there is no session to
/// keep alive, so a 401 always means the key itself was rejected.
pub struct IntegrationClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl IntegrationClient {
    /// Build a client that authenticates with `api_key`.
    pub fn from_api_key(
        base_url: &str,
        api_key: &SecretString,
        transport: &TransportConfig,
        platform: ControllerPlatform,
    ) -> Result<Self, Error> {
        let mut key = HeaderValue::from_str(api_key.expose_secret()).map_err(|e| {
            Error::Authentication {
                message: format!("API key is not a valid header value: {e}"),
            }
        })?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("X-API-KEY", key);

        Ok(Self {
            http: transport.build_client_with_headers(headers)?,
            base_url: integration_root(base_url, platform)?,
            timeout: transport.timeout,
        })
    }

    /// Use a caller-built `reqwest::Client`, which must add its own auth.
    pub fn from_reqwest(
        base_url: &str,
        http: reqwest::Client,
        platform: ControllerPlatform,
    ) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: integration_root(base_url, platform)?,
            timeout: TransportConfig::default().timeout,
        })
    }

    /// Root of the API; always ends in `/integration/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(reqwest::RequestBuilder) -> reqwest::RequestBuilder,
    ) -> Result<T, Error> {
        let url = self.base_url.join(path)?;
        debug!(%method, %url, "integration request");

        let resp = transport::send(build(self.http.request(method, url)), self.timeout).await?;
        let status = resp.status();
        let body = resp.text().await?;

        if status.is_success() {
            transport::decode(body)
        } else {
            Err(error_from_reply(status, &body))
        }
    }

    /// Walk `offset`/`limit` pages until the controller has nothing more.
    pub async fn paginate_all<T, F, Fut>(&self, limit: i32, fetch: F) -> Result<Vec<T>, Error>
    where
        F: Fn(i64, i32) -> Fut,
        Fut: Future<Output = Result<Page<T>, Error>>,
    {
        let page_size = usize::try_from(limit).unwrap_or(0);
        let mut items = Vec::new();

        loop {
            let offset = i64::try_from(items.len()).unwrap_or(i64::MAX);
            let page = fetch(offset, limit).await?;
            let got = page.data.len();
            items.extend(page.data);

            let total = usize::try_from(page.total_count).unwrap_or(0);
            if got == 0 || got < page_size || items.len() >= total {
                return Ok(items);
            }
        }
    }

    pub async fn list_sites(&self, offset: i64, limit: i32) -> Result<Page<SiteResponse>, Error> {
        self.request(Method::GET, "v1/sites", |r| {
            r.query(&[("offset", offset), ("limit", i64::from(limit))])
        })
        .await
    }

    pub async fn list_vouchers(
        &self,
        site_id: &Uuid,
        offset: i64,
        limit: i32,
    ) -> Result<Page<VoucherResponse>, Error> {
        self.request(Method::GET, &vouchers_path(site_id), |r| {
            r.query(&[("offset", offset), ("limit", i64::from(limit))])
        })
        .await
    }

    pub async fn create_vouchers(
        &self,
        site_id: &Uuid,
        body: &VoucherCreateRequest,
    ) -> Result<VoucherCreateResponse, Error> {
        self.request(Method::POST, &vouchers_path(site_id), |r| r.json(body))
            .await
    }

    pub async fn delete_voucher(
        &self,
        site_id: &Uuid,
        voucher_id: &Uuid,
    ) -> Result<VoucherDeletionResults, Error> {
        let path = format!("{}/{voucher_id}", vouchers_path(site_id));
        self.request(Method::DELETE, &path, |r| r).await
    }
}

fn vouchers_path(site_id: &Uuid) -> String {
    format!("v1/sites/{site_id}/hotspot/vouchers")
}

/// `https://host` becomes `https://host/proxy/network/integration/` on
/// UniFi OS and `https://host/integration/` elsewhere. A URL that already
/// points at `/integration` is kept.
fn integration_root(raw: &str, platform: ControllerPlatform) -> Result<Url, Error> {
    let mut url = Url::parse(raw)?;
    let path = url.path().trim_end_matches('/').to_owned();
    let root = if path.ends_with("/integration") {
        format!("{path}/")
    } else {
        format!("{path}{}/", platform.integration_prefix())
    };
    url.set_path(&root);
    Ok(url)
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<String>,
}

fn error_from_reply(status: StatusCode, body: &str) -> Error {
    if status == StatusCode::UNAUTHORIZED {
        return Error::InvalidApiKey;
    }

    let parsed = serde_json::from_str::<ErrorBody>(body).ok();
    let (message, code) = match parsed {
        Some(ErrorBody { message, code }) => (message, code),
        None if body.is_empty() => (None, None),
        None => (Some(transport::preview(body)), None),
    };

    Error::Integration {
        message: message.unwrap_or_else(|| status.to_string()),
        code,
        status: status.as_u16(),
    }
}
