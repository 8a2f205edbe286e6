// Shared wiremock fixtures for the voucherly-core integration tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::time::Duration;

use serde_json::{Value, json};
use url::Url;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use voucherly_api::ControllerPlatform;
use voucherly_core::{AuthCredentials, ServiceConfig, TlsVerification};

pub const SITE_UUID: &str = "8c8e4c2b-2a43-4bc4-9e0e-5d9a4cf2e1a0";

fn base_config(server: &MockServer, auth: AuthCredentials) -> ServiceConfig {
    let mut config = ServiceConfig::new(Url::parse(&server.uri()).unwrap(), auth);
    config.platform = Some(ControllerPlatform::ClassicController);
    config.tls = TlsVerification::SystemDefaults;
    config.timeout = Duration::from_secs(5);
    config.refresh_interval = Duration::ZERO;
    config
}

/// Session-login (Legacy API) config for site `default`.
pub fn legacy_config(server: &MockServer) -> ServiceConfig {
    base_config(
        server,
        AuthCredentials::Credentials {
            username: "admin".into(),
            password: "secret".to_string().into(),
        },
    )
}

/// API-key (Integration API) config with the site given as a UUID.
pub fn integration_config(server: &MockServer) -> ServiceConfig {
    let mut config = base_config(server, AuthCredentials::ApiKey("key".to_string().into()));
    config.site = SITE_UUID.into();
    config
}

pub fn site_uuid() -> Uuid {
    Uuid::parse_str(SITE_UUID).unwrap()
}

pub fn site_path(suffix: &str) -> String {
    format!("/api/s/default/{suffix}")
}

pub fn integration_vouchers_path() -> String {
    format!("/integration/v1/sites/{SITE_UUID}/hotspot/vouchers")
}

pub fn ok_envelope(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "meta": { "rc": "ok" }, "data": data }))
}

pub async fn mount_login(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(times)
        .mount(server)
        .await;
}

pub fn legacy_voucher(id: &str, code: &str, create_time: i64, used: i64, status: &str) -> Value {
    json!({
        "_id": id,
        "code": code,
        "create_time": create_time,
        "duration": 480,
        "quota": 1,
        "used": used,
        "note": "",
        "status": status
    })
}

pub fn integration_voucher(id: Uuid, code: &str, minutes: i64, expired: bool) -> Value {
    json!({
        "id": id,
        "code": code,
        "name": "Lobby||;;||api||;;||local||;;||",
        "createdAt": "2024-06-01T10:00:00Z",
        "expired": expired,
        "timeLimitMinutes": minutes,
        "authorizedGuestCount": 0,
        "authorizedGuestLimit": 1
    })
}

pub fn integration_page(data: Vec<Value>) -> ResponseTemplate {
    let count = data.len();
    ResponseTemplate::new(200).set_body_json(json!({
        "offset": 0,
        "limit": 200,
        "count": count,
        "totalCount": count,
        "data": data
    }))
}
