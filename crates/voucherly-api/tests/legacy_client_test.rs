#![allow(clippy::unwrap_used)]
// Integration tests for `LegacyClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use voucherly_api::legacy::hotspot::CreateVoucherCommand;
use voucherly_api::{ControllerPlatform, Error, LegacyClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, LegacyClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = LegacyClient::with_client(
        reqwest::Client::new(),
        base_url,
        "default".into(),
        ControllerPlatform::ClassicController,
    );
    (server, client)
}

fn site_path(suffix: &str) -> String {
    format!("/api/s/default/{suffix}")
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_partial_json(json!({ "username": "admin" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "test-password".to_string().into();
    client.login("admin", &secret).await.unwrap();
}

#[tokio::test]
async fn test_login_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(400).set_body_string("api.err.Invalid"))
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "wrong-password".to_string().into();
    let result = client.login("admin", &secret).await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_unauthorized_maps_to_session_expired() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(site_path("stat/voucher")))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.list_vouchers().await.unwrap_err();
    assert!(err.is_auth_expired(), "got: {err:?}");
}

#[tokio::test]
async fn test_login_required_envelope_maps_to_session_expired() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(site_path("stat/voucher")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "error", "msg": "api.err.LoginRequired" },
            "data": []
        })))
        .mount(&server)
        .await;

    let err = client.list_vouchers().await.unwrap_err();
    assert!(matches!(err, Error::SessionExpired), "got: {err:?}");
}

// ── Hotspot tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_list_vouchers() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(site_path("stat/voucher")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "ok" },
            "data": [{
                "_id": "65a1",
                "code": "1234567890",
                "create_time": 1_717_236_000,
                "duration": 480,
                "quota": 1,
                "used": 0,
                "note": "Room 12||;;||web||;;||local||;;||",
                "status": "VALID_ONE"
            }]
        })))
        .mount(&server)
        .await;

    let vouchers = client.list_vouchers().await.unwrap();

    assert_eq!(vouchers.len(), 1);
    assert_eq!(vouchers[0].id, "65a1");
    assert_eq!(vouchers[0].duration, 480);
    assert_eq!(vouchers[0].quota, 1);
    assert!(!vouchers[0].is_expired());
}

#[tokio::test]
async fn test_create_vouchers_returns_batch_time() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(site_path("cmd/hotspot")))
        .and(body_partial_json(json!({
            "cmd": "create-voucher",
            "expire": 60,
            "n": 1,
            "quota": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "ok" },
            "data": [{ "create_time": 1_717_236_000 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let command = CreateVoucherCommand {
        expire: 60,
        n: 1,
        quota: 1,
        note: String::new(),
        up: None,
        down: None,
        bytes: None,
    };
    let create_time = client.create_vouchers(&command).await.unwrap();
    assert_eq!(create_time, 1_717_236_000);
}

#[tokio::test]
async fn test_delete_voucher_error_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(site_path("cmd/hotspot")))
        .and(body_partial_json(json!({ "cmd": "delete-voucher", "_id": "missing" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "error", "msg": "api.err.IdInvalid" },
            "data": []
        })))
        .mount(&server)
        .await;

    let err = client.delete_voucher("missing").await.unwrap_err();
    match err {
        Error::LegacyApi { message } => assert_eq!(message, "api.err.IdInvalid"),
        other => panic!("expected LegacyApi error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_list_guests_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(site_path("stat/guest")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.list_guests().await.unwrap_err();
    assert!(err.is_not_found(), "got: {err:?}");
}

#[tokio::test]
async fn test_unifi_os_prefix() {
    let server = MockServer::start().await;
    let client = LegacyClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        "default".into(),
        ControllerPlatform::UnifiOs,
    );

    Mock::given(method("GET"))
        .and(path("/proxy/network/api/s/default/stat/guest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "ok" },
            "data": [{ "_id": "g1", "mac": "aa:bb:cc:dd:ee:ff", "voucher_code": "1234567890" }]
        })))
        .mount(&server)
        .await;

    let guests = client.list_guests().await.unwrap();
    assert_eq!(guests.len(), 1);
    assert_eq!(guests[0].voucher_code.as_deref(), Some("1234567890"));
}
