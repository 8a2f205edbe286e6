#![allow(clippy::unwrap_used)]
// Refresh coalescing and snapshot retention of `VoucherCache`.

mod common;

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use voucherly_core::{EntityId, SessionManager, VoucherCache, VoucherClient};

use common::{legacy_config, legacy_voucher, mount_login, ok_envelope, site_path};

fn cache_for(server: &MockServer) -> VoucherCache {
    let sessions = Arc::new(SessionManager::new(&legacy_config(server)));
    VoucherCache::new(Arc::new(VoucherClient::new(sessions)))
}

async fn mount_guests(server: &MockServer, guests: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(site_path("stat/guest")))
        .respond_with(ok_envelope(guests))
        .mount(server)
        .await;
}

#[tokio::test]
async fn concurrent_refreshes_share_one_list_call() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(site_path("stat/voucher")))
        .respond_with(ok_envelope(json!([legacy_voucher(
            "v1",
            "1234567890",
            1_717_236_000,
            0,
            "VALID_ONE"
        )])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(site_path("stat/guest")))
        .respond_with(ok_envelope(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    tokio::join!(cache.refresh(), cache.refresh());

    assert_eq!(cache.snapshot().vouchers.len(), 1);
}

#[tokio::test]
async fn sequential_refreshes_each_hit_the_controller() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(site_path("stat/voucher")))
        .respond_with(ok_envelope(json!([])))
        .expect(2)
        .mount(&server)
        .await;
    mount_guests(&server, json!([])).await;

    let cache = cache_for(&server);
    cache.refresh().await;
    cache.refresh().await;
}

#[tokio::test]
async fn snapshot_is_newest_first() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(site_path("stat/voucher")))
        .respond_with(ok_envelope(json!([
            legacy_voucher("old", "1111111111", 1_700_000_000, 0, "VALID_ONE"),
            legacy_voucher("new", "3333333333", 1_720_000_000, 0, "VALID_ONE"),
            legacy_voucher("mid", "2222222222", 1_710_000_000, 0, "VALID_ONE"),
        ])))
        .mount(&server)
        .await;
    mount_guests(&server, json!([])).await;

    let cache = cache_for(&server);
    cache.refresh().await;

    let ids: Vec<String> = cache
        .snapshot()
        .vouchers
        .iter()
        .map(|v| v.id.to_string())
        .collect();
    assert_eq!(ids, ["new", "mid", "old"]);
}

#[tokio::test]
async fn failed_refresh_keeps_previous_snapshot() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(site_path("stat/voucher")))
        .respond_with(ok_envelope(json!([
            legacy_voucher("a", "1111111111", 1_700_000_000, 0, "VALID_ONE"),
            legacy_voucher("b", "2222222222", 1_700_000_100, 0, "VALID_ONE"),
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(site_path("stat/voucher")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_guests(&server, json!([])).await;

    let cache = cache_for(&server);
    cache.refresh().await;
    let before = cache.snapshot();
    assert_eq!(before.vouchers.len(), 2);
    assert!(before.updated_at.is_some());

    cache.refresh().await;
    let after = cache.snapshot();
    assert!(Arc::ptr_eq(&before, &after));
}

#[tokio::test]
async fn failed_guest_refresh_keeps_previous_guests() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(site_path("stat/voucher")))
        .respond_with(ok_envelope(json!([legacy_voucher(
            "v1",
            "1234567890",
            1_717_236_000,
            1,
            "USED_MULTIPLE"
        )])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(site_path("stat/guest")))
        .respond_with(ok_envelope(json!([{
            "_id": "g1",
            "mac": "aa:bb:cc:dd:ee:ff",
            "voucher_code": "1234567890"
        }])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(site_path("stat/guest")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    cache.refresh().await;
    let first = cache.snapshot();
    cache.refresh().await;
    let second = cache.snapshot();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(second.vouchers.len(), 1);
    assert_eq!(second.guests, first.guests);
    assert_eq!(second.guests_for("1234567890").len(), 1);
    assert!(second.voucher(&EntityId::from("v1")).is_some());
}

#[tokio::test]
async fn missing_guest_endpoint_yields_no_guests() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(site_path("stat/voucher")))
        .respond_with(ok_envelope(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(site_path("stat/guest")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    cache.refresh().await;

    let snapshot = cache.snapshot();
    assert!(snapshot.guests.is_empty());
    assert!(snapshot.updated_at.is_some());
}

#[tokio::test]
async fn subscribers_see_published_snapshots() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(site_path("stat/voucher")))
        .respond_with(ok_envelope(json!([legacy_voucher(
            "v1",
            "1234567890",
            1_717_236_000,
            0,
            "VALID_ONE"
        )])))
        .mount(&server)
        .await;
    mount_guests(&server, json!([])).await;

    let cache = cache_for(&server);
    let mut rx = cache.subscribe();
    assert!(rx.borrow_and_update().updated_at.is_none());

    cache.refresh().await;

    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().vouchers.len(), 1);
}
