//! Integration tests for the `voucherly` binary.
//!
//! Local commands run without a controller; controller-backed commands
//! talk to a wiremock Integration API.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SITE: &str = "8c8e4c2b-2a43-4bc4-9e0e-5d9a4cf2e1a0";

// ── Helpers ─────────────────────────────────────────────────────────

/// A command isolated from the user's config files and environment.
fn voucherly(home: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("voucherly");
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("RUST_LOG")
        .env_remove("VOUCHERLY_CONFIG");
    for key in voucherly_config::ENV_KEYS {
        cmd.env_remove(key);
    }
    cmd
}

fn against(home: &TempDir, server: &MockServer) -> assert_cmd::Command {
    let mut cmd = voucherly(home);
    cmd.env("UNIFI_IP", server.uri())
        .env("UNIFI_TOKEN", "key")
        .env("UNIFI_SITE_ID", SITE)
        .env("UNIFI_PLATFORM", "classic")
        .env("UNIFI_INSECURE", "false")
        .env("TIMEOUT", "5");
    cmd
}

fn vouchers_path() -> String {
    format!("/integration/v1/sites/{SITE}/hotspot/vouchers")
}

fn page(data: Vec<Value>) -> ResponseTemplate {
    let count = data.len();
    ResponseTemplate::new(200).set_body_json(json!({
        "offset": 0, "limit": 200, "count": count, "totalCount": count, "data": data
    }))
}

fn voucher(code: &str, expired: bool, guests: u32) -> Value {
    json!({
        "id": "2f3b5c1e-7a5d-4c4e-8f63-3c1f0f9d7a11",
        "code": code,
        "name": "Lobby||;;||web||;;||local||;;||",
        "createdAt": "2024-06-01T10:00:00Z",
        "expired": expired,
        "timeLimitMinutes": 480,
        "authorizedGuestCount": guests,
        "authorizedGuestLimit": 1
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_usage() {
    let home = TempDir::new().unwrap();
    voucherly(&home)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    voucherly(&home).arg("--help").assert().success().stdout(
        predicate::str::contains("create")
            .and(predicate::str::contains("revoke"))
            .and(predicate::str::contains("cleanup"))
            .and(predicate::str::contains("serve")),
    );
}

// ── Local commands ──────────────────────────────────────────────────

#[test]
fn types_render_from_environment() {
    let home = TempDir::new().unwrap();
    voucherly(&home)
        .env("VOUCHER_TYPES", "60,1,,,;1440,0,2048,4096,500;bogus;")
        .args(["types", "-o", "plain"])
        .assert()
        .success()
        .stdout("60,1,,,\n1440,0,2048,4096,500\n");
}

#[test]
fn kiosk_types_table() {
    let home = TempDir::new().unwrap();
    voucherly(&home)
        .env("KIOSK_VOUCHER_TYPES", "120,3,,,;")
        .args(["types", "--kiosk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 hours").and(predicate::str::contains("3 guests")));
}

#[test]
fn config_output_hides_secrets() {
    let home = TempDir::new().unwrap();
    voucherly(&home)
        .env("UNIFI_TOKEN", "very-secret")
        .env("UNIFI_SITE_ID", "branch")
        .args(["config", "-o", "json"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"unifi_site_id\": \"branch\"")
                .and(predicate::str::contains("very-secret").not()),
        );
}

#[test]
fn options_file_in_working_directory_is_read() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join(".options.json"),
        r#"{ "voucher_types": "30,1,,,;" }"#,
    )
    .unwrap();

    voucherly(&home)
        .args(["types", "-o", "plain"])
        .assert()
        .success()
        .stdout("30,1,,,\n");
}

#[test]
fn missing_explicit_config_file_fails() {
    let home = TempDir::new().unwrap();
    voucherly(&home)
        .args(["--config", "does-not-exist.toml", "types"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn controller_commands_need_credentials() {
    let home = TempDir::new().unwrap();
    voucherly(&home)
        .arg("list")
        .assert()
        .code(6)
        .stderr(predicate::str::contains("no controller credentials"));
}

// ── Controller-backed commands ──────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn list_filters_by_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(vouchers_path()))
        .respond_with(page(vec![
            voucher("1111111111", false, 0),
            voucher("2222222222", true, 1),
        ]))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    against(&home, &server)
        .args(["list", "--status", "expired", "-o", "plain"])
        .assert()
        .success()
        .stdout("2222222222\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn create_prints_the_formatted_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(vouchers_path()))
        .and(body_partial_json(json!({ "name": "Lobby||;;||api||;;||local||;;||" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "vouchers": [voucher("1234567890", false, 0)]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(vouchers_path()))
        .respond_with(page(vec![voucher("1234567890", false, 0)]))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    against(&home, &server)
        .args(["create", "--note", "Lobby", "--color", "never"])
        .assert()
        .success()
        .stdout("12345-67890\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn kiosk_create_tags_the_note() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(vouchers_path()))
        .and(body_partial_json(json!({ "name": "||;;||kiosk||;;||local||;;||" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "vouchers": [voucher("1234567890", false, 0)]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(vouchers_path()))
        .respond_with(page(vec![voucher("1234567890", false, 0)]))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    against(&home, &server)
        .args(["create", "--kiosk", "--output", "plain"])
        .assert()
        .success()
        .stdout("1234567890\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_type_is_a_usage_error() {
    let server = MockServer::start().await;

    let home = TempDir::new().unwrap();
    against(&home, &server)
        .args(["create", "--type", "999,1,,,"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown voucher type"));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_sync_exits_with_connection_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(vouchers_path()))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    against(&home, &server).arg("sync").assert().code(7);
}
