// Integration API request/response types
//
// Field names are pinned to the Network Integration API v1 contract:
// UUID `id`, camelCase keys, ISO 8601 timestamps.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ── Pagination ───────────────────────────────────────────────────────

/// Paged list envelope returned by every `GET` collection endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub offset: i64,
    pub limit: i32,
    pub count: i32,
    pub total_count: i64,
    pub data: Vec<T>,
}

// ── Sites ────────────────────────────────────────────────────────────

/// Site overview (from `GET /v1/sites`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteResponse {
    pub id: Uuid,
    pub name: String,
    /// The legacy site name (`/api/s/{internalReference}/`), e.g. `default`.
    pub internal_reference: String,
}

// ── Hotspot Vouchers ─────────────────────────────────────────────────

/// Hotspot voucher (from `GET /v1/sites/{siteId}/hotspot/vouchers`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherResponse {
    pub id: Uuid,
    pub code: String,
    /// The voucher's free-text slot. Carries the packed note.
    #[serde(default)]
    pub name: Option<String>,
    /// ISO 8601 date-time.
    pub created_at: String,
    /// ISO 8601 date-time.
    #[serde(default)]
    pub activated_at: Option<String>,
    /// ISO 8601 date-time.
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub expired: bool,
    pub time_limit_minutes: i64,
    #[serde(default)]
    pub authorized_guest_count: i64,
    #[serde(default)]
    pub authorized_guest_limit: Option<i64>,
    #[serde(default)]
    pub data_usage_limit_m_bytes: Option<i64>,
    #[serde(default)]
    pub rx_rate_limit_kbps: Option<i64>,
    #[serde(default)]
    pub tx_rate_limit_kbps: Option<i64>,
}

/// Create hotspot voucher(s).
///
/// Optional limits are omitted from the body entirely when unset; the
/// controller treats a missing key as "unlimited".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherCreateRequest {
    pub name: String,
    /// Number of vouchers to create.
    pub count: u32,
    pub time_limit_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorized_guest_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_usage_limit_m_bytes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_rate_limit_kbps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_rate_limit_kbps: Option<u32>,
}

/// Response to a voucher creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherCreateResponse {
    #[serde(default)]
    pub vouchers: Vec<VoucherResponse>,
}

/// Voucher deletion results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherDeletionResults {
    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
}
