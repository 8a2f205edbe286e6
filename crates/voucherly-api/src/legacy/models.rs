// Legacy API response types
//
// Models for the UniFi controller's legacy JSON API. All responses are wrapped
// in the `LegacyResponse<T>` envelope. Fields use `#[serde(default)]` liberally
// because the API is inconsistent about field presence across firmware versions.

use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard UniFi legacy API response envelope.
///
/// Every legacy endpoint wraps its payload:
/// ```json
/// { "meta": { "rc": "ok", "msg": "optional" }, "data": [...] }
/// ```
#[derive(Debug, Deserialize)]
pub struct LegacyResponse<T> {
    pub meta: Meta,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Metadata from the legacy envelope. `rc` == `"ok"` means success.
#[derive(Debug, Deserialize)]
pub struct Meta {
    pub rc: String,
    #[serde(default)]
    pub msg: Option<String>,
}

// ── Hotspot ──────────────────────────────────────────────────────────

/// Voucher object from `stat/voucher`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyVoucher {
    #[serde(rename = "_id")]
    pub id: String,
    pub code: String,
    /// Unix seconds.
    pub create_time: i64,
    /// Validity once redeemed, in minutes.
    #[serde(default)]
    pub duration: i64,
    /// 0 = unlimited, 1 = single-use, n = n guests.
    #[serde(default)]
    pub quota: i64,
    /// Number of guests that have redeemed the voucher.
    #[serde(default)]
    pub used: i64,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub qos_overwrite: bool,
    #[serde(default)]
    pub qos_rate_max_up: Option<i64>,
    #[serde(default)]
    pub qos_rate_max_down: Option<i64>,
    /// Data cap in megabytes.
    #[serde(default)]
    pub qos_usage_quota: Option<i64>,
    /// e.g. `VALID_ONE`, `VALID_MULTI`, `USED_MULTIPLE`, `EXPIRED`.
    #[serde(default)]
    pub status: Option<String>,
    /// Seconds until the voucher expires, once activated.
    #[serde(default)]
    pub status_expires: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LegacyVoucher {
    /// The controller reports expiry through the status string only.
    pub fn is_expired(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("EXPIRED"))
    }
}

/// Entry returned by `cmd/hotspot` `create-voucher`.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyVoucherBatch {
    pub create_time: i64,
}

/// Guest authorization from `stat/guest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyGuest {
    #[serde(rename = "_id")]
    pub id: String,
    pub mac: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub voucher_code: Option<String>,
    #[serde(default)]
    pub voucher_id: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    pub start: Option<i64>,
    /// Unix seconds.
    #[serde(default)]
    pub end: Option<i64>,
    #[serde(default)]
    pub expired: bool,
    #[serde(default)]
    pub tx_bytes: Option<i64>,
    #[serde(default)]
    pub rx_bytes: Option<i64>,
}
