// ── API-to-domain type conversions ──
//
// Bridges raw `voucherly_api` response types into the domain model. Both
// surfaces land on the same `Voucher`; numeric fields the controller sends
// as signed integers are clamped into range rather than trusted.

use chrono::{DateTime, Utc};

use voucherly_api::integration_types::VoucherResponse;
use voucherly_api::legacy::models::{LegacyGuest, LegacyVoucher};

use crate::model::{EntityId, Guest, Voucher};

// ── Helpers ────────────────────────────────────────────────────────

fn epoch_to_datetime(epoch: Option<i64>) -> Option<DateTime<Utc>> {
    epoch.and_then(|ts| DateTime::from_timestamp(ts, 0))
}

fn parse_iso(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// Limits: absent, zero and negative all mean "no limit".
fn limit_u32(value: Option<i64>) -> Option<u32> {
    value.filter(|&v| v > 0).map(to_u32)
}

fn limit_u64(value: Option<i64>) -> Option<u64> {
    value.filter(|&v| v > 0).and_then(|v| u64::try_from(v).ok())
}

// ── Voucher ──────────────────────────────────────────────────────

impl From<VoucherResponse> for Voucher {
    fn from(v: VoucherResponse) -> Self {
        Voucher {
            id: EntityId::Uuid(v.id),
            code: v.code,
            note: v.name.filter(|n| !n.is_empty()),
            created_at: parse_iso(&v.created_at),
            activated_at: v.activated_at.as_deref().and_then(parse_iso),
            expires_at: v.expires_at.as_deref().and_then(parse_iso),
            expired: v.expired,
            time_limit_minutes: to_u32(v.time_limit_minutes),
            guest_limit: limit_u32(v.authorized_guest_limit),
            guest_count: to_u32(v.authorized_guest_count),
            data_limit_megabytes: limit_u64(v.data_usage_limit_m_bytes),
            // rx/tx are from the access point's point of view.
            upload_limit_kbps: limit_u64(v.tx_rate_limit_kbps),
            download_limit_kbps: limit_u64(v.rx_rate_limit_kbps),
        }
    }
}

impl From<LegacyVoucher> for Voucher {
    fn from(v: LegacyVoucher) -> Self {
        let expired = v.is_expired();
        Voucher {
            id: EntityId::from(v.id),
            code: v.code,
            note: v.note.filter(|n| !n.is_empty()),
            created_at: epoch_to_datetime(Some(v.create_time)),
            activated_at: None,
            expires_at: None,
            expired,
            time_limit_minutes: to_u32(v.duration),
            guest_limit: limit_u32(Some(v.quota)),
            guest_count: to_u32(v.used),
            data_limit_megabytes: limit_u64(v.qos_usage_quota),
            upload_limit_kbps: limit_u64(v.qos_rate_max_up),
            download_limit_kbps: limit_u64(v.qos_rate_max_down),
        }
    }
}

// ── Guest ────────────────────────────────────────────────────────

impl From<LegacyGuest> for Guest {
    fn from(g: LegacyGuest) -> Self {
        Guest {
            id: EntityId::from(g.id),
            mac: g.mac.to_lowercase().replace('-', ":"),
            hostname: g.hostname,
            voucher_code: g.voucher_code,
            voucher_id: g.voucher_id.map(EntityId::from),
            authorized_at: epoch_to_datetime(g.start),
            expires_at: epoch_to_datetime(g.end),
            expired: g.expired,
            tx_bytes: g.tx_bytes.and_then(|b| u64::try_from(b).ok()),
            rx_bytes: g.rx_bytes.and_then(|b| u64::try_from(b).ok()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn integration_voucher_maps_rates_by_direction() {
        let raw: VoucherResponse = serde_json::from_value(json!({
            "id": "8c8e4c2b-2a43-4bc4-9e0e-5d9a4cf2e1a0",
            "code": "1234567890",
            "name": "",
            "createdAt": "2024-06-01T10:00:00Z",
            "timeLimitMinutes": 60,
            "authorizedGuestLimit": 1,
            "authorizedGuestCount": 0,
            "txRateLimitKbps": 1024,
            "rxRateLimitKbps": 4096
        }))
        .unwrap();

        let v = Voucher::from(raw);
        assert!(v.id.as_uuid().is_some());
        assert_eq!(v.note, None);
        assert_eq!(v.time_limit_minutes, 60);
        assert_eq!(v.guest_limit, Some(1));
        assert_eq!(v.upload_limit_kbps, Some(1024));
        assert_eq!(v.download_limit_kbps, Some(4096));
        assert_eq!(
            v.created_at.unwrap().to_rfc3339(),
            "2024-06-01T10:00:00+00:00"
        );
    }

    #[test]
    fn legacy_voucher_zero_quota_is_unlimited() {
        let raw: LegacyVoucher = serde_json::from_value(json!({
            "_id": "65a1",
            "code": "0987654321",
            "create_time": 1_717_236_000,
            "duration": 1440,
            "quota": 0,
            "used": 3,
            "status": "EXPIRED",
            "qos_usage_quota": 500
        }))
        .unwrap();

        let v = Voucher::from(raw);
        assert_eq!(v.id, EntityId::ObjectId("65a1".into()));
        assert!(v.expired);
        assert_eq!(v.guest_limit, None);
        assert_eq!(v.guest_count, 3);
        assert_eq!(v.data_limit_megabytes, Some(500));
        assert_eq!(v.created_at.unwrap().timestamp(), 1_717_236_000);
    }

    #[test]
    fn legacy_guest_normalizes_mac() {
        let raw: LegacyGuest = serde_json::from_value(json!({
            "_id": "g1",
            "mac": "AA-BB-CC-DD-EE-FF",
            "voucher_code": "1234567890",
            "start": 1_717_236_000
        }))
        .unwrap();

        let g = Guest::from(raw);
        assert_eq!(g.mac, "aa:bb:cc:dd:ee:ff");
        assert_eq!(g.voucher_code.as_deref(), Some("1234567890"));
        assert!(g.authorized_at.is_some());
    }
}
