// ── Voucher domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::entity_id::EntityId;
use super::format::{format_code, human_duration};
use crate::note::{self, VoucherNote};

/// Guest access voucher as last reported by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    pub id: EntityId,
    /// Redemption code, unformatted.
    pub code: String,
    /// Packed note (see [`crate::note`]).
    pub note: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub activated_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub expired: bool,
    pub time_limit_minutes: u32,
    /// `None` = unlimited.
    pub guest_limit: Option<u32>,
    /// Guests that redeemed the voucher so far.
    pub guest_count: u32,
    pub data_limit_megabytes: Option<u64>,
    pub upload_limit_kbps: Option<u64>,
    pub download_limit_kbps: Option<u64>,
}

/// Lifecycle state shown to operators.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum VoucherStatus {
    Available,
    InUse,
    Expired,
}

impl Voucher {
    pub fn status(&self) -> VoucherStatus {
        if self.expired {
            VoucherStatus::Expired
        } else if self.guest_count > 0 {
            VoucherStatus::InUse
        } else {
            VoucherStatus::Available
        }
    }

    pub fn formatted_code(&self) -> String {
        format_code(&self.code)
    }

    pub fn decoded_note(&self) -> VoucherNote {
        note::decode(self.note.as_deref())
    }

    pub fn duration_label(&self) -> String {
        human_duration(self.time_limit_minutes)
    }

    pub fn is_single_use(&self) -> bool {
        self.guest_limit == Some(1)
    }

    pub fn is_unused(&self) -> bool {
        self.guest_count == 0
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::voucher;
    use super::*;

    #[test]
    fn status_follows_expiry_then_usage() {
        let mut v = voucher("a", "1234567890");
        assert_eq!(v.status(), VoucherStatus::Available);

        v.guest_count = 1;
        assert_eq!(v.status(), VoucherStatus::InUse);

        v.expired = true;
        assert_eq!(v.status(), VoucherStatus::Expired);
        assert_eq!(v.status().to_string(), "expired");
        assert_eq!("in-use".parse::<VoucherStatus>().ok(), Some(VoucherStatus::InUse));
    }

    #[test]
    fn presentation_helpers() {
        let mut v = voucher("a", "1234567890");
        v.note = Some("Room 4||;;||web||;;||local||;;||".into());
        assert_eq!(v.formatted_code(), "12345-67890");
        assert_eq!(v.duration_label(), "8 hours");
        assert_eq!(v.decoded_note().text(), Some("Room 4"));
    }
}
