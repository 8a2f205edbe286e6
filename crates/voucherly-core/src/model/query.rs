// ── Snapshot queries ──
//
// Filtering and ordering over a cached voucher list. All sorts are
// descending and stable, so equal keys keep the newest-first cache order.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::voucher::{Voucher, VoucherStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum QuotaFilter {
    SingleUse,
    /// Anything that is not single use, including unlimited.
    MultiUse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum VoucherSort {
    Code,
    Note,
    Duration,
    /// By number of guests that redeemed the voucher.
    Status,
}

/// A filter + sort over the voucher snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherQuery {
    pub status: Option<VoucherStatus>,
    pub quota: Option<QuotaFilter>,
    /// Only vouchers whose note carries this auth domain.
    pub auth_domain: Option<String>,
    pub sort: Option<VoucherSort>,
}

impl VoucherQuery {
    pub fn matches(&self, voucher: &Voucher) -> bool {
        if self.status.is_some_and(|s| voucher.status() != s) {
            return false;
        }

        match self.quota {
            Some(QuotaFilter::SingleUse) if !voucher.is_single_use() => return false,
            Some(QuotaFilter::MultiUse) if voucher.is_single_use() => return false,
            _ => {}
        }

        if let Some(domain) = &self.auth_domain {
            let note = voucher.decoded_note();
            if !note
                .auth_domain()
                .is_some_and(|d| d.eq_ignore_ascii_case(domain))
            {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, vouchers: &[Voucher]) -> Vec<Voucher> {
        let mut selected: Vec<Voucher> = vouchers
            .iter()
            .filter(|v| self.matches(v))
            .cloned()
            .collect();

        match self.sort {
            Some(VoucherSort::Code) => selected.sort_by(|a, b| b.code.cmp(&a.code)),
            Some(VoucherSort::Note) => selected.sort_by_cached_key(|v| {
                std::cmp::Reverse(v.decoded_note().text().unwrap_or_default().to_owned())
            }),
            Some(VoucherSort::Duration) => {
                selected.sort_by(|a, b| b.time_limit_minutes.cmp(&a.time_limit_minutes));
            }
            Some(VoucherSort::Status) => selected.sort_by(|a, b| b.guest_count.cmp(&a.guest_count)),
            None => {}
        }

        selected
    }
}
