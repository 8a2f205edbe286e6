// ── Voucher type grammar ──
//
// A type list looks like `480,1,,,;1440,0,2048,4096,500;`: entries are
// separated by `;`, each entry holds up to five positional fields
// `expiration,usage,upload,download,megabytes`. Only the first field is
// mandatory. Entries whose first field is not a positive integer are
// dropped, never filled with defaults.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreError;

/// Type list used when nothing is configured: 8 hours, single use, no limits.
pub const DEFAULT_VOUCHER_TYPES: &str = "480,1,,,;";

const ENTRY_SEPARATOR: char = ';';
const FIELD_SEPARATOR: char = ',';

/// One entry of a voucher type list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoucherTypeSpec {
    pub expiration_minutes: u32,
    /// `None` or `Some(0)` = unlimited, `Some(1)` = single use, `Some(n)` = n guests.
    pub usage_limit: Option<u32>,
    pub upload_limit_kbps: Option<u32>,
    pub download_limit_kbps: Option<u32>,
    pub data_limit_megabytes: Option<u32>,
    /// The entry exactly as it appeared in the type list.
    pub raw: String,
}

impl VoucherTypeSpec {
    /// Build a type from explicit fields (the "custom voucher" path).
    ///
    /// `raw` is the canonical grammar rendering, so the result can be
    /// written back into a type list.
    pub fn custom(
        expiration_minutes: u32,
        usage_limit: Option<u32>,
        upload_limit_kbps: Option<u32>,
        download_limit_kbps: Option<u32>,
        data_limit_megabytes: Option<u32>,
    ) -> Result<Self, CoreError> {
        if expiration_minutes == 0 {
            return Err(CoreError::validation(
                "voucher expiration must be a positive number of minutes",
            ));
        }

        let mut spec = Self {
            expiration_minutes,
            usage_limit,
            upload_limit_kbps,
            download_limit_kbps,
            data_limit_megabytes,
            raw: String::new(),
        };
        spec.raw = spec.to_string();
        Ok(spec)
    }

    /// Guest limit to send to the controller. `None` means unlimited.
    pub fn guest_limit(&self) -> Option<u32> {
        self.usage_limit.filter(|&n| n > 0)
    }

    pub fn is_single_use(&self) -> bool {
        self.usage_limit == Some(1)
    }
}

/// Renders the canonical grammar form, e.g. `480,1,,,`.
impl fmt::Display for VoucherTypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn opt(v: Option<u32>) -> String {
            v.map(|n| n.to_string()).unwrap_or_default()
        }

        write!(
            f,
            "{},{},{},{},{}",
            self.expiration_minutes,
            opt(self.usage_limit),
            opt(self.upload_limit_kbps),
            opt(self.download_limit_kbps),
            opt(self.data_limit_megabytes),
        )
    }
}

// ── Parsing ──────────────────────────────────────────────────────────

/// Parse a full type list. Empty and malformed entries are skipped.
pub fn parse_all(spec: &str) -> Vec<VoucherTypeSpec> {
    spec.split(ENTRY_SEPARATOR)
        .filter(|entry| !entry.is_empty())
        .filter_map(parse_entry)
        .collect()
}

/// Parse a single entry, e.g. a type string chosen by a caller.
///
/// One trailing `;` is tolerated. Anything containing a second entry is
/// rejected.
pub fn parse_one(spec: &str) -> Option<VoucherTypeSpec> {
    let entry = spec.strip_suffix(ENTRY_SEPARATOR).unwrap_or(spec);
    if entry.is_empty() || entry.contains(ENTRY_SEPARATOR) {
        return None;
    }
    parse_entry(entry)
}

/// Find the configured type whose `raw` form is exactly `selected`.
pub fn find_configured<'a>(
    configured: &'a [VoucherTypeSpec],
    selected: &str,
) -> Option<&'a VoucherTypeSpec> {
    configured.iter().find(|t| t.raw == selected)
}

fn parse_entry(entry: &str) -> Option<VoucherTypeSpec> {
    let mut fields = entry.split(FIELD_SEPARATOR);

    let Some(expiration_minutes) = fields.next().and_then(parse_field).filter(|&n| n > 0) else {
        debug!(entry, "dropping voucher type without a valid expiration");
        return None;
    };

    let mut next = || fields.next().and_then(parse_field);
    Some(VoucherTypeSpec {
        expiration_minutes,
        usage_limit: next(),
        upload_limit_kbps: next(),
        download_limit_kbps: next(),
        data_limit_megabytes: next(),
        raw: entry.to_owned(),
    })
}

fn parse_field(field: &str) -> Option<u32> {
    let field = field.trim();
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
