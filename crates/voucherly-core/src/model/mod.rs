// ── Domain model ──
//
// Canonical voucher and guest types. Both API surfaces convert into these
// (see `crate::convert`); nothing outside this crate sees raw API shapes.

pub mod entity_id;
pub mod format;
pub mod guest;
pub mod query;
pub mod voucher;

pub use entity_id::EntityId;
pub use format::{format_code, human_duration};
pub use guest::Guest;
pub use query::{QuotaFilter, VoucherQuery, VoucherSort};
pub use voucher::{Voucher, VoucherStatus};
