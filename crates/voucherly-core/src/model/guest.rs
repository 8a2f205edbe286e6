// ── Guest authorization ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

/// A device authorized on the guest network, typically via a voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub id: EntityId,
    /// Lowercase, colon separated.
    pub mac: String,
    pub hostname: Option<String>,
    pub voucher_code: Option<String>,
    pub voucher_id: Option<EntityId>,
    pub authorized_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub expired: bool,
    pub tx_bytes: Option<u64>,
    pub rx_bytes: Option<u64>,
}
