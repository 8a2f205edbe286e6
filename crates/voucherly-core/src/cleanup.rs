// ── Cleanup sweeps ──
//
// Scan the cached snapshot for vouchers to revoke, revoke them one at a
// time, then refresh the cache. A sweep with no candidates makes no
// remote call at all, so the cache is not refreshed either. A failed
// revoke is logged and skipped.
// Sweeps never overlap: a sweep that finds another one running returns
// immediately instead of queueing.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::VoucherCache;
use crate::client::VoucherClient;
use crate::model::Voucher;

/// Unredeemed vouchers older than this are revoked by the unused sweep.
pub fn unused_window() -> TimeDelta {
    TimeDelta::days(1)
}

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub candidates: usize,
    pub revoked: usize,
    pub failed: usize,
}

/// Voucher selected by the expired sweep.
pub fn is_expired_candidate(voucher: &Voucher) -> bool {
    voucher.expired
}

/// Voucher selected by the unused sweep: never redeemed and created more
/// than [`unused_window`] before `now`.
pub fn is_unused_candidate(voucher: &Voucher, now: DateTime<Utc>) -> bool {
    voucher.is_unused()
        && voucher
            .created_at
            .is_some_and(|created| created + unused_window() < now)
}

pub struct CleanupScheduler {
    client: Arc<VoucherClient>,
    cache: Arc<VoucherCache>,
    running: Mutex<()>,
}

impl CleanupScheduler {
    pub fn new(client: Arc<VoucherClient>, cache: Arc<VoucherCache>) -> Self {
        Self {
            client,
            cache,
            running: Mutex::new(()),
        }
    }

    /// Revoke every voucher the controller reports as expired.
    ///
    /// `None` if another sweep was already running. Candidates come from
    /// the cached snapshot; when there are none the cache is left as is.
    pub async fn sweep_expired(&self) -> Option<SweepReport> {
        self.sweep("expired", is_expired_candidate).await
    }

    /// Revoke vouchers that sat unredeemed for more than a day.
    ///
    /// Same contract as [`Self::sweep_expired`].
    pub async fn sweep_unused(&self) -> Option<SweepReport> {
        let now = Utc::now();
        self.sweep("unused", |v| is_unused_candidate(v, now)).await
    }

    /// Revoke the snapshot's vouchers matching `select`, then refresh.
    /// Returns early, without refreshing, when nothing matches.
    async fn sweep(
        &self,
        kind: &'static str,
        select: impl Fn(&Voucher) -> bool,
    ) -> Option<SweepReport> {
        let Ok(_running) = self.running.try_lock() else {
            debug!(kind, "sweep already in progress, skipping");
            return None;
        };

        let snapshot = self.cache.snapshot();
        let candidates: Vec<&Voucher> = snapshot.vouchers.iter().filter(|v| select(v)).collect();
        let mut report = SweepReport {
            candidates: candidates.len(),
            ..SweepReport::default()
        };

        if candidates.is_empty() {
            debug!(kind, "nothing to clean up");
            return Some(report);
        }

        info!(kind, count = candidates.len(), "removing vouchers");
        for voucher in candidates {
            debug!(kind, id = %voucher.id, "removing voucher");
            match self.client.revoke(&voucher.id).await {
                Ok(()) => report.revoked += 1,
                Err(e) => {
                    warn!(kind, id = %voucher.id, error = %e, "revoke failed, continuing");
                    report.failed += 1;
                }
            }
        }

        self.cache.refresh().await;
        Some(report)
    }
}
