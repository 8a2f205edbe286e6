// ── Voucher cache ──
//
// The read model for every consumer. A snapshot is built in full and then
// published with a single `send_replace`, so readers see either the old
// or the new snapshot, never a mix. Failed refreshes keep the previous
// snapshot.
//
// Refreshes coalesce. Each trigger takes a ticket; the task that holds the
// refresh lock records the newest ticket before calling the controller and
// marks all tickets up to it complete afterwards. A trigger whose ticket
// was covered by a run that started after it simply returns.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::client::VoucherClient;
use crate::model::{EntityId, Guest, Voucher, VoucherQuery};

/// Immutable view of the controller state at `updated_at`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheSnapshot {
    /// Newest first.
    pub vouchers: Vec<Voucher>,
    pub guests: Vec<Guest>,
    /// `None` until the first successful refresh.
    pub updated_at: Option<DateTime<Utc>>,
}

impl CacheSnapshot {
    pub fn voucher(&self, id: &EntityId) -> Option<&Voucher> {
        self.vouchers.iter().find(|v| &v.id == id)
    }

    /// Guests that redeemed the voucher with this code.
    pub fn guests_for(&self, code: &str) -> Vec<&Guest> {
        self.guests
            .iter()
            .filter(|g| g.voucher_code.as_deref() == Some(code))
            .collect()
    }

    pub fn query(&self, query: &VoucherQuery) -> Vec<Voucher> {
        query.apply(&self.vouchers)
    }
}

/// Holds the current snapshot and refreshes it from the controller.
pub struct VoucherCache {
    client: Arc<VoucherClient>,
    snapshot: watch::Sender<Arc<CacheSnapshot>>,
    refresh_lock: Mutex<()>,
    requested: AtomicU64,
    completed: AtomicU64,
}

impl VoucherCache {
    pub fn new(client: Arc<VoucherClient>) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(CacheSnapshot::default()));
        Self {
            client,
            snapshot,
            refresh_lock: Mutex::new(()),
            requested: AtomicU64::new(0),
            completed: AtomicU64::new(0),
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        Arc::clone(&self.snapshot.borrow())
    }

    /// Receiver that sees every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<CacheSnapshot>> {
        self.snapshot.subscribe()
    }

    /// Re-list vouchers (and guests) and publish a new snapshot.
    ///
    /// Returns once a list call issued after this trigger has completed.
    /// Failures are logged and leave the previous snapshot in place.
    pub async fn refresh(&self) {
        let ticket = self.requested.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = self.refresh_lock.lock().await;

        if self.completed.load(Ordering::SeqCst) >= ticket {
            debug!(ticket, "refresh already covered by a newer run");
            return;
        }

        // Let triggers racing with this one take their tickets first.
        tokio::task::yield_now().await;
        let covers = self.requested.load(Ordering::SeqCst);

        self.reload().await;
        self.completed.store(covers, Ordering::SeqCst);
    }

    async fn reload(&self) {
        info!("refreshing vouchers");
        let vouchers = match self.client.list().await {
            Ok(vouchers) => vouchers,
            Err(e) => {
                warn!(error = %e, "voucher refresh failed, keeping previous snapshot");
                return;
            }
        };

        let previous = self.snapshot();
        let guests = match self.client.list_guests().await {
            Ok(guests) => guests,
            Err(e) => {
                warn!(error = %e, "guest refresh failed, keeping previous guests");
                previous.guests.clone()
            }
        };

        info!(
            vouchers = vouchers.len(),
            guests = guests.len(),
            "cache updated"
        );
        self.snapshot.send_replace(Arc::new(CacheSnapshot {
            vouchers,
            guests,
            updated_at: Some(Utc::now()),
        }));
    }
}
