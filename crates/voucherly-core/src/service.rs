// ── Voucher service ──
//
// Owns the session manager, voucher client, cache and cleanup scheduler
// for one controller, and runs the periodic maintenance task. Every
// successful mutation refreshes the cache before returning, so a caller
// that reads the snapshot afterwards sees its own change.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::{CacheSnapshot, VoucherCache};
use crate::cleanup::{CleanupScheduler, SweepReport};
use crate::client::{CreateOutcome, VoucherClient};
use crate::config::{CleanupPolicy, ServiceConfig};
use crate::error::CoreError;
use crate::grammar::{self, VoucherTypeSpec};
use crate::model::EntityId;
use crate::note::VoucherNote;
use crate::session::SessionManager;

/// Results of a cleanup pass. `None` for sweeps that were disabled or
/// skipped because one was already running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub expired: Option<SweepReport>,
    pub unused: Option<SweepReport>,
}

/// Entry point for consumers.
///
/// Cheaply cloneable via `Arc<ServiceInner>`.
#[derive(Clone)]
pub struct VoucherService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    config: ServiceConfig,
    sessions: Arc<SessionManager>,
    client: Arc<VoucherClient>,
    cache: Arc<VoucherCache>,
    cleanup: CleanupScheduler,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl VoucherService {
    /// Build the service. Does no I/O; the first remote call logs in.
    pub fn new(config: ServiceConfig) -> Self {
        let sessions = Arc::new(SessionManager::new(&config));
        let client = Arc::new(VoucherClient::new(Arc::clone(&sessions)));
        let cache = Arc::new(VoucherCache::new(Arc::clone(&client)));
        let cleanup = CleanupScheduler::new(Arc::clone(&client), Arc::clone(&cache));

        Self {
            inner: Arc::new(ServiceInner {
                config,
                sessions,
                client,
                cache,
                cleanup,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.inner.config
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.inner.sessions
    }

    pub fn client(&self) -> &Arc<VoucherClient> {
        &self.inner.client
    }

    pub fn cache(&self) -> &Arc<VoucherCache> {
        &self.inner.cache
    }

    pub fn cleanup(&self) -> &CleanupScheduler {
        &self.inner.cleanup
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        self.inner.cache.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<CacheSnapshot>> {
        self.inner.cache.subscribe()
    }

    pub fn voucher_types(&self) -> &[VoucherTypeSpec] {
        &self.inner.config.voucher_types
    }

    pub fn kiosk_voucher_types(&self) -> &[VoucherTypeSpec] {
        &self.inner.config.kiosk_voucher_types
    }

    /// Map a caller-selected type string onto a configured type.
    pub fn resolve_type(&self, selected: &str) -> Result<&VoucherTypeSpec, CoreError> {
        grammar::find_configured(self.voucher_types(), selected).ok_or_else(|| {
            CoreError::validation(format!("unknown voucher type {selected:?}"))
        })
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Create vouchers, then refresh the cache.
    pub async fn create(
        &self,
        spec: &VoucherTypeSpec,
        amount: u32,
        note: &VoucherNote,
    ) -> Result<CreateOutcome, CoreError> {
        let outcome = self.inner.client.create(spec, amount, note).await?;
        self.inner.cache.refresh().await;
        Ok(outcome)
    }

    /// Revoke a voucher, then refresh the cache.
    pub async fn revoke(&self, id: &EntityId) -> Result<(), CoreError> {
        self.inner.client.revoke(id).await?;
        self.inner.cache.refresh().await;
        Ok(())
    }

    /// Force a cache refresh.
    pub async fn sync(&self) {
        self.inner.cache.refresh().await;
    }

    /// Run the sweeps enabled in `policy`, expired first.
    ///
    /// Sweeps work from the current snapshot. One that finds nothing to
    /// revoke does not refresh it; call [`Self::sync`] first for fresh data.
    pub async fn run_cleanup(&self, policy: CleanupPolicy) -> CleanupReport {
        let mut report = CleanupReport::default();
        if policy.expired {
            report.expired = self.inner.cleanup.sweep_expired().await;
        }
        if policy.unused {
            report.unused = self.inner.cleanup.sweep_unused().await;
        }
        report
    }

    /// One maintenance pass: refresh, then the configured sweeps.
    async fn maintain(&self) {
        self.inner.cache.refresh().await;
        let report = self.run_cleanup(self.inner.config.cleanup).await;
        debug!(?report, "maintenance pass finished");
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Load the first snapshot and spawn the maintenance task.
    ///
    /// The task refreshes the cache and runs the configured sweeps every
    /// `refresh_interval`; a zero interval disables it.
    pub async fn start(&self) {
        self.inner.cache.refresh().await;

        let interval = self.inner.config.refresh_interval;
        if interval.is_zero() {
            debug!("periodic refresh disabled");
            return;
        }

        let service = self.clone();
        let cancel = self.inner.cancel.child_token();
        let handle = tokio::spawn(maintenance_task(service, interval, cancel));
        self.inner.task_handles.lock().await.push(handle);
        info!(interval_secs = interval.as_secs(), "maintenance task started");
    }

    /// Stop background work and end the controller session.
    ///
    /// An in-flight refresh either finishes or is dropped before it
    /// publishes; the snapshot is never left half-written.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let handles: Vec<_> = self.inner.task_handles.lock().await.drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }

        self.inner.sessions.close().await;
        debug!("voucher service stopped");
    }
}

/// Periodically refresh the cache and run cleanup sweeps.
///
/// Runs are sequential and missed ticks are skipped, so a slow controller
/// never causes runs to pile up.
async fn maintenance_task(service: VoucherService, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = service.maintain() => {}
                }
            }
        }
    }
}
