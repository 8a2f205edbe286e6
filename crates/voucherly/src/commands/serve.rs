//! Foreground service: periodic refresh and cleanup until Ctrl-C.

use tracing::{debug, info, warn};

use voucherly_core::{VoucherService, VoucherStatus};

use crate::error::CliError;

pub async fn handle(service: &VoucherService) -> Result<(), CliError> {
    let mut updates = service.subscribe();
    service.start().await;

    if service.snapshot().updated_at.is_none() {
        warn!("initial sync failed, retrying on the next refresh");
    }
    let config = service.config();
    info!(
        controller = %config.url,
        site = %config.site,
        interval_secs = config.refresh_interval.as_secs(),
        "serving, press Ctrl-C to stop"
    );

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("interrupt received, shutting down");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = updates.borrow_and_update().clone();
                let count = |status: VoucherStatus| snap.vouchers.iter().filter(|v| v.status() == status).count();
                debug!(
                    available = count(VoucherStatus::Available),
                    in_use = count(VoucherStatus::InUse),
                    expired = count(VoucherStatus::Expired),
                    "snapshot published"
                );
            }
        }
    }

    Ok(())
}
