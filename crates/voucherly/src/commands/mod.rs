//! Command handlers.

pub mod config_cmd;
pub mod maintenance;
pub mod serve;
pub mod types;
pub mod vouchers;

use std::sync::Arc;

use voucherly_core::{CacheSnapshot, VoucherService};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a controller-backed command to its handler.
pub async fn dispatch(
    cmd: Command,
    service: &VoucherService,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Serve => serve::handle(service).await,
        Command::List(args) => vouchers::list(service, args, global).await,
        Command::Show { id } => vouchers::show(service, &id, global).await,
        Command::Create(args) => vouchers::create(service, args, global).await,
        Command::Revoke { ids } => vouchers::revoke(service, &ids, global).await,
        Command::Sync => maintenance::sync(service, global).await,
        Command::Cleanup(args) => maintenance::cleanup(service, &args, global).await,
        // Types and Config are handled before dispatch
        Command::Types { .. } | Command::Config => unreachable!(),
    }
}

/// Refresh the cache and return the new snapshot.
///
/// The cache keeps its old snapshot when a refresh fails; a one-shot
/// command has no old snapshot, so that case is an error here.
pub async fn synced_snapshot(service: &VoucherService) -> Result<Arc<CacheSnapshot>, CliError> {
    service.sync().await;
    let snap = service.snapshot();
    if snap.updated_at.is_none() {
        return Err(CliError::SyncFailed);
    }
    Ok(snap)
}
