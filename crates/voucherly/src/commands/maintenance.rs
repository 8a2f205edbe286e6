//! Cache sync and cleanup sweeps.

use serde::Serialize;
use tabled::Tabled;

use voucherly_core::{CleanupPolicy, SweepReport, VoucherService};

use crate::cli::{CleanupArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::synced_snapshot;

#[derive(Serialize)]
struct SyncSummary {
    vouchers: usize,
    guests: usize,
    updated_at: String,
}

pub async fn sync(service: &VoucherService, global: &GlobalOpts) -> Result<(), CliError> {
    let snap = synced_snapshot(service).await?;
    let summary = SyncSummary {
        vouchers: snap.vouchers.len(),
        guests: snap.guests.len(),
        updated_at: snap
            .updated_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_default(),
    };

    let out = output::render_single(
        global.output,
        &summary,
        |s| format!("Synced {} vouchers and {} guests", s.vouchers, s.guests),
        |s| s.vouchers.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Cleanup ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Serialize, Tabled)]
struct SweepRow {
    #[tabled(rename = "Sweep")]
    sweep: &'static str,
    #[tabled(rename = "Ran")]
    ran: bool,
    #[tabled(rename = "Candidates")]
    candidates: usize,
    #[tabled(rename = "Revoked")]
    revoked: usize,
    #[tabled(rename = "Failed")]
    failed: usize,
}

impl SweepRow {
    fn new(sweep: &'static str, report: Option<SweepReport>) -> Self {
        let report_or_default = report.unwrap_or_default();
        Self {
            sweep,
            ran: report.is_some(),
            candidates: report_or_default.candidates,
            revoked: report_or_default.revoked,
            failed: report_or_default.failed,
        }
    }
}

pub async fn cleanup(
    service: &VoucherService,
    args: &CleanupArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    // No flag means the configured policy.
    let policy = if args.expired || args.unused {
        CleanupPolicy {
            expired: args.expired,
            unused: args.unused,
        }
    } else {
        service.config().cleanup
    };

    synced_snapshot(service).await?;
    let report = service.run_cleanup(policy).await;

    let mut rows = Vec::new();
    if policy.expired {
        rows.push(SweepRow::new("expired", report.expired));
    }
    if policy.unused {
        rows.push(SweepRow::new("unused", report.unused));
    }

    let out = output::render_list(
        global.output,
        &rows,
        |r| *r,
        |r| format!("{} {}", r.sweep, r.revoked),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
