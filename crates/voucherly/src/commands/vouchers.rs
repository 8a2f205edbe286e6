//! Voucher command handlers: list, show, create, revoke.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tabled::Tabled;

use voucherly_core::grammar;
use voucherly_core::model::format_code;
use voucherly_core::{
    AuthType, CreateOutcome, EntityId, Guest, NoteSource, Voucher, VoucherNote, VoucherQuery,
    VoucherService, VoucherStatus, VoucherTypeSpec,
};

use crate::cli::{CreateArgs, GlobalOpts, ListArgs};
use crate::error::CliError;
use crate::output;

use super::synced_snapshot;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct VoucherRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Guests")]
    guests: String,
    #[tabled(rename = "Note")]
    note: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&Voucher> for VoucherRow {
    fn from(v: &Voucher) -> Self {
        let note = v.decoded_note();
        let mut note_text = note.text().unwrap_or_default().to_owned();
        if let Some(domain) = note.auth_domain() {
            note_text = format!("{note_text} @{domain}").trim().to_owned();
        }

        Self {
            code: v.formatted_code(),
            status: v.status().to_string(),
            duration: v.duration_label(),
            guests: guests_label(v),
            note: note_text,
            created: local_time(v.created_at),
            id: v.id.to_string(),
        }
    }
}

fn guests_label(v: &Voucher) -> String {
    match v.guest_limit {
        Some(limit) => format!("{}/{limit}", v.guest_count),
        None => format!("{}/∞", v.guest_count),
    }
}

fn local_time(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn opt_unit(value: Option<u64>, unit: &str) -> String {
    value.map_or_else(|| "-".into(), |v| format!("{v} {unit}"))
}

// ── Detail view ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct VoucherDetail<'a> {
    #[serde(flatten)]
    voucher: &'a Voucher,
    status: VoucherStatus,
    decoded_note: VoucherNote,
    guests: Vec<&'a Guest>,
}

fn detail(d: &VoucherDetail<'_>, color: bool) -> String {
    let v = d.voucher;
    let note = &d.decoded_note;

    let mut lines = vec![
        format!("ID:         {}", v.id),
        format!("Code:       {}", output::paint_code(&v.formatted_code(), color)),
        format!("Status:     {}", output::paint_status(d.status, color)),
        format!("Duration:   {}", v.duration_label()),
        format!("Guests:     {}", guests_label(v)),
        format!("Data Limit: {}", opt_unit(v.data_limit_megabytes, "MB")),
        format!("Upload:     {}", opt_unit(v.upload_limit_kbps, "kbps")),
        format!("Download:   {}", opt_unit(v.download_limit_kbps, "kbps")),
        format!("Note:       {}", note.text().unwrap_or("-")),
        format!(
            "Source:     {}",
            note.source().map_or_else(|| "-".into(), |s| s.to_string())
        ),
        format!(
            "Auth:       {}{}",
            note.auth_type().map_or_else(|| "-".into(), |a| a.to_string()),
            note.auth_domain()
                .map(|d| format!(" ({d})"))
                .unwrap_or_default()
        ),
        format!("Created:    {}", local_time(v.created_at)),
        format!("Activated:  {}", local_time(v.activated_at)),
        format!("Expires:    {}", local_time(v.expires_at)),
    ];

    if !d.guests.is_empty() {
        lines.push("Devices:".into());
        for guest in &d.guests {
            lines.push(format!(
                "  {}  {}  {}",
                guest.mac,
                guest.hostname.as_deref().unwrap_or("-"),
                local_time(guest.authorized_at)
            ));
        }
    }

    lines.join("\n")
}

/// Match an id, or a code with or without the display dash.
fn find_voucher<'a>(vouchers: &'a [Voucher], identifier: &str) -> Option<&'a Voucher> {
    let id = EntityId::from(identifier);
    let code = identifier.replace('-', "");
    vouchers.iter().find(|v| v.id == id || v.code == code)
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn list(
    service: &VoucherService,
    args: ListArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snap = synced_snapshot(service).await?;
    let query = VoucherQuery {
        status: args.status,
        quota: args.quota,
        auth_domain: args.domain,
        sort: args.sort,
    };
    let vouchers = snap.query(&query);

    let out = output::render_list(
        global.output,
        &vouchers,
        |v| VoucherRow::from(v),
        |v| v.code.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn show(
    service: &VoucherService,
    identifier: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snap = synced_snapshot(service).await?;
    let voucher = find_voucher(&snap.vouchers, identifier).ok_or_else(|| CliError::NotFound {
        resource_type: "voucher".into(),
        identifier: identifier.into(),
        list_command: "list".into(),
    })?;

    let view = VoucherDetail {
        voucher,
        status: voucher.status(),
        decoded_note: voucher.decoded_note(),
        guests: snap.guests_for(&voucher.code),
    };
    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &view,
        |d| detail(d, color),
        |d| d.voucher.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[derive(Serialize)]
struct Created {
    count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    formatted_code: Option<String>,
}

fn resolve_spec(service: &VoucherService, args: &CreateArgs) -> Result<VoucherTypeSpec, CliError> {
    if let Some(minutes) = args.minutes {
        return Ok(VoucherTypeSpec::custom(
            minutes,
            args.usage,
            args.upload,
            args.download,
            args.megabytes,
        )?);
    }

    match args.voucher_type.as_deref() {
        Some(raw) if args.kiosk => grammar::find_configured(service.kiosk_voucher_types(), raw)
            .cloned()
            .ok_or_else(|| CliError::NotFound {
                resource_type: "kiosk voucher type".into(),
                identifier: raw.into(),
                list_command: "types --kiosk".into(),
            }),
        Some(raw) => Ok(service.resolve_type(raw)?.clone()),
        None => service
            .voucher_types()
            .first()
            .cloned()
            .ok_or_else(|| CliError::Validation {
                reason: "no voucher types configured".into(),
            }),
    }
}

pub async fn create(
    service: &VoucherService,
    args: CreateArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let spec = resolve_spec(service, &args)?;
    let source = if args.kiosk {
        NoteSource::Kiosk
    } else {
        NoteSource::Api
    };
    let note = VoucherNote::new(
        args.note.as_deref(),
        Some(source),
        Some(AuthType::Local),
        None,
    )?;

    tracing::debug!(voucher_type = %spec, amount = args.amount, "creating vouchers");
    let created = match service.create(&spec, args.amount, &note).await? {
        CreateOutcome::Code(code) => Created {
            count: 1,
            formatted_code: Some(format_code(&code)),
            code: Some(code),
        },
        CreateOutcome::Created { count } => Created {
            count,
            code: None,
            formatted_code: None,
        },
    };

    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &created,
        |c| match &c.formatted_code {
            Some(code) => output::paint_code(code, color),
            None => format!("{} voucher(s) created", c.count),
        },
        |c| c.code.clone().unwrap_or_else(|| c.count.to_string()),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn revoke(
    service: &VoucherService,
    ids: &[String],
    global: &GlobalOpts,
) -> Result<(), CliError> {
    for id in ids {
        service.revoke(&EntityId::from(id.as_str())).await?;
        if !global.quiet {
            eprintln!("Voucher {id} revoked");
        }
    }
    Ok(())
}
