//! Configured voucher types.

use tabled::Tabled;

use voucherly_config::Config;
use voucherly_core::VoucherTypeSpec;
use voucherly_core::grammar;
use voucherly_core::model::human_duration;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct TypeRow {
    #[tabled(rename = "Type")]
    raw: String,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Usage")]
    usage: String,
    #[tabled(rename = "Upload")]
    upload: String,
    #[tabled(rename = "Download")]
    download: String,
    #[tabled(rename = "Data")]
    data: String,
}

fn limit(value: Option<u32>, unit: &str) -> String {
    value.map_or_else(|| "-".into(), |v| format!("{v} {unit}"))
}

impl From<&VoucherTypeSpec> for TypeRow {
    fn from(t: &VoucherTypeSpec) -> Self {
        let usage = match t.guest_limit() {
            None => "unlimited".into(),
            Some(1) => "single use".into(),
            Some(n) => format!("{n} guests"),
        };
        Self {
            raw: t.raw.clone(),
            duration: human_duration(t.expiration_minutes),
            usage,
            upload: limit(t.upload_limit_kbps, "kbps"),
            download: limit(t.download_limit_kbps, "kbps"),
            data: limit(t.data_limit_megabytes, "MB"),
        }
    }
}

/// Parsed straight from the settings; no controller needed.
pub fn handle(settings: &Config, kiosk: bool, global: &GlobalOpts) -> Result<(), CliError> {
    let source = if kiosk {
        &settings.kiosk_voucher_types
    } else {
        &settings.voucher_types
    };
    let types = grammar::parse_all(source);
    tracing::debug!(kiosk, count = types.len(), "parsed voucher types");

    let out = output::render_list(
        global.output,
        &types,
        |t| TypeRow::from(t),
        |t| t.raw.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
