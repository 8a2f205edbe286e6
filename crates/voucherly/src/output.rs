//! `--output` rendering.
//!
//! Tables go through `tabled`, JSON through serde, and `plain` prints one
//! identifier per line for shell pipelines.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use voucherly_core::VoucherStatus;

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Auto => std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal(),
        ColorMode::Always => true,
        ColorMode::Never => false,
    }
}

pub fn paint_status(status: VoucherStatus, color: bool) -> String {
    let label = status.to_string();
    match (color, status) {
        (false, _) => label,
        (true, VoucherStatus::Available) => label.green().to_string(),
        (true, VoucherStatus::InUse) => label.yellow().to_string(),
        (true, VoucherStatus::Expired) => label.red().to_string(),
    }
}

pub fn paint_code(code: &str, color: bool) -> String {
    if color {
        code.bold().cyan().to_string()
    } else {
        code.to_owned()
    }
}

/// JSON for the structured formats, `None` for the human ones.
fn structured<T: Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
) -> Option<Result<String, CliError>> {
    let json = match format {
        OutputFormat::Json => serde_json::to_string_pretty(data),
        OutputFormat::JsonCompact => serde_json::to_string(data),
        OutputFormat::Table | OutputFormat::Plain => return None,
    };
    Some(json.map_err(CliError::from))
}

/// Render a collection: a rounded table of `row`s, or one `key` per line.
pub fn render_list<T, R>(
    format: OutputFormat,
    items: &[T],
    row: impl Fn(&T) -> R,
    key: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled,
{
    if let Some(json) = structured(format, items) {
        return json;
    }
    Ok(match format {
        OutputFormat::Plain => items.iter().map(key).collect::<Vec<_>>().join("\n"),
        _ => Table::new(items.iter().map(row))
            .with(Style::rounded())
            .to_string(),
    })
}

/// Render one item; `detail` is the human-readable view.
pub fn render_single<T>(
    format: OutputFormat,
    item: &T,
    detail: impl Fn(&T) -> String,
    key: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize + ?Sized,
{
    if let Some(json) = structured(format, item) {
        return json;
    }
    Ok(match format {
        OutputFormat::Plain => key(item),
        _ => detail(item),
    })
}

/// Write to stdout unless `--quiet`. A closed pipe is not an error.
pub fn print_output(rendered: &str, quiet: bool) {
    if quiet || rendered.is_empty() {
        return;
    }
    let _ = writeln!(io::stdout().lock(), "{rendered}");
}
