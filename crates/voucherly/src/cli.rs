//! Clap derive structures for the `voucherly` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use voucherly_core::{QuotaFilter, VoucherSort, VoucherStatus};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// voucherly -- guest Wi-Fi vouchers on a UniFi controller
#[derive(Debug, Parser)]
#[command(
    name = "voucherly",
    version,
    about = "Create, list and revoke guest Wi-Fi vouchers on a UniFi controller",
    long_about = "Operator tool for UniFi hotspot vouchers.\n\n\
        Reads the controller address and credentials from the config file,\n\
        the add-on options file, or UNIFI_* environment variables.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (default: platform config dir)
    #[arg(long, env = "VOUCHERLY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Keep the cache fresh and run cleanup sweeps until interrupted
    Serve,

    /// List vouchers
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one voucher and the guests that redeemed it
    Show {
        /// Voucher ID
        id: String,
    },

    /// Create vouchers from a configured or custom type
    Create(CreateArgs),

    /// Revoke vouchers
    #[command(alias = "rm")]
    Revoke {
        /// Voucher IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Refresh the voucher cache from the controller
    Sync,

    /// Revoke expired and/or stale unused vouchers
    Cleanup(CleanupArgs),

    /// List configured voucher types
    Types {
        /// Show the kiosk types instead
        #[arg(long)]
        kiosk: bool,
    },

    /// Print the effective configuration (secrets omitted)
    Config,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only vouchers in this state (available, in-use, expired)
    #[arg(long)]
    pub status: Option<VoucherStatus>,

    /// single-use or multi-use
    #[arg(long)]
    pub quota: Option<QuotaFilter>,

    /// Only vouchers created for this auth domain
    #[arg(long)]
    pub domain: Option<String>,

    /// Sort descending by code, note, duration or status
    #[arg(long)]
    pub sort: Option<VoucherSort>,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Configured type, exactly as listed by `voucherly types`
    #[arg(long = "type", short = 't', conflicts_with = "minutes")]
    pub voucher_type: Option<String>,

    /// Pick the type from the kiosk list
    #[arg(long, requires = "voucher_type")]
    pub kiosk: bool,

    /// Custom type: validity in minutes
    #[arg(long)]
    pub minutes: Option<u32>,

    /// Custom type: guests per voucher (0 = unlimited)
    #[arg(long, requires = "minutes")]
    pub usage: Option<u32>,

    /// Custom type: upload limit in kbps
    #[arg(long, requires = "minutes")]
    pub upload: Option<u32>,

    /// Custom type: download limit in kbps
    #[arg(long, requires = "minutes")]
    pub download: Option<u32>,

    /// Custom type: data limit in MB
    #[arg(long, requires = "minutes")]
    pub megabytes: Option<u32>,

    /// Number of vouchers to create
    #[arg(long, short = 'n', default_value = "1")]
    pub amount: u32,

    /// Note stored with the voucher
    #[arg(long)]
    pub note: Option<String>,
}

#[derive(Debug, Args)]
pub struct CleanupArgs {
    /// Revoke expired vouchers
    #[arg(long)]
    pub expired: bool,

    /// Revoke vouchers unused for more than a day
    #[arg(long)]
    pub unused: bool,
}
