//! Controller session, voucher cache and cleanup sweeps for guest Wi-Fi
//! vouchers.
//!
//! - **[`VoucherService`]**: Facade owning everything below for one
//!   controller. Mutations refresh the cache before returning;
//!   [`start()`](VoucherService::start) spawns the periodic maintenance task.
//!
//! - **[`SessionManager`]**: At most one live login, shared by concurrent
//!   callers and dropped on authorization failure.
//!
//! - **[`VoucherClient`]**: Create / revoke / list against either API
//!   surface, retrying exactly once after a forced re-login.
//!
//! - **[`VoucherCache`]**: Immutable snapshots published through a
//!   `tokio::sync::watch` channel; concurrent refresh triggers coalesce.
//!
//! - **[`CleanupScheduler`]**: Expired and unused sweeps.
//!
//! - **[`grammar`] / [`note`]**: The voucher type list format and the
//!   packed note format.

pub mod cache;
pub mod cleanup;
pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod grammar;
pub mod model;
pub mod note;
pub mod service;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::{CacheSnapshot, VoucherCache};
pub use cleanup::{CleanupScheduler, SweepReport};
pub use client::{CreateOutcome, VoucherClient};
pub use config::{AuthCredentials, CleanupPolicy, ServiceConfig, TlsVerification};
pub use error::CoreError;
pub use grammar::{DEFAULT_VOUCHER_TYPES, VoucherTypeSpec};
pub use note::{AuthType, NoteSource, VoucherNote};
pub use service::{CleanupReport, VoucherService};
pub use session::{Session, SessionManager};
pub use voucherly_api::ControllerPlatform;

pub use model::{
    EntityId, Guest, QuotaFilter, Voucher, VoucherQuery, VoucherSort, VoucherStatus,
};
