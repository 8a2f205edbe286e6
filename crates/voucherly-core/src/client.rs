// ── Voucher operations ──
//
// Every operation runs through `with_session`: a bounded loop of at most
// two attempts. An authorization failure on the first attempt drops the
// session and tries once more with a fresh login. Any other failure drops
// the session (unless it was a timeout) and propagates.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use voucherly_api::integration_types::VoucherCreateRequest;
use voucherly_api::legacy::hotspot::CreateVoucherCommand;

use crate::error::CoreError;
use crate::grammar::VoucherTypeSpec;
use crate::model::{EntityId, Guest, Voucher};
use crate::note::VoucherNote;
use crate::session::{Session, SessionHandle, SessionManager};

const MAX_ATTEMPTS: u32 = 2;
const VOUCHER_PAGE_LIMIT: i32 = 200;

/// Result of a successful create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A single voucher was created; this is its (unformatted) code.
    Code(String),
    /// A batch was created.
    Created { count: u32 },
}

/// Voucher CRUD against the controller.
pub struct VoucherClient {
    sessions: Arc<SessionManager>,
}

impl VoucherClient {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Create `amount` vouchers of type `spec`.
    pub async fn create(
        &self,
        spec: &VoucherTypeSpec,
        amount: u32,
        note: &VoucherNote,
    ) -> Result<CreateOutcome, CoreError> {
        if spec.expiration_minutes == 0 {
            return Err(CoreError::validation("voucher type has no expiration"));
        }
        if amount == 0 {
            return Err(CoreError::validation("amount must be at least 1"));
        }
        let packed = note.encode();

        let issued = self
            .with_session("create", |session| {
                let packed = packed.as_str();
                async move { create_on(&session, spec, amount, packed).await }
            })
            .await?;

        // The batch exists from here on; only the lookup may be repeated.
        let outcome = match issued {
            Issued::Done(outcome) => outcome,
            Issued::Batch { create_time } => {
                self.with_session("create_lookup", |session| async move {
                    lookup_created(&session, create_time).await
                })
                .await?
            }
        };

        match &outcome {
            CreateOutcome::Code(code) => info!(code = %code, "created voucher"),
            CreateOutcome::Created { count } => info!(count, "created vouchers"),
        }
        Ok(outcome)
    }

    /// Revoke one voucher. A missing id surfaces as a remote error.
    pub async fn revoke(&self, id: &EntityId) -> Result<(), CoreError> {
        if self.sessions.uses_integration_api() && id.as_uuid().is_none() {
            return Err(CoreError::validation(format!(
                "voucher id {id} is not a UUID"
            )));
        }

        self.with_session("revoke", |session| async move {
            match (session.handle(), id) {
                (SessionHandle::Integration { client, site_id }, EntityId::Uuid(uuid)) => {
                    client.delete_voucher(site_id, uuid).await.map(|_| ())
                }
                (SessionHandle::Integration { .. }, EntityId::ObjectId(_)) => Err(
                    voucherly_api::Error::UnsupportedOperation("revoking a non-UUID voucher id"),
                ),
                (SessionHandle::Legacy { client }, id) => {
                    client.delete_voucher(&id.to_string()).await
                }
            }
        })
        .await?;

        info!(%id, "revoked voucher");
        Ok(())
    }

    /// All vouchers, newest first. Ties keep the controller's order.
    pub async fn list(&self) -> Result<Vec<Voucher>, CoreError> {
        let mut vouchers = self
            .with_session("list", |session| async move { list_on(&session).await })
            .await?;

        vouchers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        debug!(count = vouchers.len(), "listed vouchers");
        Ok(vouchers)
    }

    /// Guest authorizations. Controllers without a guest endpoint yield
    /// an empty list.
    pub async fn list_guests(&self) -> Result<Vec<Guest>, CoreError> {
        self.with_session("list_guests", |session| async move {
            match session.handle() {
                SessionHandle::Integration { .. } => {
                    debug!("guest listing unsupported on the Integration API");
                    Ok(Vec::new())
                }
                SessionHandle::Legacy { client } => match client.list_guests().await {
                    Ok(guests) => Ok(guests.into_iter().map(Guest::from).collect()),
                    Err(e) if e.is_not_found() => {
                        debug!("guest endpoint not available (404), treating as empty");
                        Ok(Vec::new())
                    }
                    Err(e) => Err(e),
                },
            }
        })
        .await
    }

    // ── Retry loop ───────────────────────────────────────────────────

    async fn with_session<T, F, Fut>(&self, op: &'static str, call: F) -> Result<T, CoreError>
    where
        F: Fn(Arc<Session>) -> Fut,
        Fut: Future<Output = Result<T, voucherly_api::Error>>,
    {
        let mut attempt = 1;
        loop {
            let session = self.sessions.ensure().await?;

            match call(Arc::clone(&session)).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_auth_expired() && attempt < MAX_ATTEMPTS => {
                    warn!(op, error = %e, "authorization rejected, re-authenticating");
                    self.sessions.invalidate(&session).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_timeout() {
                        debug!(op, "request timed out, keeping session");
                    } else {
                        self.sessions.invalidate(&session).await;
                    }
                    return Err(e.into());
                }
            }
        }
    }
}

// ── Per-surface calls ────────────────────────────────────────────────

async fn list_on(session: &Session) -> Result<Vec<Voucher>, voucherly_api::Error> {
    let vouchers = match session.handle() {
        SessionHandle::Integration { client, site_id } => client
            .paginate_all(VOUCHER_PAGE_LIMIT, |off, lim| {
                client.list_vouchers(site_id, off, lim)
            })
            .await?
            .into_iter()
            .map(Voucher::from)
            .collect(),
        SessionHandle::Legacy { client } => client
            .list_vouchers()
            .await?
            .into_iter()
            .map(Voucher::from)
            .collect(),
    };
    Ok(vouchers)
}

/// What the create command left behind.
enum Issued {
    Done(CreateOutcome),
    /// A single legacy voucher whose code still has to be looked up.
    Batch { create_time: i64 },
}

async fn create_on(
    session: &Session,
    spec: &VoucherTypeSpec,
    amount: u32,
    note: &str,
) -> Result<Issued, voucherly_api::Error> {
    match session.handle() {
        SessionHandle::Integration { client, site_id } => {
            let request = VoucherCreateRequest {
                name: note.to_owned(),
                count: amount,
                time_limit_minutes: spec.expiration_minutes,
                authorized_guest_limit: spec.guest_limit(),
                data_usage_limit_m_bytes: spec.data_limit_megabytes,
                rx_rate_limit_kbps: spec.download_limit_kbps,
                tx_rate_limit_kbps: spec.upload_limit_kbps,
            };
            let created = client.create_vouchers(site_id, &request).await?;
            if amount > 1 {
                return Ok(Issued::Done(CreateOutcome::Created { count: amount }));
            }
            created
                .vouchers
                .into_iter()
                .next()
                .map(|v| Issued::Done(CreateOutcome::Code(v.code)))
                .ok_or_else(empty_create_response)
        }
        SessionHandle::Legacy { client } => {
            let command = CreateVoucherCommand {
                expire: spec.expiration_minutes,
                n: amount,
                quota: spec.usage_limit.unwrap_or(0),
                note: note.to_owned(),
                up: spec.upload_limit_kbps,
                down: spec.download_limit_kbps,
                bytes: spec.data_limit_megabytes,
            };
            let create_time = client.create_vouchers(&command).await?;
            if amount > 1 {
                return Ok(Issued::Done(CreateOutcome::Created { count: amount }));
            }
            Ok(Issued::Batch { create_time })
        }
    }
}

async fn lookup_created(
    session: &Session,
    create_time: i64,
) -> Result<CreateOutcome, voucherly_api::Error> {
    let SessionHandle::Legacy { client } = session.handle() else {
        return Err(voucherly_api::Error::UnsupportedOperation(
            "looking up a legacy voucher batch",
        ));
    };
    client
        .vouchers_created_at(create_time)
        .await?
        .into_iter()
        .next()
        .map(|v| CreateOutcome::Code(v.code))
        .ok_or_else(empty_create_response)
}

fn empty_create_response() -> voucherly_api::Error {
    voucherly_api::Error::Deserialization {
        message: "voucher creation response listed no vouchers".into(),
        body: String::new(),
    }
}
