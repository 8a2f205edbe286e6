// ── Controller session ──
//
// Holds at most one authenticated handle to the controller. The first
// caller that needs a session logs in while holding the slot's mutex;
// everyone arriving meanwhile waits on that mutex and then reuses the
// result, so concurrent callers never trigger a second login.
//
//     Absent ──ensure()──▶ Authenticating ──ok──▶ Active
//        ▲                       │                   │
//        └────────── err ────────┘◀── invalidate() ──┘

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OnceCell};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use voucherly_api::transport::{TlsMode, TransportConfig};
use voucherly_api::{ControllerPlatform, IntegrationClient, LegacyClient};

use crate::config::{AuthCredentials, ServiceConfig, TlsVerification};
use crate::error::CoreError;

/// How long before `session_lifetime` a session is retired.
const RETIREMENT_MARGIN: Duration = Duration::from_secs(60);
const SITE_PAGE_LIMIT: i32 = 50;

// ── Session ──────────────────────────────────────────────────────────

/// The authenticated API client for one login.
pub(crate) enum SessionHandle {
    Integration {
        client: IntegrationClient,
        site_id: Uuid,
    },
    Legacy {
        client: LegacyClient,
    },
}

/// One live login. Shared by reference; dropped when invalidated.
pub struct Session {
    handle: SessionHandle,
    issued_at: Instant,
}

impl Session {
    fn new(handle: SessionHandle) -> Self {
        Self {
            handle,
            issued_at: Instant::now(),
        }
    }

    pub(crate) fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    pub fn issued_at(&self) -> Instant {
        self.issued_at
    }
}

// ── SessionManager ───────────────────────────────────────────────────

/// Process-wide owner of the controller session.
pub struct SessionManager {
    url: url::Url,
    auth: AuthCredentials,
    site: String,
    transport: TransportConfig,
    lifetime: Option<Duration>,
    current: Mutex<Option<Arc<Session>>>,
    /// Survives session resets; the platform never changes under us.
    platform: OnceCell<ControllerPlatform>,
    /// Integration API site UUID, resolved once per process.
    site_id: OnceCell<Uuid>,
}

impl SessionManager {
    pub fn new(config: &ServiceConfig) -> Self {
        let platform = OnceCell::new_with(config.platform);
        Self {
            url: config.url.clone(),
            auth: config.auth.clone(),
            site: config.site.clone(),
            transport: build_transport(config),
            lifetime: config.session_lifetime,
            current: Mutex::new(None),
            platform,
            site_id: OnceCell::new(),
        }
    }

    /// Return the active session, logging in first if there is none.
    ///
    /// On login failure the state stays absent and the error propagates.
    pub async fn ensure(&self) -> Result<Arc<Session>, CoreError> {
        let mut current = self.current.lock().await;

        if let Some(session) = current.as_ref() {
            if !self.is_due_for_retirement(session) {
                return Ok(Arc::clone(session));
            }
            debug!("retiring session ahead of its lifetime");
            *current = None;
        }

        let session = Arc::new(self.login().await?);
        *current = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Drop `stale` if it is still the current session.
    ///
    /// A caller holding an older session must not discard a newer one
    /// another task already re-established.
    pub async fn invalidate(&self, stale: &Arc<Session>) {
        let mut current = self.current.lock().await;
        if current.as_ref().is_some_and(|s| Arc::ptr_eq(s, stale)) {
            debug!("session invalidated");
            *current = None;
        }
    }

    /// Whether sessions go through the Integration API (API key auth).
    pub fn uses_integration_api(&self) -> bool {
        matches!(self.auth, AuthCredentials::ApiKey(_))
    }

    pub async fn is_active(&self) -> bool {
        self.current.lock().await.is_some()
    }

    /// End the session, logging out of legacy controllers (best effort).
    pub async fn close(&self) {
        let Some(session) = self.current.lock().await.take() else {
            return;
        };
        if let SessionHandle::Legacy { client } = session.handle() {
            if let Err(e) = client.logout().await {
                warn!(error = %e, "logout failed (non-fatal)");
            }
        }
    }

    fn is_due_for_retirement(&self, session: &Session) -> bool {
        self.lifetime.is_some_and(|lifetime| {
            session.issued_at.elapsed() >= lifetime.saturating_sub(RETIREMENT_MARGIN)
        })
    }

    async fn login(&self) -> Result<Session, CoreError> {
        let platform = *self
            .platform
            .get_or_try_init(|| async {
                let platform = LegacyClient::detect_platform(&self.url, &self.transport).await?;
                debug!(?platform, "detected controller platform");
                Ok::<_, CoreError>(platform)
            })
            .await?;

        let handle = match &self.auth {
            AuthCredentials::ApiKey(api_key) => {
                let client = IntegrationClient::from_api_key(
                    self.url.as_str(),
                    api_key,
                    &self.transport,
                    platform,
                )?;
                let site_id = *self
                    .site_id
                    .get_or_try_init(|| resolve_site_id(&client, &self.site))
                    .await?;
                SessionHandle::Integration { client, site_id }
            }
            AuthCredentials::Credentials { username, password } => {
                let client = LegacyClient::new(
                    self.url.clone(),
                    self.site.clone(),
                    platform,
                    &self.transport,
                )?;
                client.login(username, password).await?;
                SessionHandle::Legacy { client }
            }
        };

        info!(site = %self.site, "controller session established");
        Ok(Session::new(handle))
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn build_transport(config: &ServiceConfig) -> TransportConfig {
    TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: config.timeout,
        cookie_jar: None, // LegacyClient::new adds one per login
    }
}

/// Resolve the Integration API site UUID from a site name or UUID string.
///
/// A UUID is used as-is. Otherwise lists all sites and matches on
/// `internal_reference`.
async fn resolve_site_id(client: &IntegrationClient, site_name: &str) -> Result<Uuid, CoreError> {
    if let Ok(uuid) = Uuid::parse_str(site_name) {
        return Ok(uuid);
    }

    let sites = client
        .paginate_all(SITE_PAGE_LIMIT, |off, lim| client.list_sites(off, lim))
        .await?;

    let site_id = sites
        .into_iter()
        .find(|s| s.internal_reference == site_name)
        .map(|s| s.id)
        .ok_or_else(|| CoreError::SiteNotFound {
            name: site_name.to_owned(),
        })?;
    debug!(%site_id, "resolved Integration API site UUID");
    Ok(site_id)
}
