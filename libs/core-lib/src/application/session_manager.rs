use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use super::verifier::{CredentialVerifier, Verification};
use crate::domain::role::Capability;
use crate::domain::session::{Session, SessionState};
use crate::domain::tenant::TenantConfig;
use crate::{CoreError, SessionStore};

/// Inactivity window after which a session is considered abandoned.
pub const DEFAULT_IDLE_TIMEOUT_MINUTES: i64 = 30;

/// Owns the session lifecycle: login, logout, inactivity timeout and
/// token-expiry checks. Both timeout conditions are re-validated on every
/// read rather than on a timer, so a suspended tab can never hand a stale
/// session to a caller: the read itself destroys it and returns `None`.
pub struct SessionManager {
    verifier: CredentialVerifier,
    store: Arc<dyn SessionStore>,
    idle_timeout: Duration,
}

impl SessionManager {
    pub fn new(verifier: CredentialVerifier, store: Arc<dyn SessionStore>) -> Self {
        Self::with_idle_timeout(
            verifier,
            store,
            Duration::minutes(DEFAULT_IDLE_TIMEOUT_MINUTES),
        )
    }

    pub fn with_idle_timeout(
        verifier: CredentialVerifier,
        store: Arc<dyn SessionStore>,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            verifier,
            store,
            idle_timeout,
        }
    }

    /// Authenticate and install a new session, replacing any existing one.
    /// Rejections surface as `CoreError::Unauthorized`; transport problems on
    /// the offline path as their own error classes.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, CoreError> {
        // Replacement starts from a clean slate so a failed attempt can never
        // leave the previous user's session behind.
        self.store.clear().await?;

        match self.verifier.verify(username, password).await? {
            Verification::Remote { mut session, tenant } => {
                session.last_activity_at = Utc::now();
                self.store.store(&session).await?;
                if let Some(config) = &tenant {
                    self.store.store_tenant(config).await?;
                }
                info!(username, state = ?session.state(), "session established");
                Ok(session)
            }
            Verification::Local { mut session } => {
                session.last_activity_at = Utc::now();
                self.store.store(&session).await?;
                info!(username, state = ?session.state(), "offline session established");
                Ok(session)
            }
            Verification::Rejected(reason) => {
                info!(username, %reason, "login rejected");
                Err(CoreError::Unauthorized(reason.to_string()))
            }
        }
    }

    /// The only way to observe the current session. Re-validates both the
    /// inactivity and token-expiry conditions; a session failing either is
    /// purged before `None` is returned (fail closed).
    pub async fn current_session(&self) -> Option<Session> {
        let session = match self.store.load().await {
            Ok(Some(session)) => session,
            Ok(None) => return None,
            Err(e) => {
                warn!("session store read failed, treating as logged out: {e}");
                return None;
            }
        };

        let now = Utc::now();
        if session.idle_expired(now, self.idle_timeout) {
            info!(username = %session.username, "session idle-expired on read");
            self.purge().await;
            return None;
        }
        if session.token_expired(now) {
            info!(username = %session.username, "session token-expired on read");
            self.purge().await;
            return None;
        }
        Some(session)
    }

    /// Refresh the inactivity clock. Cheap and idempotent; callers may invoke
    /// it on every user interaction. A lapsed session is not resurrected.
    pub async fn touch_activity(&self) {
        if let Some(mut session) = self.current_session().await {
            session.last_activity_at = Utc::now();
            if let Err(e) = self.store.store(&session).await {
                warn!("failed to persist activity touch: {e}");
            }
        }
    }

    /// Explicit logout. Synchronous purge: by the time this returns no caller
    /// can observe the old session.
    pub async fn logout(&self) {
        self.purge().await;
        info!("session logged out");
    }

    pub async fn state(&self) -> SessionState {
        match self.current_session().await {
            Some(session) => session.state(),
            None => SessionState::LoggedOut,
        }
    }

    /// Permission check against the validated current session. Logged out
    /// (or lapsed) means `false` for every capability.
    pub async fn has_capability(&self, capability: Capability) -> bool {
        match self.current_session().await {
            Some(session) => session.role.allows(capability),
            None => false,
        }
    }

    /// Tenant config for the active session, if one was delivered at login.
    /// Offline sessions return `None` and callers degrade to defaults.
    pub async fn tenant_config(&self) -> Option<TenantConfig> {
        self.current_session().await?;
        self.store.load_tenant().await.ok().flatten()
    }

    async fn purge(&self) {
        if let Err(e) = self.store.clear().await {
            warn!("failed to purge session storage: {e}");
        }
    }
}
