use chrono::Duration;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::session_manager::{DEFAULT_IDLE_TIMEOUT_MINUTES, SessionManager};
use super::store::DatasetStore;
use super::sync::{SyncController, SyncReport};
use super::verifier::CredentialVerifier;
use crate::domain::records::ChangeEvent;
use crate::domain::role::Capability;
use crate::domain::scope::{ScopedDataset, scope};
use crate::domain::session::{Session, SessionState};
use crate::domain::tenant::TenantConfig;
use crate::{
    AuthGateway, Cache, ChangeFeed, CoreError, CredentialDirectory, GatewayError, ResetOutcome,
    SessionStore, SnapshotSource,
};

/// Knobs a deployment may tune. Defaults match production behaviour.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub idle_timeout: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::minutes(DEFAULT_IDLE_TIMEOUT_MINUTES),
        }
    }
}

/// The surface feature pages program against. Everything else in this crate
/// sits behind it: pages get a validated session, capability answers, scoped
/// read projections and one narrow write entry point — never the raw
/// collections.
pub struct ClientCore {
    sessions: SessionManager,
    sync: SyncController,
    store: Arc<DatasetStore>,
    gateway: Arc<dyn AuthGateway>,
    selected_store: RwLock<Option<String>>,
}

impl ClientCore {
    pub fn new(
        gateway: Arc<dyn AuthGateway>,
        directory: Arc<dyn CredentialDirectory>,
        session_store: Arc<dyn SessionStore>,
        feed: Arc<dyn ChangeFeed>,
        snapshots: Arc<dyn SnapshotSource>,
        cache: Arc<dyn Cache>,
        config: CoreConfig,
    ) -> Self {
        let store = Arc::new(DatasetStore::new());
        let verifier = CredentialVerifier::new(Arc::clone(&gateway), directory);
        let sessions =
            SessionManager::with_idle_timeout(verifier, session_store, config.idle_timeout);
        let sync = SyncController::new(feed, snapshots, cache, Arc::clone(&store));
        Self {
            sessions,
            sync,
            store,
            gateway,
            selected_store: RwLock::new(None),
        }
    }

    /// Authenticate, then bring the dataset up and open the subscriptions.
    /// The sync report tells callers whether they are looking at live data.
    pub async fn login(&self, username: &str, password: &str) -> Result<SyncReport, CoreError> {
        let session = self.sessions.login(username, password).await?;
        *self.selected_store.write().await = None;
        let report = self.sync.start().await?;
        info!(username = %session.username, source = ?report.source, "client core ready");
        Ok(report)
    }

    /// Logout is the single cancellation point. The session is invalidated
    /// synchronously *before* the subscriptions are torn down, so no
    /// late-arriving event can be attributed to a since-ended session.
    pub async fn logout(&self) {
        self.sessions.logout().await;
        self.sync.stop().await;
        self.store.clear();
        *self.selected_store.write().await = None;
    }

    /// Validated current session, or `None`. A lapse detected here also tears
    /// the subscriptions down — the session is gone either way by the time
    /// the caller sees `None`.
    pub async fn current_session(&self) -> Option<Session> {
        match self.sessions.current_session().await {
            Some(session) => Some(session),
            None => {
                if self.sync.is_running().await {
                    self.sync.stop().await;
                    self.store.clear();
                }
                None
            }
        }
    }

    pub async fn session_state(&self) -> SessionState {
        match self.current_session().await {
            Some(session) => session.state(),
            None => SessionState::LoggedOut,
        }
    }

    pub async fn touch_activity(&self) {
        self.sessions.touch_activity().await;
    }

    /// Capability check for action gating; always `false` when logged out.
    pub async fn has_capability(&self, capability: Capability) -> bool {
        self.current_session().await.is_some() && self.sessions.has_capability(capability).await
    }

    /// Change (or clear) the active store selector used by `scoped_view`.
    pub async fn select_store(&self, store: Option<String>) {
        *self.selected_store.write().await = store;
    }

    /// Role/store-narrowed projection of the shared dataset. Re-derived on
    /// every call from the validated session and the current selector; a
    /// lapsed session yields the empty view.
    pub async fn scoped_view(&self) -> ScopedDataset {
        let Some(session) = self.current_session().await else {
            return ScopedDataset::default();
        };
        let selected = self.selected_store.read().await.clone();
        scope(&self.store.snapshot(), &session, selected.as_deref())
    }

    /// Local optimistic write. Feeds the exact reconciliation path remote
    /// events take, so a later echo of the same logical write converges
    /// instead of double-applying.
    pub async fn dispatch_local(&self, event: ChangeEvent) -> Result<(), CoreError> {
        if self.current_session().await.is_none() {
            return Err(CoreError::Unauthorized(
                "no active session for local write".into(),
            ));
        }
        self.store.apply(&event);
        Ok(())
    }

    pub async fn tenant_config(&self) -> Option<TenantConfig> {
        self.sessions.tenant_config().await
    }

    /// Password-reset passthroughs; the remote side owns the token lifecycle.
    pub async fn request_password_reset(&self, username: &str) -> Result<ResetOutcome, CoreError> {
        self.gateway
            .request_password_reset(username)
            .await
            .map_err(reset_error)
    }

    pub async fn confirm_password_reset(
        &self,
        reset_token: &str,
        new_password: &str,
    ) -> Result<ResetOutcome, CoreError> {
        self.gateway
            .confirm_password_reset(reset_token, new_password)
            .await
            .map_err(reset_error)
    }
}

fn reset_error(err: GatewayError) -> CoreError {
    match err {
        GatewayError::Rejected => CoreError::Unauthorized("reset request rejected".into()),
        GatewayError::Unreachable(reason) => CoreError::Transport(reason),
    }
}
