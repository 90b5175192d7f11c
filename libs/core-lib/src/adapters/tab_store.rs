use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::session::Session;
use crate::domain::tenant::TenantConfig;
use crate::{CoreError, SessionStore};

/// Tab-scoped volatile storage for the session and tenant config. Holds
/// everything in process memory, so it naturally vanishes with the tab —
/// exactly the persistence class the SessionStore port demands.
#[derive(Debug, Default)]
pub struct TabSessionStore {
    session: RwLock<Option<Session>>,
    tenant: RwLock<Option<TenantConfig>>,
}

#[async_trait]
impl SessionStore for TabSessionStore {
    async fn load(&self) -> Result<Option<Session>, CoreError> {
        Ok(self.session.read().await.clone())
    }

    async fn store(&self, session: &Session) -> Result<(), CoreError> {
        *self.session.write().await = Some(session.clone());
        Ok(())
    }

    async fn load_tenant(&self) -> Result<Option<TenantConfig>, CoreError> {
        Ok(self.tenant.read().await.clone())
    }

    async fn store_tenant(&self, config: &TenantConfig) -> Result<(), CoreError> {
        *self.tenant.write().await = Some(config.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), CoreError> {
        *self.session.write().await = None;
        *self.tenant.write().await = None;
        Ok(())
    }
}
