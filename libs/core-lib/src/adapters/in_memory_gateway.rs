use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use uuid::Uuid;

use crate::domain::role::Role;
use crate::domain::session::AuthToken;
use crate::domain::tenant::TenantConfig;
use crate::{AuthGateway, GatewayError, RemoteLogin, ResetOutcome};

/// One scripted remote account. The "remote side" stores the plain password
/// here because it plays the backend, which does its own hashing server-side;
/// nothing in the client ever persists it.
#[derive(Debug, Clone)]
pub struct ScriptedAccount {
    pub password: String,
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
    pub assigned_stores: HashSet<String>,
    pub tenant: TenantConfig,
}

/// In-memory implementation of the AuthGateway port: scripted accounts, a
/// reachability toggle to simulate transport failures, and uuid-based reset
/// tokens. Suitable for tests and single-executable mode.
pub struct InMemoryAuthGateway {
    accounts: DashMap<String, ScriptedAccount>,
    reset_tokens: DashMap<String, String>, // token -> username
    reachable: AtomicBool,
    token_ttl_secs: AtomicI64,
}

impl Default for InMemoryAuthGateway {
    fn default() -> Self {
        Self {
            accounts: DashMap::new(),
            reset_tokens: DashMap::new(),
            reachable: AtomicBool::new(true),
            token_ttl_secs: AtomicI64::new(8 * 3600),
        }
    }
}

impl InMemoryAuthGateway {
    pub fn add_account(&self, username: &str, account: ScriptedAccount) {
        self.accounts.insert(username.to_lowercase(), account);
    }

    /// Simulate the network going away (or coming back).
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Lifetime of tokens minted by subsequent logins. A zero or negative
    /// TTL mints already-expired tokens, handy for expiry tests.
    pub fn set_token_ttl(&self, ttl: Duration) {
        self.token_ttl_secs.store(ttl.num_seconds(), Ordering::SeqCst);
    }

    fn check_reachable(&self) -> Result<(), GatewayError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(GatewayError::Unreachable("network unreachable".into()))
        }
    }
}

#[async_trait]
impl AuthGateway for InMemoryAuthGateway {
    async fn login(&self, username: &str, password: &str) -> Result<RemoteLogin, GatewayError> {
        self.check_reachable()?;
        let account = self
            .accounts
            .get(&username.to_lowercase())
            .ok_or(GatewayError::Rejected)?;
        if account.password != password {
            return Err(GatewayError::Rejected);
        }
        let ttl = Duration::seconds(self.token_ttl_secs.load(Ordering::SeqCst));
        Ok(RemoteLogin {
            user_id: account.user_id.clone(),
            username: username.to_string(),
            display_name: account.display_name.clone(),
            role: account.role,
            assigned_stores: account.assigned_stores.clone(),
            tenant_id: account.tenant.tenant_id.clone(),
            token: AuthToken {
                value: Uuid::new_v4().to_string(),
                expires_at: Utc::now() + ttl,
            },
            tenant_config: Some(account.tenant.clone()),
        })
    }

    async fn request_password_reset(&self, username: &str) -> Result<ResetOutcome, GatewayError> {
        self.check_reachable()?;
        let key = username.to_lowercase();
        if !self.accounts.contains_key(&key) {
            // Mirror the real endpoint: no user enumeration, always "sent".
            return Ok(ResetOutcome {
                success: true,
                error: None,
            });
        }
        let token = Uuid::new_v4().to_string();
        self.reset_tokens.insert(token, key);
        Ok(ResetOutcome {
            success: true,
            error: None,
        })
    }

    async fn confirm_password_reset(
        &self,
        reset_token: &str,
        new_password: &str,
    ) -> Result<ResetOutcome, GatewayError> {
        self.check_reachable()?;
        let Some((_, username)) = self.reset_tokens.remove(reset_token) else {
            return Ok(ResetOutcome {
                success: false,
                error: Some("invalid or expired reset token".into()),
            });
        };
        if let Some(mut account) = self.accounts.get_mut(&username) {
            account.password = new_password.to_string();
        }
        Ok(ResetOutcome {
            success: true,
            error: None,
        })
    }
}
