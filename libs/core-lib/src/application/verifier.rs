use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::credentials::{self, CredentialRecord};
use crate::domain::session::Session;
use crate::domain::tenant::TenantConfig;
use crate::{AuthGateway, CoreError, CredentialDirectory, GatewayError};

/// Why a login attempt was turned away. Deliberately coarse towards the user
/// (feature pages show one generic message) but precise enough for logs.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    #[error("the online service rejected the credentials")]
    RemoteRejected,
    #[error("no matching local account")]
    UnknownUser,
    #[error("password mismatch or unusable stored credential")]
    BadCredentials,
}

/// Outcome of credential verification. A closed three-way union rather than
/// nested fallbacks: `Rejected` from the remote path is final and the type
/// gives the offline branch no way to resurrect it.
#[derive(Debug, Clone)]
pub enum Verification {
    /// Confirmed by the online service; carries a signed token and usually
    /// the tenant config.
    Remote {
        session: Session,
        tenant: Option<TenantConfig>,
    },
    /// Confirmed against the local directory; no token.
    Local { session: Session },
    Rejected(RejectReason),
}

/// Validates a username/password pair remotely first, with a local fallback
/// only for transport failures.
pub struct CredentialVerifier {
    gateway: Arc<dyn AuthGateway>,
    directory: Arc<dyn CredentialDirectory>,
}

impl CredentialVerifier {
    pub fn new(gateway: Arc<dyn AuthGateway>, directory: Arc<dyn CredentialDirectory>) -> Self {
        Self { gateway, directory }
    }

    pub async fn verify(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Verification, CoreError> {
        match self.gateway.login(username, password).await {
            Ok(remote) => {
                info!(username, "remote verification succeeded");
                // Refresh the local directory so this user can authenticate
                // offline later. Failure here must not fail the login.
                if let Err(e) = self.cache_credentials(&remote, password).await {
                    warn!(username, "could not refresh offline credentials: {e}");
                }
                let session = Session {
                    user_id: remote.user_id,
                    username: remote.username,
                    display_name: remote.display_name,
                    role: remote.role,
                    assigned_stores: remote.assigned_stores,
                    tenant_id: remote.tenant_id,
                    token: Some(remote.token),
                    last_activity_at: Utc::now(),
                };
                Ok(Verification::Remote {
                    session,
                    tenant: remote.tenant_config,
                })
            }
            // An explicit rejection is authoritative. Falling through to the
            // offline path here would let a flaky remote downgrade security.
            Err(GatewayError::Rejected) => {
                info!(username, "remote verification rejected the credentials");
                Ok(Verification::Rejected(RejectReason::RemoteRejected))
            }
            Err(GatewayError::Unreachable(reason)) => {
                warn!(username, reason, "remote unreachable; trying offline directory");
                self.verify_offline(username, password).await
            }
        }
    }

    async fn verify_offline(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Verification, CoreError> {
        let Some(record) = self.directory.find_active(username).await? else {
            return Ok(Verification::Rejected(RejectReason::UnknownUser));
        };
        if !credentials::verify_offline(&record, password) {
            return Ok(Verification::Rejected(RejectReason::BadCredentials));
        }
        info!(username, "offline verification succeeded");
        let session = Session {
            user_id: record.user_id,
            username: record.username,
            display_name: record.display_name,
            role: record.role,
            assigned_stores: record.assigned_stores,
            tenant_id: record.tenant_id,
            token: None,
            last_activity_at: Utc::now(),
        };
        Ok(Verification::Local { session })
    }

    async fn cache_credentials(
        &self,
        remote: &crate::RemoteLogin,
        password: &str,
    ) -> Result<(), CoreError> {
        let record = CredentialRecord {
            user_id: remote.user_id.clone(),
            username: remote.username.clone(),
            display_name: remote.display_name.clone(),
            password_hash: credentials::hash_password(password)?,
            role: remote.role,
            assigned_stores: remote.assigned_stores.clone(),
            tenant_id: remote.tenant_id.clone(),
            active: true,
        };
        self.directory.upsert(record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::in_memory_directory::InMemoryCredentialDirectory;
    use crate::adapters::in_memory_gateway::{InMemoryAuthGateway, ScriptedAccount};
    use crate::domain::role::Role;
    use std::collections::HashSet;

    fn account() -> ScriptedAccount {
        ScriptedAccount {
            password: "hunter2".into(),
            user_id: "u-1".into(),
            display_name: "Alice".into(),
            role: Role::Manager,
            assigned_stores: HashSet::from(["StoreA".to_string()]),
            tenant: TenantConfig {
                tenant_id: "t-1".into(),
                name: "Lakeside".into(),
                ..Default::default()
            },
        }
    }

    fn verifier(
        gateway: Arc<InMemoryAuthGateway>,
        directory: Arc<InMemoryCredentialDirectory>,
    ) -> CredentialVerifier {
        CredentialVerifier::new(gateway, directory)
    }

    #[tokio::test]
    async fn remote_success_yields_a_token_and_tenant() {
        let gateway = Arc::new(InMemoryAuthGateway::default());
        gateway.add_account("alice", account());
        let directory = Arc::new(InMemoryCredentialDirectory::default());

        let outcome = verifier(gateway, directory.clone())
            .verify("alice", "hunter2")
            .await
            .unwrap();

        match outcome {
            Verification::Remote { session, tenant } => {
                assert!(session.token.is_some());
                assert_eq!(tenant.unwrap().tenant_id, "t-1");
            }
            other => panic!("expected Remote, got {other:?}"),
        }
        // The directory was refreshed for later offline use.
        let cached = directory.find_active("alice").await.unwrap().unwrap();
        assert!(cached.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn explicit_remote_rejection_does_not_fall_through() {
        let gateway = Arc::new(InMemoryAuthGateway::default());
        gateway.add_account("alice", account());
        let directory = Arc::new(InMemoryCredentialDirectory::default());
        // Plant a valid local record for the *wrong-password* attempt; it
        // must never be consulted while the remote is reachable.
        directory
            .upsert(CredentialRecord {
                user_id: "u-1".into(),
                username: "alice".into(),
                display_name: "Alice".into(),
                password_hash: credentials::hash_password("wrongpass").unwrap(),
                role: Role::Manager,
                assigned_stores: HashSet::new(),
                tenant_id: "t-1".into(),
                active: true,
            })
            .await
            .unwrap();

        let outcome = verifier(gateway, directory)
            .verify("alice", "wrongpass")
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            Verification::Rejected(RejectReason::RemoteRejected)
        ));
    }

    #[tokio::test]
    async fn transport_failure_falls_through_to_offline() {
        let gateway = Arc::new(InMemoryAuthGateway::default());
        gateway.add_account("alice", account());
        let directory = Arc::new(InMemoryCredentialDirectory::default());
        directory
            .upsert(CredentialRecord {
                user_id: "u-1".into(),
                username: "alice".into(),
                display_name: "Alice".into(),
                password_hash: credentials::hash_password("hunter2").unwrap(),
                role: Role::Manager,
                assigned_stores: HashSet::new(),
                tenant_id: "t-1".into(),
                active: true,
            })
            .await
            .unwrap();
        gateway.set_reachable(false);

        let outcome = verifier(gateway, directory)
            .verify("alice", "hunter2")
            .await
            .unwrap();
        match outcome {
            Verification::Local { session } => assert!(session.token.is_none()),
            other => panic!("expected Local, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn offline_unknown_user_is_rejected() {
        let gateway = Arc::new(InMemoryAuthGateway::default());
        gateway.set_reachable(false);
        let directory = Arc::new(InMemoryCredentialDirectory::default());

        let outcome = verifier(gateway, directory)
            .verify("nobody", "pw")
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            Verification::Rejected(RejectReason::UnknownUser)
        ));
    }
}
