use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::broadcast;

// Declare modules
pub mod adapters;
pub mod application;
pub mod domain;
pub mod seed;

use domain::records::{ChangeEvent, Record, Table};
use domain::role::Role;
use domain::session::AuthToken;
use domain::tenant::TenantConfig;

// Define a common error type for the core library
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure modes of the remote login endpoint, kept as two distinct variants
/// on purpose: an explicit rejection is authoritative and must never fall
/// through to the offline verification path, while a transport failure must.
#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("remote endpoint rejected the credentials")]
    Rejected,
    #[error("remote endpoint unreachable: {0}")]
    Unreachable(String),
}

/// Successful payload of the remote login endpoint.
#[derive(Debug, Clone)]
pub struct RemoteLogin {
    pub user_id: String,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub assigned_stores: HashSet<String>,
    pub tenant_id: String,
    pub token: AuthToken,
    pub tenant_config: Option<TenantConfig>,
}

/// Result of the opaque password-reset endpoints. The remote side owns the
/// token lifecycle; we only surface success or a user-presentable error.
#[derive(Debug, Clone)]
pub struct ResetOutcome {
    pub success: bool,
    pub error: Option<String>,
}

// Port for the remote authentication service
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Verify credentials against the online service.
    async fn login(&self, username: &str, password: &str) -> Result<RemoteLogin, GatewayError>;

    /// Ask the remote side to issue a password-reset token (black box).
    async fn request_password_reset(&self, username: &str) -> Result<ResetOutcome, GatewayError>;

    /// Redeem a password-reset token (black box).
    async fn confirm_password_reset(
        &self,
        reset_token: &str,
        new_password: &str,
    ) -> Result<ResetOutcome, GatewayError>;
}

// Port for the durable local user directory used by offline verification
#[async_trait]
pub trait CredentialDirectory: Send + Sync {
    /// Look up an *active* credential record by username. Inactive records
    /// are invisible to callers by contract.
    async fn find_active(
        &self,
        username: &str,
    ) -> Result<Option<domain::credentials::CredentialRecord>, CoreError>;

    /// Insert or replace the record for `record.username`.
    async fn upsert(
        &self,
        record: domain::credentials::CredentialRecord,
    ) -> Result<(), CoreError>;
}

// Port for tab-scoped volatile storage holding the session and tenant config.
// Never outlives the tab; a full restart starts logged out.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<domain::session::Session>, CoreError>;
    async fn store(&self, session: &domain::session::Session) -> Result<(), CoreError>;
    async fn load_tenant(&self) -> Result<Option<TenantConfig>, CoreError>;
    async fn store_tenant(&self, config: &TenantConfig) -> Result<(), CoreError>;
    /// Purge session, token and tenant config in one shot (logout path).
    async fn clear(&self) -> Result<(), CoreError>;
}

// Port for the realtime change feed. Subscribing hands back a broadcast
// receiver; delivery is at-least-once and unordered across tables, which is
// why the reconciler must stay idempotent.
pub trait ChangeFeed: Send + Sync {
    fn subscribe(&self, table: Table) -> broadcast::Receiver<ChangeEvent>;
}

// Port for the bulk initial load
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch a full dataset snapshot keyed by table.
    async fn load_all(&self) -> Result<HashMap<Table, Vec<Record>>, CoreError>;
}

// Port for durable byte-oriented caching (dataset mirror, tenant fallback)
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError>;
    async fn set(
        &self,
        key: &str,
        value: &[u8],
        ttl_seconds: Option<u64>,
    ) -> Result<(), CoreError>;
    async fn delete(&self, key: &str) -> Result<(), CoreError>;
}
