use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::role::Role;

/// Signed token issued by the remote login endpoint, paired with its expiry.
/// The pairing is deliberate: a token whose expiry cannot be established never
/// enters a session, so every expiry check is a plain timestamp comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// The authenticated context for the current tab. Held in tab-scoped volatile
/// storage only; a full restart always starts logged out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub assigned_stores: HashSet<String>,
    pub tenant_id: String,
    /// Present only for online logins. Offline sessions skip token-expiry
    /// checks; the inactivity timeout still applies.
    pub token: Option<AuthToken>,
    pub last_activity_at: DateTime<Utc>,
}

/// Authentication class of the current tab, as observed from outside.
/// `Authenticating` and `Expiring` are transient inside `login()` and the
/// read path and never observable between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    LoggedOut,
    ActiveOnline,
    ActiveOffline,
}

impl Session {
    /// True once the inactivity window has elapsed since the last touch.
    pub fn idle_expired(&self, now: DateTime<Utc>, idle_timeout: Duration) -> bool {
        now - self.last_activity_at > idle_timeout
    }

    /// True for online sessions whose token has lapsed. Offline sessions
    /// carry no token and can never token-expire.
    pub fn token_expired(&self, now: DateTime<Utc>) -> bool {
        match &self.token {
            Some(token) => token.is_expired(now),
            None => false,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.token.is_some() {
            SessionState::ActiveOnline
        } else {
            SessionState::ActiveOffline
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(token: Option<AuthToken>, last_activity_at: DateTime<Utc>) -> Session {
        Session {
            user_id: "user-1".into(),
            username: "alice".into(),
            display_name: "Dr. Alice".into(),
            role: Role::Manager,
            assigned_stores: HashSet::from(["StoreA".to_string()]),
            tenant_id: "tenant-1".into(),
            token,
            last_activity_at,
        }
    }

    #[test]
    fn idle_expiry_uses_last_activity() {
        let now = Utc::now();
        let s = session(None, now - Duration::minutes(31));
        assert!(s.idle_expired(now, Duration::minutes(30)));
        let fresh = session(None, now - Duration::minutes(5));
        assert!(!fresh.idle_expired(now, Duration::minutes(30)));
    }

    #[test]
    fn offline_session_never_token_expires() {
        let now = Utc::now();
        let s = session(None, now);
        assert!(!s.token_expired(now));
        assert_eq!(s.state(), SessionState::ActiveOffline);
    }

    #[test]
    fn online_session_token_expiry_is_inclusive() {
        let now = Utc::now();
        let s = session(
            Some(AuthToken {
                value: "tok".into(),
                expires_at: now,
            }),
            now,
        );
        assert!(s.token_expired(now));
        assert_eq!(s.state(), SessionState::ActiveOnline);
    }
}
