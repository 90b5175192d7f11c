use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::domain::credentials::CredentialRecord;
use crate::{CoreError, CredentialDirectory};

/// In-memory implementation of the CredentialDirectory port. Usernames are
/// case-insensitive, matching how the remote directory treats them.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialDirectory {
    // Store: lowercased username -> CredentialRecord
    records: Arc<DashMap<String, CredentialRecord>>,
}

#[async_trait]
impl CredentialDirectory for InMemoryCredentialDirectory {
    async fn find_active(&self, username: &str) -> Result<Option<CredentialRecord>, CoreError> {
        Ok(self
            .records
            .get(&username.to_lowercase())
            .map(|entry| entry.value().clone())
            .filter(|record| record.active))
    }

    async fn upsert(&self, record: CredentialRecord) -> Result<(), CoreError> {
        self.records.insert(record.username.to_lowercase(), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::role::Role;
    use std::collections::HashSet;

    fn record(username: &str, active: bool) -> CredentialRecord {
        CredentialRecord {
            user_id: "u-1".into(),
            username: username.into(),
            display_name: username.into(),
            password_hash: "$argon2id$...".into(),
            role: Role::Staff,
            assigned_stores: HashSet::new(),
            tenant_id: "t-1".into(),
            active,
        }
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let directory = InMemoryCredentialDirectory::default();
        directory.upsert(record("Alice", true)).await.unwrap();
        assert!(directory.find_active("alice").await.unwrap().is_some());
        assert!(directory.find_active("ALICE").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn inactive_records_are_invisible() {
        let directory = InMemoryCredentialDirectory::default();
        directory.upsert(record("bob", false)).await.unwrap();
        assert!(directory.find_active("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_the_existing_record() {
        let directory = InMemoryCredentialDirectory::default();
        directory.upsert(record("carol", true)).await.unwrap();
        let mut updated = record("carol", true);
        updated.display_name = "Carol S.".into();
        directory.upsert(updated).await.unwrap();

        let found = directory.find_active("carol").await.unwrap().unwrap();
        assert_eq!(found.display_name, "Carol S.");
    }
}
