use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::records::{Record, Table};
use crate::{CoreError, SnapshotSource};

/// In-memory implementation of the SnapshotSource port with an availability
/// toggle, so tests can exercise the mirror/seed fallback chain.
#[derive(Debug, Default)]
pub struct InMemorySnapshotSource {
    tables: DashMap<Table, Vec<Record>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemorySnapshotSource {
    pub fn put(&self, table: Table, rows: Vec<Record>) {
        self.tables.insert(table, rows);
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }
}

#[async_trait]
impl SnapshotSource for InMemorySnapshotSource {
    async fn load_all(&self) -> Result<HashMap<Table, Vec<Record>>, CoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CoreError::Transport("bulk load endpoint unreachable".into()));
        }
        Ok(self
            .tables
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_whatever_was_seeded() {
        let source = InMemorySnapshotSource::default();
        source.put(Table::Services, vec![Record::new("svc-1")]);
        let snapshot = source.load_all().await.unwrap();
        assert_eq!(snapshot[&Table::Services].len(), 1);
    }

    #[tokio::test]
    async fn unavailable_source_fails_with_transport_error() {
        let source = InMemorySnapshotSource::default();
        source.set_available(false);
        assert!(matches!(
            source.load_all().await,
            Err(CoreError::Transport(_))
        ));
    }
}
