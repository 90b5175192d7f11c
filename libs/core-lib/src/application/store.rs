use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::domain::reconcile;
use crate::domain::records::{ChangeEvent, Dataset, Record, Table};

/// The single owned home of every mirrored collection, and the single update
/// entry point for both remote change events and local optimistic writes.
/// Feature pages never touch this directly; they get `ScopedDataset`
/// projections from the client facade.
///
/// Each table maps to an `Arc<Vec<Record>>` that is only ever swapped
/// wholesale, never mutated in place, so a snapshot taken mid-reconciliation
/// is always internally consistent.
#[derive(Debug, Default)]
pub struct DatasetStore {
    tables: DashMap<Table, Arc<Vec<Record>>>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entire dataset, e.g. after a bulk load.
    pub fn replace_all(&self, snapshot: HashMap<Table, Vec<Record>>) {
        self.tables.clear();
        for (table, rows) in snapshot {
            self.tables.insert(table, Arc::new(rows));
        }
    }

    /// Route one change event through the reconciler and swap the affected
    /// table's vector. Anomalies (duplicates, unknown ids) are absorbed by
    /// the reconciler and never surface as errors.
    pub fn apply(&self, event: &ChangeEvent) {
        let current = self
            .tables
            .get(&event.table)
            .map(|entry| Arc::clone(entry.value()))
            .unwrap_or_default();
        let next = reconcile::apply(&current, event);
        debug!(
            table = event.table.as_str(),
            kind = ?event.kind,
            rows = next.len(),
            "reconciled change event"
        );
        self.tables.insert(event.table, Arc::new(next));
    }

    /// Cheap point-in-time view sharing the per-table vectors.
    pub fn snapshot(&self) -> Dataset {
        let mut collections = HashMap::with_capacity(self.tables.len());
        for entry in self.tables.iter() {
            collections.insert(*entry.key(), Arc::clone(entry.value()));
        }
        Dataset { collections }
    }

    pub fn len(&self, table: Table) -> usize {
        self.tables.get(&table).map(|rows| rows.len()).unwrap_or(0)
    }

    /// Drop every collection (logout path; prevents cross-user leakage when
    /// a different user signs into the same tab).
    pub fn clear(&self) {
        self.tables.clear();
    }
}
