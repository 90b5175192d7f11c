use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sentinel store id marking a record as shared across every store of the
/// tenant. Always passes store-based narrowing.
pub const SHARED_SCOPE: &str = "ALL";

/// The closed set of logical tables the client mirrors. The sync controller
/// iterates `Table::ALL`; the scope filter matches on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Table {
    Revenue,
    Expenses,
    Patients,
    Bookings,
    Inventory,
    Messages,
    Staff,
    Services,
}

impl Table {
    pub const ALL: [Table; 8] = [
        Table::Revenue,
        Table::Expenses,
        Table::Patients,
        Table::Bookings,
        Table::Inventory,
        Table::Messages,
        Table::Staff,
        Table::Services,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Revenue => "revenue",
            Table::Expenses => "expenses",
            Table::Patients => "patients",
            Table::Bookings => "bookings",
            Table::Inventory => "inventory",
            Table::Messages => "messages",
            Table::Staff => "staff",
            Table::Services => "services",
        }
    }

    pub fn parse(s: &str) -> Option<Table> {
        Table::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Tables whose rows belong to a single store (or the shared sentinel).
    pub fn is_store_scoped(&self) -> bool {
        matches!(
            self,
            Table::Revenue
                | Table::Expenses
                | Table::Patients
                | Table::Bookings
                | Table::Inventory
                | Table::Messages
        )
    }
}

/// One row of a mirrored collection. Only the fields the core layer reasons
/// about are typed; everything a feature page stores rides along in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practitioner: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            store: None,
            practitioner: None,
            extra: Map::new(),
        }
    }

    pub fn with_store(mut self, store: impl Into<String>) -> Self {
        self.store = Some(store.into());
        self
    }

    pub fn with_practitioner(mut self, practitioner: impl Into<String>) -> Self {
        self.practitioner = Some(practitioner.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// True when the record is visible everywhere regardless of store.
    pub fn is_shared(&self) -> bool {
        self.store.as_deref() == Some(SHARED_SCOPE)
    }
}

/// Immutable point-in-time view of every mirrored collection. Snapshots share
/// the per-table vectors with the live store via `Arc`; taking one is cheap
/// and a concurrent reconciliation can never partially mutate it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub collections: std::collections::HashMap<Table, std::sync::Arc<Vec<Record>>>,
}

impl Dataset {
    pub fn records(&self, table: Table) -> &[Record] {
        self.collections.get(&table).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self, table: Table) -> usize {
        self.records(table).len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.values().all(|rows| rows.is_empty())
    }
}

/// Insert/update/delete notification for a single table. Transient: consumed
/// exactly once by the reconciler, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
    pub record: Record,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<Record>,
}

impl ChangeEvent {
    pub fn insert(table: Table, record: Record) -> Self {
        Self {
            table,
            kind: ChangeKind::Insert,
            record,
            previous: None,
        }
    }

    pub fn update(table: Table, record: Record) -> Self {
        Self {
            table,
            kind: ChangeKind::Update,
            record,
            previous: None,
        }
    }

    pub fn delete(table: Table, record: Record) -> Self {
        Self {
            table,
            kind: ChangeKind::Delete,
            record,
            previous: None,
        }
    }
}
