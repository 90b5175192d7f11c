use std::collections::HashMap;

use super::records::{Dataset, Record, Table};
use super::role::Role;
use super::session::Session;

/// How one (role, table) pair narrows a collection. Closed union so that a
/// new role or table refuses to compile until every rule is spelled out;
/// there is no "default to unfiltered" arm anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeRule {
    /// Full pass-through, subject only to the caller's store selector.
    /// Reserved for the Owner role.
    Everything,
    /// Narrow store-scoped rows to the session's assigned stores plus the
    /// shared sentinel; rows without a store are dropped (fail closed).
    AssignedStores,
    /// Only rows attributed to the session holder's display name.
    OwnRecords,
    /// Empty result. The fallback for everything not explicitly allowed.
    Denied,
}

/// The complete scoping policy. Exhaustive over both enums on purpose.
pub fn rule_for(role: Role, table: Table) -> ScopeRule {
    use ScopeRule::*;
    use Table::*;
    match role {
        Role::Owner => Everything,
        Role::Manager => match table {
            Revenue | Expenses | Patients | Bookings | Inventory | Messages => AssignedStores,
            Services => Everything,
            Staff => Denied,
        },
        Role::Staff => match table {
            Patients | Bookings | Messages => AssignedStores,
            Services => Everything,
            Revenue | Expenses | Inventory | Staff => Denied,
        },
        Role::Practitioner => match table {
            Patients | Bookings => OwnRecords,
            Services => Everything,
            Revenue | Expenses | Inventory | Messages | Staff => Denied,
        },
    }
}

/// Role/store-narrowed projection handed to feature pages. `unrestricted` is
/// set only for an Owner session with no store selected; every consumer that
/// renders cross-store aggregates must check it explicitly.
#[derive(Debug, Clone, Default)]
pub struct ScopedDataset {
    pub collections: HashMap<Table, Vec<Record>>,
    pub unrestricted: bool,
}

impl ScopedDataset {
    pub fn records(&self, table: Table) -> &[Record] {
        self.collections.get(&table).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self, table: Table) -> usize {
        self.records(table).len()
    }
}

/// Pure projection of the full dataset down to what `session` may see,
/// optionally narrowed further to a single selected store. No I/O, inputs
/// untouched. Must be re-derived after any session or selector change; the
/// result is a snapshot, never a live view.
pub fn scope(dataset: &Dataset, session: &Session, selected_store: Option<&str>) -> ScopedDataset {
    let mut collections = HashMap::with_capacity(Table::ALL.len());

    for table in Table::ALL {
        let rows = dataset.records(table);
        let visible: Vec<Record> = match rule_for(session.role, table) {
            ScopeRule::Denied => Vec::new(),
            ScopeRule::Everything => match (table.is_store_scoped(), selected_store) {
                (true, Some(store)) => rows
                    .iter()
                    .filter(|r| r.store.as_deref() == Some(store) || r.is_shared())
                    .cloned()
                    .collect(),
                _ => rows.to_vec(),
            },
            ScopeRule::AssignedStores => rows
                .iter()
                .filter(|r| {
                    r.is_shared()
                        || r.store
                            .as_deref()
                            .is_some_and(|s| session.assigned_stores.contains(s))
                })
                .cloned()
                .collect(),
            ScopeRule::OwnRecords => rows
                .iter()
                .filter(|r| r.practitioner.as_deref() == Some(session.display_name.as_str()))
                .cloned()
                .collect(),
        };
        collections.insert(table, visible);
    }

    ScopedDataset {
        collections,
        unrestricted: session.role == Role::Owner && selected_store.is_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::SHARED_SCOPE;
    use crate::domain::session::Session;
    use chrono::Utc;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn session(role: Role, stores: &[&str], display_name: &str) -> Session {
        Session {
            user_id: "u-1".into(),
            username: "user".into(),
            display_name: display_name.into(),
            role,
            assigned_stores: stores.iter().map(|s| s.to_string()).collect(),
            tenant_id: "t-1".into(),
            token: None,
            last_activity_at: Utc::now(),
        }
    }

    fn dataset() -> Dataset {
        let mut collections = std::collections::HashMap::new();
        collections.insert(
            Table::Revenue,
            Arc::new(vec![
                Record::new("r-a").with_store("StoreA"),
                Record::new("r-b").with_store("StoreB"),
                Record::new("r-shared").with_store(SHARED_SCOPE),
                Record::new("r-unscoped"),
            ]),
        );
        collections.insert(
            Table::Patients,
            Arc::new(vec![
                Record::new("p-a").with_store("StoreA").with_practitioner("Dr. Wu"),
                Record::new("p-b").with_store("StoreB").with_practitioner("Dr. Ito"),
            ]),
        );
        collections.insert(
            Table::Services,
            Arc::new(vec![Record::new("svc-1"), Record::new("svc-2")]),
        );
        Dataset { collections }
    }

    #[test]
    fn owner_with_no_selection_sees_everything_flagged_unrestricted() {
        let view = scope(&dataset(), &session(Role::Owner, &[], "Boss"), None);
        assert!(view.unrestricted);
        assert_eq!(view.len(Table::Revenue), 4);
        assert_eq!(view.len(Table::Patients), 2);
    }

    #[test]
    fn owner_with_selection_narrows_store_scoped_tables_only() {
        let view = scope(&dataset(), &session(Role::Owner, &[], "Boss"), Some("StoreA"));
        assert!(!view.unrestricted);
        let ids: Vec<&str> = view.records(Table::Revenue).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r-a", "r-shared"]);
        // Non-store-scoped tables pass through untouched.
        assert_eq!(view.len(Table::Services), 2);
    }

    #[test]
    fn manager_is_pinned_to_assigned_stores_plus_sentinel() {
        let view = scope(&dataset(), &session(Role::Manager, &["StoreA"], "Mgr"), None);
        let ids: Vec<&str> = view.records(Table::Revenue).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r-a", "r-shared"]);
        // Staff table has no rule for managers: empty, never pass-through.
        assert_eq!(view.len(Table::Staff), 0);
        assert!(!view.unrestricted);
    }

    #[test]
    fn rows_without_a_store_fail_closed_for_non_owners() {
        let view = scope(&dataset(), &session(Role::Manager, &["StoreA"], "Mgr"), None);
        assert!(!view.records(Table::Revenue).iter().any(|r| r.id == "r-unscoped"));
    }

    #[test]
    fn staff_never_sees_financials() {
        let view = scope(&dataset(), &session(Role::Staff, &["StoreA", "StoreB"], "Desk"), None);
        assert_eq!(view.len(Table::Revenue), 0);
        assert_eq!(view.len(Table::Patients), 2);
    }

    #[test]
    fn practitioner_sees_only_attributed_rows() {
        let view = scope(&dataset(), &session(Role::Practitioner, &[], "Dr. Wu"), None);
        let ids: Vec<&str> = view.records(Table::Patients).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["p-a"]);
        assert_eq!(view.len(Table::Revenue), 0, "financials forced empty");
        assert_eq!(view.len(Table::Messages), 0);
    }

    #[test]
    fn every_non_owner_denied_table_is_empty_not_missing() {
        // Fail-closed property: for each role, any table without an explicit
        // allow rule yields an empty collection rather than the source rows.
        for role in [Role::Manager, Role::Staff, Role::Practitioner] {
            let view = scope(&dataset(), &session(role, &["StoreA"], "X"), None);
            for table in Table::ALL {
                if rule_for(role, table) == ScopeRule::Denied {
                    assert_eq!(view.len(table), 0, "{role:?}/{table:?} leaked");
                }
            }
            assert!(!view.unrestricted);
        }
    }
}
