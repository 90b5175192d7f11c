//! Bundled fallback dataset. Used only when both the bulk load and the
//! durable mirror are unusable: enough rows for every feature page to render
//! something sensible instead of blocking on a dead backend.

use std::collections::HashMap;

use crate::domain::records::{Record, SHARED_SCOPE, Table};

pub fn dataset() -> HashMap<Table, Vec<Record>> {
    let mut tables = HashMap::new();

    tables.insert(
        Table::Services,
        vec![
            Record::new("seed-svc-consult")
                .with_field("name", "General consultation")
                .with_field("duration_minutes", 30),
            Record::new("seed-svc-followup")
                .with_field("name", "Follow-up visit")
                .with_field("duration_minutes", 15),
        ],
    );

    tables.insert(
        Table::Patients,
        vec![
            Record::new("seed-pat-1")
                .with_store(SHARED_SCOPE)
                .with_field("name", "Sample Patient")
                .with_field("placeholder", true),
        ],
    );

    tables.insert(
        Table::Bookings,
        vec![
            Record::new("seed-bkg-1")
                .with_store(SHARED_SCOPE)
                .with_field("patient_id", "seed-pat-1")
                .with_field("service_id", "seed-svc-consult")
                .with_field("placeholder", true),
        ],
    );

    // Empty but present, so table lookups behave uniformly.
    for table in [
        Table::Revenue,
        Table::Expenses,
        Table::Inventory,
        Table::Messages,
        Table::Staff,
    ] {
        tables.insert(table, Vec::new());
    }

    tables
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_covers_every_table() {
        let seeded = dataset();
        for table in Table::ALL {
            assert!(seeded.contains_key(&table), "{table:?} missing from seed");
        }
    }

    #[test]
    fn seed_rows_are_marked_as_placeholders() {
        let seeded = dataset();
        for row in &seeded[&Table::Patients] {
            assert_eq!(row.extra.get("placeholder"), Some(&true.into()));
        }
    }

    #[test]
    fn seed_ids_never_collide_with_live_data_conventions() {
        let seeded = dataset();
        for rows in seeded.values() {
            for row in rows {
                assert!(row.id.starts_with("seed-"));
            }
        }
    }
}
