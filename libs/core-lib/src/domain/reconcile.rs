use tracing::debug;

use super::records::{ChangeEvent, ChangeKind, Record};

/// Merge one change event into a collection, returning the new collection.
/// The input is never mutated; callers swap the result in wholesale.
///
/// The feed delivers at-least-once and unordered across tables, so every
/// branch must be idempotent and anomaly-tolerant:
/// - duplicate INSERT keeps the existing row (bulk load racing a live insert)
/// - UPDATE of a missing id self-heals as an insert (dropped notification)
/// - DELETE of an unknown id is a silent no-op
///
/// Insertion order is preserved for UI stability; an UPDATE replaces in place.
pub fn apply(rows: &[Record], event: &ChangeEvent) -> Vec<Record> {
    let id = event.record.id.as_str();
    match event.kind {
        ChangeKind::Insert => {
            if rows.iter().any(|r| r.id == id) {
                debug!(table = event.table.as_str(), id, "duplicate insert ignored");
                rows.to_vec()
            } else {
                let mut next = rows.to_vec();
                next.push(event.record.clone());
                next
            }
        }
        ChangeKind::Update => match rows.iter().position(|r| r.id == id) {
            Some(pos) => {
                let mut next = rows.to_vec();
                next[pos] = event.record.clone();
                next
            }
            None => {
                debug!(
                    table = event.table.as_str(),
                    id, "update for unknown id treated as insert"
                );
                let mut next = rows.to_vec();
                next.push(event.record.clone());
                next
            }
        },
        ChangeKind::Delete => {
            if rows.iter().any(|r| r.id == id) {
                rows.iter().filter(|r| r.id != id).cloned().collect()
            } else {
                debug!(table = event.table.as_str(), id, "delete for unknown id ignored");
                rows.to_vec()
            }
        }
    }
}
