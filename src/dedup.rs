//! Collapse symmetric relationship pairs before display.
//!
//! Two directed edges between the same two characters (A→B and B→A) state one
//! undirected fact twice. Only the first one seen survives; nothing from the
//! dropped edge is merged into the kept one.

use std::collections::HashSet;

use tracing::debug;

/// A directed edge between two numbered endpoints
pub trait DirectedEdge {
    fn record_id(&self) -> i64;
    fn from_id(&self) -> i64;
    fn to_id(&self) -> i64;

    /// Order-independent key for the endpoint pair
    fn undirected_key(&self) -> (i64, i64) {
        let (a, b) = (self.from_id(), self.to_id());
        (a.min(b), a.max(b))
    }
}

/// Result of a dedup pass
#[derive(Debug, Clone, PartialEq)]
pub struct Deduplicated<T> {
    pub kept: Vec<T>,
    pub removed_ids: Vec<i64>,
}

/// Keep the first record per undirected endpoint pair, in input order.
///
/// Input is expected in ascending record id order, so of two mutual edges the
/// one with the smaller id is retained regardless of direction. A
/// self-relation (from == to) collides with any other self-relation of the
/// same character.
pub fn partition_symmetric<T: DirectedEdge>(records: Vec<T>) -> Deduplicated<T> {
    let mut seen: HashSet<(i64, i64)> = HashSet::with_capacity(records.len());
    let mut kept = Vec::with_capacity(records.len());
    let mut removed_ids = Vec::new();

    for record in records {
        if seen.insert(record.undirected_key()) {
            kept.push(record);
        } else {
            removed_ids.push(record.record_id());
        }
    }

    Deduplicated { kept, removed_ids }
}

/// Cleaned relationship list for display
pub fn dedup_symmetric<T: DirectedEdge>(records: Vec<T>) -> Vec<T> {
    let Deduplicated { kept, removed_ids } = partition_symmetric(records);
    if !removed_ids.is_empty() {
        debug!(
            removed = removed_ids.len(),
            ?removed_ids,
            "dropped symmetric duplicate relationships"
        );
    }
    kept
}
