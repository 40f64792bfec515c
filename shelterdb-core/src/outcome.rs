//! Results reported by a backend for write operations.
//!
//! These mirror what a document store driver reports back for each write. The
//! [`DataAccessObject`](crate::dao::DataAccessObject) collapses them into the
//! booleans and counts its callers see.

use bson::Bson;

/// Result of inserting a single record.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertOneOutcome {
    /// Whether the store acknowledged the write.
    pub acknowledged: bool,
    /// The `_id` of the inserted record, when known.
    pub inserted_id: Option<Bson>,
}

/// Result of inserting a batch of records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InsertManyOutcome {
    /// The `_id` of every record that was inserted, in batch order.
    pub inserted_ids: Vec<Bson>,
}

impl InsertManyOutcome {
    pub fn inserted_count(&self) -> u64 {
        self.inserted_ids.len() as u64
    }
}

/// Result of an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    /// Number of records the query matched.
    pub matched_count: u64,
    /// Number of records whose content actually changed.
    pub modified_count: u64,
}

/// Result of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteOutcome {
    /// Number of records removed.
    pub deleted_count: u64,
}
