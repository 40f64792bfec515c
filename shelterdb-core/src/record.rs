//! Schema-less records, native queries, and the namespace they live in.
//!
//! A [`Record`] is an ordered BSON document with arbitrary fields. A [`Query`]
//! is a BSON document in the store's native filter syntax, for example
//! `doc! { "species": "dog", "age": { "$gte": 2 } }`. Neither is inspected by
//! the wrapper; backends interpret them.

use std::fmt;

use bson::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreResult;

/// A single schema-less document stored in a collection.
pub type Record = Document;

/// A filter expression selecting zero or more records.
///
/// An empty query matches every record.
pub type Query = Document;

/// A `(database, collection)` pair that a connection handle is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace {
    pub database: String,
    pub collection: String,
}

impl Namespace {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// Converts records into JSON rows, e.g. for a dashboard data table.
///
/// BSON-only types such as `ObjectId` use their extended JSON form (`{"$oid": ...}`).
pub fn records_to_json(records: &[Record]) -> StoreResult<Vec<Value>> {
    Ok(records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?)
}

/// Parses a JSON object into a record.
pub fn record_from_json(value: Value) -> StoreResult<Record> {
    Ok(serde_json::from_value(value)?)
}
