//! Native query evaluation for in-memory filtering.
//!
//! Queries arrive in the store's native document syntax. Supported:
//!
//! - implicit equality, `{ "species": "dog" }`, which also matches arrays containing the value
//! - dotted paths into nested documents and array positions, `{ "location.city": "Austin" }`
//! - field operators `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`, `$in`, `$nin`, `$exists`, `$not`
//! - top-level `$and`, `$or`, `$nor`
//!
//! [`QueryEvaluator::validate`] rejects anything else up front, so evaluation itself is
//! infallible.

use std::cmp::Ordering;

use bson::{Bson, Document, datetime::DateTime, oid::ObjectId};

use shelterdb_core::error::{StoreError, StoreResult};

const FIELD_OPERATORS: [&str; 10] = [
    "$eq", "$ne", "$gt", "$gte", "$lt", "$lte", "$in", "$nin", "$exists", "$not",
];

/// Type-erased, comparable representation of BSON values.
///
/// Integers and floats are normalized to f64, so `1` and `1.0` compare equal. Embedded
/// documents keep their field order. Any other BSON type compares by exact value.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    DateTime(DateTime),
    String(&'a str),
    ObjectId(ObjectId),
    Array(Vec<Comparable<'a>>),
    Map(Vec<(&'a str, Comparable<'a>)>),
    Other(&'a Bson),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::ObjectId(value) => Comparable::ObjectId(*value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<Vec<_>>()
            ),
            other => Comparable::Other(other),
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            (Comparable::Other(a), Comparable::Other(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Resolves a dotted path against a record.
pub(crate) fn lookup<'a>(record: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = record.get(segments.next()?)?;

    for segment in segments {
        current = match current {
            Bson::Document(doc) => doc.get(segment)?,
            Bson::Array(arr) => arr.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

fn is_operator_document(doc: &Document) -> bool {
    doc.keys()
        .next()
        .is_some_and(|key| key.starts_with('$'))
}

pub(crate) struct QueryEvaluator<'a> {
    record: &'a Document,
}

impl<'a> QueryEvaluator<'a> {
    pub fn new(record: &'a Document) -> Self {
        Self { record }
    }

    /// Checks that every operator in the query is supported and well formed.
    pub fn validate(query: &Document) -> StoreResult<()> {
        for (key, condition) in query {
            match key.as_str() {
                "$and" | "$or" | "$nor" => {
                    for clause in Self::clauses(key, condition)? {
                        Self::validate(clause)?;
                    }
                }
                op if op.starts_with('$') => {
                    return Err(StoreError::InvalidQuery(format!("unknown top level operator: {op}")));
                }
                _ => {
                    if let Bson::Document(ops) = condition {
                        if is_operator_document(ops) {
                            Self::validate_operators(ops)?;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn validate_operators(ops: &Document) -> StoreResult<()> {
        for (op, argument) in ops {
            if !FIELD_OPERATORS.contains(&op.as_str()) {
                return Err(StoreError::InvalidQuery(format!("unknown operator: {op}")));
            }

            match (op.as_str(), argument) {
                ("$in" | "$nin", Bson::Array(_)) => {}
                ("$in" | "$nin", _) => {
                    return Err(StoreError::InvalidQuery(format!("{op} needs an array")));
                }
                ("$not", Bson::Document(inner)) if is_operator_document(inner) => {
                    Self::validate_operators(inner)?;
                }
                ("$not", _) => {
                    return Err(StoreError::InvalidQuery("$not needs an operator document".into()));
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn clauses<'q>(op: &str, condition: &'q Bson) -> StoreResult<Vec<&'q Document>> {
        let clauses = match condition {
            Bson::Array(items) if !items.is_empty() => items,
            _ => return Err(StoreError::InvalidQuery(format!("{op} needs a non-empty array"))),
        };

        clauses
            .iter()
            .map(|clause| {
                clause
                    .as_document()
                    .ok_or_else(|| StoreError::InvalidQuery(format!("{op} entries must be documents")))
            })
            .collect()
    }

    /// Returns whether the record satisfies every condition of a validated query.
    pub fn matches(&self, query: &Document) -> bool {
        query.iter().all(|(key, condition)| match key.as_str() {
            "$and" => self
                .sub_queries(condition)
                .all(|clause| self.matches(clause)),
            "$or" => self
                .sub_queries(condition)
                .any(|clause| self.matches(clause)),
            "$nor" => !self
                .sub_queries(condition)
                .any(|clause| self.matches(clause)),
            field => self.matches_condition(field, condition),
        })
    }

    fn sub_queries<'q>(&self, condition: &'q Bson) -> impl Iterator<Item = &'q Document> {
        condition
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(Bson::as_document)
    }

    fn matches_condition(&self, field: &str, condition: &Bson) -> bool {
        let value = lookup(self.record, field);

        match condition {
            Bson::Document(ops) if is_operator_document(ops) => ops
                .iter()
                .all(|(op, argument)| Self::apply_operator(value, op, argument)),
            _ => Self::equals(value, condition),
        }
    }

    fn apply_operator(value: Option<&Bson>, op: &str, argument: &Bson) -> bool {
        match op {
            "$eq" => Self::equals(value, argument),
            "$ne" => !Self::equals(value, argument),
            "$gt" => Self::compare(value, argument, |ordering| ordering == Ordering::Greater),
            "$gte" => Self::compare(value, argument, |ordering| ordering != Ordering::Less),
            "$lt" => Self::compare(value, argument, |ordering| ordering == Ordering::Less),
            "$lte" => Self::compare(value, argument, |ordering| ordering != Ordering::Greater),
            "$in" => argument
                .as_array()
                .is_some_and(|candidates| candidates
                    .iter()
                    .any(|candidate| Self::equals(value, candidate))
                ),
            "$nin" => !argument
                .as_array()
                .is_some_and(|candidates| candidates
                    .iter()
                    .any(|candidate| Self::equals(value, candidate))
                ),
            "$exists" => value.is_some() == Self::truthy(argument),
            "$not" => !argument
                .as_document()
                .is_some_and(|ops| ops
                    .iter()
                    .all(|(op, argument)| Self::apply_operator(value, op, argument))
                ),
            _ => false,
        }
    }

    /// Equality with the store's array semantics: an array field matches a scalar it contains.
    /// A missing field equals `null`.
    fn equals(value: Option<&Bson>, target: &Bson) -> bool {
        let Some(value) = value else {
            return matches!(target, Bson::Null);
        };

        let target = Comparable::from(target);

        match value {
            Bson::Array(items) if !matches!(target, Comparable::Array(_)) => items
                .iter()
                .any(|item| Comparable::from(item) == target),
            _ => Comparable::from(value) == target,
        }
    }

    /// Ordered comparison; values of different types never match.
    fn compare(value: Option<&Bson>, target: &Bson, accept: impl Fn(Ordering) -> bool) -> bool {
        let target = Comparable::from(target);
        let check = |candidate: &Bson| {
            Comparable::from(candidate)
                .partial_cmp(&target)
                .is_some_and(&accept)
        };

        match value {
            Some(Bson::Array(items)) => items.iter().any(check),
            Some(other) => check(other),
            None => false,
        }
    }

    fn truthy(argument: &Bson) -> bool {
        match argument {
            Bson::Boolean(flag) => *flag,
            Bson::Int32(n) => *n != 0,
            Bson::Int64(n) => *n != 0,
            Bson::Double(n) => *n != 0.0,
            Bson::Null => false,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{Decimal128, doc};

    fn rex() -> Document {
        doc! {
            "name": "Rex",
            "species": "dog",
            "age_weeks": 52,
            "weight": 31.5,
            "tags": ["friendly", "vaccinated"],
            "location": { "city": "Austin", "zip": "78701" },
            "adopted": false,
        }
    }

    fn matches(query: Document) -> bool {
        QueryEvaluator::validate(&query).unwrap();
        QueryEvaluator::new(&rex()).matches(&query)
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(matches(doc! {}));
    }

    #[test]
    fn implicit_equality() {
        assert!(matches(doc! { "species": "dog", "adopted": false }));
        assert!(!matches(doc! { "species": "cat" }));
    }

    #[test]
    fn numbers_compare_across_types() {
        assert!(matches(doc! { "age_weeks": 52.0 }));
        assert!(matches(doc! { "age_weeks": 52_i64 }));
    }

    #[test]
    fn array_field_matches_contained_scalar() {
        assert!(matches(doc! { "tags": "friendly" }));
        assert!(matches(doc! { "tags": ["friendly", "vaccinated"] }));
        assert!(!matches(doc! { "tags": ["vaccinated", "friendly"] }));
    }

    #[test]
    fn dotted_paths_reach_nested_fields() {
        assert!(matches(doc! { "location.city": "Austin" }));
        assert!(matches(doc! { "tags.1": "vaccinated" }));
        assert!(!matches(doc! { "location.city.name": "Austin" }));
    }

    #[test]
    fn missing_field_equals_null() {
        assert!(matches(doc! { "outcome_type": null }));
        assert!(matches(doc! { "outcome_type": { "$ne": "Adoption" } }));
        assert!(!matches(doc! { "outcome_type": "Adoption" }));
    }

    #[test]
    fn range_operators() {
        assert!(matches(doc! { "age_weeks": { "$gte": 52, "$lt": 104 } }));
        assert!(!matches(doc! { "age_weeks": { "$gt": 52 } }));
        assert!(matches(doc! { "weight": { "$lte": 31.5 } }));
        assert!(!matches(doc! { "name": { "$gt": 5 } }));
    }

    #[test]
    fn membership_operators() {
        assert!(matches(doc! { "species": { "$in": ["cat", "dog"] } }));
        assert!(!matches(doc! { "species": { "$nin": ["cat", "dog"] } }));
        assert!(matches(doc! { "tags": { "$in": ["senior", "friendly"] } }));
    }

    #[test]
    fn exists_and_not() {
        assert!(matches(doc! { "location": { "$exists": true } }));
        assert!(matches(doc! { "microchip": { "$exists": false } }));
        assert!(matches(doc! { "age_weeks": { "$not": { "$gt": 100 } } }));
        assert!(!matches(doc! { "age_weeks": { "$not": { "$lt": 100 } } }));
    }

    #[test]
    fn logical_operators() {
        assert!(matches(doc! { "$or": [{ "species": "cat" }, { "name": "Rex" }] }));
        assert!(!matches(doc! { "$and": [{ "species": "dog" }, { "adopted": true }] }));
        assert!(matches(doc! { "$nor": [{ "species": "cat" }, { "species": "bird" }] }));
    }

    #[test]
    fn unknown_operators_are_rejected() {
        assert!(QueryEvaluator::validate(&doc! { "name": { "$regex": "^R" } }).is_err());
        assert!(QueryEvaluator::validate(&doc! { "$where": "this.age > 1" }).is_err());
        assert!(QueryEvaluator::validate(&doc! { "species": { "$in": "dog" } }).is_err());
        assert!(QueryEvaluator::validate(&doc! { "$or": [] }).is_err());
        assert!(QueryEvaluator::validate(&doc! { "$and": [{ "age": { "$foo": 1 } }] }).is_err());
    }

    #[test]
    fn embedded_documents_match_in_field_order() {
        assert!(matches(doc! { "location": { "city": "Austin", "zip": "78701" } }));
        assert!(!matches(doc! { "location": { "zip": "78701", "city": "Austin" } }));
        assert!(!matches(doc! { "location": { "city": "Austin" } }));
    }

    #[test]
    fn other_bson_types_compare_by_value() {
        let chip = |byte: u8| {
            let mut bytes = [0_u8; 16];
            bytes[0] = byte;
            Bson::Decimal128(Decimal128::from_bytes(bytes))
        };
        let records = [doc! { "chip": chip(1) }, doc! { "chip": chip(2) }];
        let count = |query: Document| {
            records
                .iter()
                .filter(|record| QueryEvaluator::new(record).matches(&query))
                .count()
        };

        assert_eq!(count(doc! { "chip": null }), 0);
        assert_eq!(count(doc! { "chip": chip(1) }), 1);
        assert_eq!(count(doc! { "chip": { "$ne": chip(1) } }), 1);
        assert_eq!(count(doc! { "chip": { "$gt": chip(0) } }), 0);
    }

    #[test]
    fn lookup_walks_documents_and_arrays() {
        let record = rex();

        assert_eq!(lookup(&record, "location.zip"), Some(&Bson::String("78701".into())));
        assert_eq!(lookup(&record, "tags.0"), Some(&Bson::String("friendly".into())));
        assert_eq!(lookup(&record, "tags.9"), None);
        assert_eq!(lookup(&record, "missing.path"), None);
    }
}
