//! In-memory storage implementation.
//!
//! Records are kept per namespace in insertion order behind an async-aware read-write lock.
//! Queries are interpreted by [`QueryEvaluator`]; updates apply "set" semantics.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use bson::{Bson, Document, oid::ObjectId};
use mea::rwlock::RwLock;
use tracing::debug;

use shelterdb_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    error::{StoreError, StoreResult},
    outcome::{DeleteOutcome, InsertManyOutcome, InsertOneOutcome, UpdateOutcome},
    record::{Namespace, Query, Record},
};

use crate::evaluator::QueryEvaluator;

type StoreMap = HashMap<Namespace, Vec<Record>>;

/// Thread-safe in-memory document store.
///
/// `InMemoryStore` is cloneable and all clones share the same records, so a test can hand one
/// clone to a [`DataAccessObject`](shelterdb_core::dao::DataAccessObject) and inspect the data
/// through another.
///
/// # Reachability
///
/// A store can be marked unreachable (see [`InMemoryStoreBuilder::unreachable`] and
/// [`InMemoryStore::set_reachable`]). While unreachable, every [`StoreBackend`] call fails with
/// [`StoreError::Connection`], the way a driver does when the server goes away.
///
/// # Example
///
/// ```ignore
/// use shelterdb_memory::InMemoryStore;
/// use shelterdb_core::{backend::StoreBackend, record::Namespace};
/// use bson::doc;
///
/// let store = InMemoryStore::new();
/// let animals = Namespace::new("AAC", "animals");
///
/// store.insert_one(&animals, doc! { "name": "Rex" }).await?;
/// assert_eq!(store.find(&animals, doc! {}).await?.len(), 1);
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// namespace -> records, in insertion order
    store: Arc<RwLock<StoreMap>>,
    unreachable: Arc<AtomicBool>,
}

impl InMemoryStore {
    /// Creates a new empty, reachable store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Simulates the server coming back (`true`) or going away (`false`).
    pub fn set_reachable(&self, reachable: bool) {
        self.unreachable.store(!reachable, Ordering::SeqCst);
    }

    pub fn is_reachable(&self) -> bool {
        !self.unreachable.load(Ordering::SeqCst)
    }

    /// Returns a copy of every record in the namespace, regardless of reachability.
    pub async fn records(&self, namespace: &Namespace) -> Vec<Record> {
        self.store
            .read()
            .await
            .get(namespace)
            .cloned()
            .unwrap_or_default()
    }

    fn ensure_reachable(&self) -> StoreResult<()> {
        if self.is_reachable() {
            Ok(())
        } else {
            Err(StoreError::Connection("in-memory store is unreachable".into()))
        }
    }

    /// Adds an `_id` when missing and rejects duplicates.
    fn prepare_record(existing: &[Record], mut record: Record, namespace: &Namespace) -> StoreResult<(Bson, Record)> {
        if let Some(id) = record.get("_id").cloned() {
            if existing.iter().any(|other| other.get("_id") == Some(&id)) {
                return Err(StoreError::DuplicateKey(id.to_string(), namespace.collection.clone()));
            }
            return Ok((id, record));
        }

        let id = Bson::ObjectId(ObjectId::new());
        let mut with_id = Document::new();
        with_id.insert("_id", id.clone());
        for (key, value) in std::mem::take(&mut record) {
            with_id.insert(key, value);
        }

        Ok((id, with_id))
    }

    /// Positions of the records matching a query, at most `limit` of them.
    fn matching_positions(records: &[Record], query: &Query, limit: Option<usize>) -> StoreResult<Vec<usize>> {
        QueryEvaluator::validate(query)?;

        Ok(records
            .iter()
            .enumerate()
            .filter(|(_, record)| QueryEvaluator::new(record).matches(query))
            .map(|(position, _)| position)
            .take(limit.unwrap_or(usize::MAX))
            .collect())
    }

    async fn update(&self, namespace: &Namespace, query: Query, fields: Record, limit: Option<usize>) -> StoreResult<UpdateOutcome> {
        self.ensure_reachable()?;
        validate_fields(&fields)?;

        let mut store = self.store.write().await;
        let Some(records) = store.get_mut(namespace) else {
            QueryEvaluator::validate(&query)?;
            return Ok(UpdateOutcome::default());
        };

        let positions = Self::matching_positions(records, &query, limit)?;

        // every matched record is updated on a copy first; nothing is written unless all succeed
        let mut staged = Vec::with_capacity(positions.len());
        for &position in &positions {
            let mut updated = records[position].clone();
            if apply_set(&mut updated, &fields)? {
                staged.push((position, updated));
            }
        }

        let outcome = UpdateOutcome {
            matched_count: positions.len() as u64,
            modified_count: staged.len() as u64,
        };

        for (position, updated) in staged {
            records[position] = updated;
        }

        debug!(%namespace, matched = outcome.matched_count, modified = outcome.modified_count, "updated records");

        Ok(outcome)
    }

    async fn delete(&self, namespace: &Namespace, query: Query, limit: Option<usize>) -> StoreResult<DeleteOutcome> {
        self.ensure_reachable()?;

        let mut store = self.store.write().await;
        let Some(records) = store.get_mut(namespace) else {
            QueryEvaluator::validate(&query)?;
            return Ok(DeleteOutcome::default());
        };

        let positions = Self::matching_positions(records, &query, limit)?;
        for position in positions.iter().rev() {
            records.remove(*position);
        }

        debug!(%namespace, deleted = positions.len(), "deleted records");

        Ok(DeleteOutcome {
            deleted_count: positions.len() as u64,
        })
    }
}

/// Field names must be plain or dotted paths; operators are not allowed, and no path may
/// contain another.
fn validate_fields(fields: &Record) -> StoreResult<()> {
    if fields.is_empty() {
        return Err(StoreError::InvalidDocument("update needs at least one field".into()));
    }

    if let Some(key) = fields
        .keys()
        .find(|key| key.is_empty() || key.starts_with('$') || key.split('.').any(str::is_empty))
    {
        return Err(StoreError::InvalidDocument(format!("invalid field name in update: {key:?}")));
    }

    for (position, key) in fields.keys().enumerate() {
        if let Some(other) = fields
            .keys()
            .skip(position + 1)
            .find(|other| path_contains(key, other) || path_contains(other, key))
        {
            return Err(StoreError::InvalidDocument(format!(
                "updating {key:?} would conflict with {other:?}"
            )));
        }
    }

    Ok(())
}

/// Whether `inner` is `outer` itself or a field below it.
fn path_contains(outer: &str, inner: &str) -> bool {
    inner
        .strip_prefix(outer)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

/// Sets each field on the record. Returns whether the record changed.
fn apply_set(record: &mut Record, fields: &Record) -> StoreResult<bool> {
    let mut changed = false;

    for (path, value) in fields {
        if path == "_id" {
            if record.get("_id") != Some(value) {
                return Err(StoreError::InvalidDocument("the _id field is immutable".into()));
            }
            continue;
        }

        let mut segments: Vec<&str> = path.split('.').collect();
        let Some(leaf) = segments.pop() else {
            continue;
        };

        let mut target = &mut *record;
        for segment in segments {
            if !target.contains_key(segment) {
                target.insert(segment, Document::new());
            }
            target = match target.get_mut(segment) {
                Some(Bson::Document(inner)) => inner,
                _ => {
                    return Err(StoreError::InvalidDocument(format!(
                        "cannot create field {leaf:?} inside non-document {segment:?}"
                    )));
                }
            };
        }

        if target.get(leaf) != Some(value) {
            target.insert(leaf, value.clone());
            changed = true;
        }
    }

    Ok(changed)
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.ensure_reachable()
    }

    async fn insert_one(&self, namespace: &Namespace, record: Record) -> StoreResult<InsertOneOutcome> {
        self.ensure_reachable()?;

        let mut store = self.store.write().await;
        let records = store
            .entry(namespace.clone())
            .or_default();

        let (id, record) = Self::prepare_record(records, record, namespace)?;
        records.push(record);

        debug!(%namespace, %id, "inserted record");

        Ok(InsertOneOutcome {
            acknowledged: true,
            inserted_id: Some(id),
        })
    }

    async fn insert_many(&self, namespace: &Namespace, records: Vec<Record>) -> StoreResult<InsertManyOutcome> {
        self.ensure_reachable()?;

        if records.is_empty() {
            return Err(StoreError::InvalidDocument("no records to insert".into()));
        }

        let mut store = self.store.write().await;
        let existing = store
            .entry(namespace.clone())
            .or_default();

        let mut outcome = InsertManyOutcome::default();
        for record in records {
            let (id, record) = Self::prepare_record(existing, record, namespace)?;
            existing.push(record);
            outcome.inserted_ids.push(id);
        }

        debug!(%namespace, inserted = outcome.inserted_ids.len(), "inserted records");

        Ok(outcome)
    }

    async fn find(&self, namespace: &Namespace, query: Query) -> StoreResult<Vec<Record>> {
        self.ensure_reachable()?;

        let store = self.store.read().await;
        let Some(records) = store.get(namespace) else {
            QueryEvaluator::validate(&query)?;
            return Ok(vec![]);
        };

        Ok(Self::matching_positions(records, &query, None)?
            .into_iter()
            .map(|position| records[position].clone())
            .collect())
    }

    async fn update_many(&self, namespace: &Namespace, query: Query, fields: Record) -> StoreResult<UpdateOutcome> {
        self.update(namespace, query, fields, None).await
    }

    async fn update_one(&self, namespace: &Namespace, query: Query, fields: Record) -> StoreResult<UpdateOutcome> {
        self.update(namespace, query, fields, Some(1)).await
    }

    async fn delete_many(&self, namespace: &Namespace, query: Query) -> StoreResult<DeleteOutcome> {
        self.delete(namespace, query, None).await
    }

    async fn delete_one(&self, namespace: &Namespace, query: Query) -> StoreResult<DeleteOutcome> {
        self.delete(namespace, query, Some(1)).await
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
///
/// ```ignore
/// use shelterdb_memory::InMemoryStore;
/// use shelterdb_core::backend::StoreBackendBuilder;
///
/// let store = InMemoryStore::builder().build().await.unwrap();
/// let down = InMemoryStore::builder().unreachable().build().await.unwrap();
/// ```
#[derive(Default)]
pub struct InMemoryStoreBuilder {
    unreachable: bool,
    seed: Vec<(Namespace, Vec<Record>)>,
}

impl InMemoryStoreBuilder {
    /// Builds a store that fails every call, including the liveness check.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Pre-loads records into a namespace. Records without an `_id` are assigned one.
    pub fn seed(mut self, namespace: Namespace, records: Vec<Record>) -> Self {
        self.seed.push((namespace, records));
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> StoreResult<Self::Backend> {
        let store = InMemoryStore::new();

        {
            let mut map = store.store.write().await;
            for (namespace, records) in self.seed {
                let existing = map
                    .entry(namespace.clone())
                    .or_default();
                for record in records {
                    let (_, record) = InMemoryStore::prepare_record(existing, record, &namespace)?;
                    existing.push(record);
                }
            }
        }

        store.set_reachable(!self.unreachable);

        Ok(store)
    }
}
