//! Store driver abstraction.
//!
//! This module defines the seam between the [`DataAccessObject`](crate::dao::DataAccessObject)
//! and whatever driver actually talks to the document store (an in-process store, a MongoDB
//! client, etc.).
//!
//! # Overview
//!
//! The [`StoreBackend`] trait provides a unified async interface over the handful of driver
//! primitives the wrapper forwards to: a liveness check, inserts, a find, `$set` updates and
//! deletes. Every operation is addressed to a [`Namespace`] and receives queries in the store's
//! native syntax, which the backend interprets.
//!
//! # Traits
//!
//! - [`StoreBackend`]: The core trait for store drivers
//! - [`StoreBackendBuilder`]: Factory trait for creating backend instances
//!
//! # Examples
//!
//! ```ignore
//! use shelterdb::backend::StoreBackend;
//! use shelterdb::record::Namespace;
//! use bson::doc;
//!
//! let backend = MyBackendImpl::new();
//! let animals = Namespace::new("AAC", "animals");
//!
//! backend.insert_one(&animals, doc! { "name": "Rex", "species": "dog" }).await?;
//! let dogs = backend.find(&animals, doc! { "species": "dog" }).await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::StoreResult,
    outcome::{DeleteOutcome, InsertManyOutcome, InsertOneOutcome, UpdateOutcome},
    record::{Namespace, Query, Record},
};

/// Abstract interface for document store drivers.
///
/// # Thread Safety
///
/// All implementations must be thread-safe so a host application may share one
/// wrapper between request handlers.
///
/// # Update Semantics
///
/// [`update_many`](StoreBackend::update_many) and [`update_one`](StoreBackend::update_one)
/// receive a field mapping and apply "set" semantics: each named field (dotted paths address
/// nested fields) is overwritten, all other fields are left untouched.
///
/// # Error Handling
///
/// Operations return [`StoreResult<T>`](crate::error::StoreResult). Backends report driver
/// failures as [`StoreError::Backend`](crate::error::StoreError::Backend) unless a more
/// specific variant applies.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Issues a liveness check against the store.
    ///
    /// Returns [`StoreError::Connection`](crate::error::StoreError::Connection) when the store
    /// cannot be reached or rejects the credentials.
    async fn ping(&self) -> StoreResult<()>;

    /// Inserts a single record.
    ///
    /// A record without an `_id` field is assigned one by the store.
    async fn insert_one(
        &self,
        namespace: &Namespace,
        record: Record,
    ) -> StoreResult<InsertOneOutcome>;

    /// Inserts a batch of records in order.
    ///
    /// Inserting stops at the first failing record; records before it remain inserted. An
    /// empty batch is an error.
    async fn insert_many(
        &self,
        namespace: &Namespace,
        records: Vec<Record>,
    ) -> StoreResult<InsertManyOutcome>;

    /// Returns every record matching the query.
    async fn find(&self, namespace: &Namespace, query: Query) -> StoreResult<Vec<Record>>;

    /// Sets the given fields on every record matching the query.
    async fn update_many(
        &self,
        namespace: &Namespace,
        query: Query,
        fields: Record,
    ) -> StoreResult<UpdateOutcome>;

    /// Sets the given fields on the first record matching the query.
    async fn update_one(
        &self,
        namespace: &Namespace,
        query: Query,
        fields: Record,
    ) -> StoreResult<UpdateOutcome>;

    /// Removes every record matching the query.
    async fn delete_many(&self, namespace: &Namespace, query: Query) -> StoreResult<DeleteOutcome>;

    /// Removes the first record matching the query.
    async fn delete_one(&self, namespace: &Namespace, query: Query) -> StoreResult<DeleteOutcome>;

    /// Cleanly shuts down the backend, releasing all resources.
    ///
    /// The default implementation is a no-op, but backends holding network connections
    /// should override this.
    async fn shutdown(self) -> StoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<B> StoreBackend for &B
where
    B: StoreBackend,
{
    async fn ping(&self) -> StoreResult<()> {
        (*self).ping().await
    }

    async fn insert_one(
        &self,
        namespace: &Namespace,
        record: Record,
    ) -> StoreResult<InsertOneOutcome> {
        (*self)
            .insert_one(namespace, record)
            .await
    }

    async fn insert_many(
        &self,
        namespace: &Namespace,
        records: Vec<Record>,
    ) -> StoreResult<InsertManyOutcome> {
        (*self)
            .insert_many(namespace, records)
            .await
    }

    async fn find(&self, namespace: &Namespace, query: Query) -> StoreResult<Vec<Record>> {
        (*self)
            .find(namespace, query)
            .await
    }

    async fn update_many(
        &self,
        namespace: &Namespace,
        query: Query,
        fields: Record,
    ) -> StoreResult<UpdateOutcome> {
        (*self)
            .update_many(namespace, query, fields)
            .await
    }

    async fn update_one(
        &self,
        namespace: &Namespace,
        query: Query,
        fields: Record,
    ) -> StoreResult<UpdateOutcome> {
        (*self)
            .update_one(namespace, query, fields)
            .await
    }

    async fn delete_many(&self, namespace: &Namespace, query: Query) -> StoreResult<DeleteOutcome> {
        (*self)
            .delete_many(namespace, query)
            .await
    }

    async fn delete_one(&self, namespace: &Namespace, query: Query) -> StoreResult<DeleteOutcome> {
        (*self)
            .delete_one(namespace, query)
            .await
    }
}

#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> StoreResult<Self::Backend>;
}
