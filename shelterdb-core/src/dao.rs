//! The CRUD wrapper over a single collection.
//!
//! [`DataAccessObject`] binds one connection handle to one [`Namespace`] and forwards each
//! operation to the [`StoreBackend`]. Failures never reach the caller: every operation logs
//! the error through `tracing` and returns a conservative value (`false`, `0` or an empty
//! list) instead. A handle whose liveness check failed at construction stays disabled for its
//! whole lifetime, and every operation on it returns the conservative value without touching
//! the driver.
//!
//! # Example
//!
//! ```ignore
//! use shelterdb::{prelude::*, memory::InMemoryStore};
//! use bson::doc;
//!
//! let animals = DataAccessObject::connect(
//!     InMemoryStore::builder(),
//!     Namespace::new("AAC", "animals"),
//! )
//! .await;
//!
//! assert!(animals.create(doc! { "name": "Rex", "species": "dog" }).await);
//! assert_eq!(animals.update(doc! { "species": "dog" }, doc! { "adopted": true }).await, 1);
//! assert!(animals.delete_one(doc! { "name": "Rex" }).await);
//! ```

use tracing::{error, info, warn};

use crate::{
    backend::{StoreBackend, StoreBackendBuilder},
    error::{StoreError, StoreResult},
    record::{Namespace, Query, Record},
};

/// The state of a connection handle. Fixed at construction.
#[derive(Debug)]
pub(crate) enum ConnectionState<B> {
    /// The store answered the liveness check.
    Connected(B),
    /// Connecting failed; operations short-circuit.
    Disabled,
}

/// A defensive CRUD surface over one document-store collection.
#[derive(Debug)]
pub struct DataAccessObject<B: StoreBackend> {
    state: ConnectionState<B>,
    namespace: Namespace,
}

impl<B: StoreBackend> DataAccessObject<B> {
    /// Builds a backend and checks that the store is alive.
    ///
    /// Never fails: if the backend cannot be built or does not answer the liveness check, the
    /// failure is logged and the returned handle is disabled.
    pub async fn connect<T>(builder: T, namespace: Namespace) -> Self
    where
        T: StoreBackendBuilder<Backend = B>,
    {
        match builder.build().await {
            Ok(backend) => Self::with_backend(backend, namespace).await,
            Err(err) => {
                error!(%namespace, error = %err, "store connection failed");
                Self::disabled(namespace)
            }
        }
    }

    /// Wraps an already built backend, checking that the store is alive.
    pub async fn with_backend(backend: B, namespace: Namespace) -> Self {
        match backend.ping().await {
            Ok(()) => {
                info!(%namespace, "store connection successful");
                Self {
                    state: ConnectionState::Connected(backend),
                    namespace,
                }
            }
            Err(err) => {
                error!(%namespace, error = %err, "store connection failed");
                Self::disabled(namespace)
            }
        }
    }

    /// Creates a handle that is disabled from the start.
    pub fn disabled(namespace: Namespace) -> Self {
        Self {
            state: ConnectionState::Disabled,
            namespace,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected(_))
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Inserts one record. Returns `true` if the store acknowledged the insert.
    pub async fn create(&self, record: Record) -> bool {
        let result = self.try_create(record).await;
        self.settle("create", result, false)
    }

    /// Inserts a batch of records. Returns how many were inserted.
    ///
    /// Any failure, including one partway through the batch, yields `0`.
    pub async fn create_many(&self, records: Vec<Record>) -> u64 {
        let result = self.try_create_many(records).await;
        self.settle("create_many", result, 0)
    }

    /// Returns every record matching the query.
    pub async fn read(&self, query: Query) -> Vec<Record> {
        let result = self.try_read(query).await;
        self.settle("read", result, Vec::new())
    }

    /// Sets `fields` on every record matching the query. Returns how many records changed.
    pub async fn update(&self, query: Query, fields: Record) -> u64 {
        let result = self.try_update(query, fields).await;
        self.settle("update", result, 0)
    }

    /// Sets `fields` on the first record matching the query. Returns `true` if it changed.
    pub async fn update_one(&self, query: Query, fields: Record) -> bool {
        let result = self.try_update_one(query, fields).await;
        self.settle("update_one", result, false)
    }

    /// Removes every record matching the query. Returns how many were removed.
    pub async fn delete(&self, query: Query) -> u64 {
        let result = self.try_delete(query).await;
        self.settle("delete", result, 0)
    }

    /// Removes the first record matching the query. Returns `true` if one was removed.
    pub async fn delete_one(&self, query: Query) -> bool {
        let result = self.try_delete_one(query).await;
        self.settle("delete_one", result, false)
    }

    /// Releases the driver. A disabled handle has nothing to release.
    pub async fn shutdown(self) -> StoreResult<()> {
        match self.state {
            ConnectionState::Connected(backend) => backend.shutdown().await,
            ConnectionState::Disabled => Ok(()),
        }
    }

    fn backend(&self) -> StoreResult<&B> {
        match &self.state {
            ConnectionState::Connected(backend) => Ok(backend),
            ConnectionState::Disabled => Err(StoreError::Disabled),
        }
    }

    async fn try_create(&self, record: Record) -> StoreResult<bool> {
        Ok(self
            .backend()?
            .insert_one(&self.namespace, record)
            .await?
            .acknowledged)
    }

    async fn try_create_many(&self, records: Vec<Record>) -> StoreResult<u64> {
        Ok(self
            .backend()?
            .insert_many(&self.namespace, records)
            .await?
            .inserted_count())
    }

    async fn try_read(&self, query: Query) -> StoreResult<Vec<Record>> {
        self.backend()?
            .find(&self.namespace, query)
            .await
    }

    async fn try_update(&self, query: Query, fields: Record) -> StoreResult<u64> {
        Ok(self
            .backend()?
            .update_many(&self.namespace, query, fields)
            .await?
            .modified_count)
    }

    async fn try_update_one(&self, query: Query, fields: Record) -> StoreResult<bool> {
        Ok(self
            .backend()?
            .update_one(&self.namespace, query, fields)
            .await?
            .modified_count
            > 0)
    }

    async fn try_delete(&self, query: Query) -> StoreResult<u64> {
        Ok(self
            .backend()?
            .delete_many(&self.namespace, query)
            .await?
            .deleted_count)
    }

    async fn try_delete_one(&self, query: Query) -> StoreResult<bool> {
        Ok(self
            .backend()?
            .delete_one(&self.namespace, query)
            .await?
            .deleted_count
            > 0)
    }

    /// Logs a failed operation and substitutes the fallback value.
    fn settle<T>(&self, operation: &'static str, result: StoreResult<T>, fallback: T) -> T {
        match result {
            Ok(value) => value,
            Err(StoreError::Disabled) => {
                warn!(operation, namespace = %self.namespace, "no store connection, operation skipped");
                fallback
            }
            Err(err) => {
                error!(operation, namespace = %self.namespace, error = %err, "store operation failed");
                fallback
            }
        }
    }
}
