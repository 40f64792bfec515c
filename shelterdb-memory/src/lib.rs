//! In-memory document storage backend for shelterdb.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! It interprets native query documents itself, which makes it a drop-in stand-in for a
//! real server in tests and in dashboards that do not need persistence.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Native queries** - Equality, comparison, membership and logical operators, dotted paths
//! - **Set updates** - Only the named fields change; unchanged values are not counted as modified
//! - **Outage simulation** - A store can be marked unreachable to exercise failure handling
//!
//! # Quick Start
//!
//! ```ignore
//! use shelterdb::{prelude::*, memory::InMemoryStore};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let animals = DataAccessObject::connect(
//!         InMemoryStore::builder(),
//!         Namespace::new("AAC", "animals"),
//!     )
//!     .await;
//!
//!     animals.create(doc! { "name": "Rex", "species": "dog" }).await;
//!     assert_eq!(animals.read(doc! { "species": "dog" }).await.len(), 1);
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as shelterdb_memory;

pub mod store;
pub mod evaluator;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
