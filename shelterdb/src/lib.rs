//! Main shelterdb crate: a defensive CRUD wrapper over one document-store collection.
//!
//! This crate is the entry point for host applications such as the shelter outcomes
//! dashboard. It re-exports the core types and gives access to the storage backends.
//!
//! # Features
//!
//! - **Uniform CRUD** - `create`, `create_many`, `read`, `update`, `update_one`, `delete`, `delete_one`
//! - **Never throws** - Failures are logged through `tracing` and mapped to `false`, `0` or an empty list
//! - **Schema-less** - Records and queries are plain BSON documents in the store's native syntax
//! - **Multiple backends** - In-memory and MongoDB storage behind one trait
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
//!     animals.create_many(vec![
//!         doc! { "name": "Rex", "species": "dog" },
//!         doc! { "name": "Tom", "species": "cat" },
//!     ]).await;
//!
//!     let adopted = animals
//!         .update(doc! { "species": "dog" }, doc! { "adopted": true })
//!         .await;
//!     println!("{adopted} dogs adopted");
//! }
//! ```
//!
//! # Connecting to MongoDB
//!
//! With the `mongodb` feature enabled, [`mongodb::connect`] assembles the connection URI from a
//! [`ConnectionConfig`](config::ConnectionConfig), pings the server, and returns a wrapper bound
//! to the configured database and collection. If the server cannot be reached the wrapper is
//! disabled and every operation returns its conservative value.
//!
//! ```ignore
//! use shelterdb::{prelude::*, mongodb};
//!
//! let config = ConnectionConfig::new("aacuser", "secret").host("db.internal");
//! let animals = mongodb::connect(&config).await;
//!
//! if !animals.is_connected() {
//!     eprintln!("running without a database");
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-process storage for development and testing
//! - [`mongodb`] - MongoDB backend (requires `mongodb` feature)

pub mod prelude;

pub use shelterdb_core::{backend, config, dao, error, outcome, record};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use shelterdb_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use shelterdb_mongodb::{MongoDbStore, MongoDbStoreBuilder, connect};
}
