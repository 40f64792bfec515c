//! A thin CRUD wrapper over a single document-store collection.
//!
//! This crate is the core of the shelterdb project and provides:
//!
//! - **Data access object** ([`dao`]) - The defensive create/read/update/delete surface
//! - **Store backend abstraction** ([`backend`]) - The trait a store driver implements
//! - **Records and queries** ([`record`]) - Schema-less records, native queries, namespaces
//! - **Write outcomes** ([`outcome`]) - What a backend reports for each write
//! - **Connection settings** ([`config`]) - Credentials, address, and namespace defaults
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! # Example
//!
//! ```ignore
//! use shelterdb::{prelude::*, memory::InMemoryStore};
//! use bson::doc;
//!
//! let animals = DataAccessObject::connect(
//!     InMemoryStore::builder(),
//!     ConnectionConfig::new("aacuser", "secret").namespace(),
//! )
//! .await;
//!
//! animals.create(doc! { "name": "Rex", "species": "dog" }).await;
//! let dogs = animals.read(doc! { "species": "dog" }).await;
//! ```

#[allow(unused_extern_crates)]
extern crate self as shelterdb_core;

pub mod backend;
pub mod config;
pub mod dao;
pub mod error;
pub mod outcome;
pub mod record;
