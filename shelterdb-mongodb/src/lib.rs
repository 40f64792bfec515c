//! MongoDB backend implementation for shelterdb.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend` trait on top of
//! the official async driver. Queries are passed through untouched, so the full MongoDB query
//! language is available to callers; updates are sent as `$set` documents.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! shelterdb = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Connection
//!
//! The connection URI is assembled from a [`ConnectionConfig`](shelterdb_core::config::ConnectionConfig)
//! and authenticates against the `admin` database. Building the client only parses options;
//! the liveness check (`ping`) is what actually reaches the server.
//!
//! # Example
//!
//! ```ignore
//! use shelterdb::{prelude::*, mongodb};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ConnectionConfig::new("aacuser", "secret");
//!     let animals = mongodb::connect(&config).await;
//!
//!     let dogs = animals.read(doc! { "animal_type": "Dog" }).await;
//!     println!("{} dogs", dogs.len());
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as shelterdb_mongodb;

pub mod store;

pub use store::{MongoDbStore, MongoDbStoreBuilder, connect};
