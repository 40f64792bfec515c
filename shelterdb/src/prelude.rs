//! Convenient re-exports of commonly used types from shelterdb.
//!
//! ```ignore
//! use shelterdb::prelude::*;
//! ```

pub use shelterdb_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    config::ConnectionConfig,
    dao::DataAccessObject,
    error::{StoreError, StoreResult},
    outcome::{DeleteOutcome, InsertManyOutcome, InsertOneOutcome, UpdateOutcome},
    record::{Namespace, Query, Record, record_from_json, records_to_json},
};
