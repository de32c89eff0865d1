//! Convenient re-exports of commonly used types from docshim.
//!
//! ```ignore
//! use docshim::prelude::*;
//! ```
//!
//! This provides access to:
//! - The store, collection, document and query handles
//! - The value model, sentinels and the `fields!` macro
//! - Query operators and sort directions
//! - The backend trait and builder trait
//! - Error types
//!
//! [`DynStoreBackend`](docshim_core::backend::DynStoreBackend) is left out on purpose:
//! with both backend traits in scope, calling backend methods directly is ambiguous.

pub use docshim_core::{
    backend::{SetOptions, StoreBackend, StoreBackendBuilder},
    collection::{Collection, CollectionQuery},
    document::DocumentRef,
    error::{DocumentStoreError, DocumentStoreResult},
    fields,
    query::{FieldOp, Query, SortDirection},
    snapshot::Snapshot,
    store::{DataStore, DynDataStore},
    value::{FieldValue, Fields, Value, from_fields, to_fields},
};
