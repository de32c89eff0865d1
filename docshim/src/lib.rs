//! An in-process stand-in for a managed cloud document database.
//!
//! This crate is the entry point. It re-exports the core handles and value model
//! and the in-memory backend, which substitutes for the managed database when no
//! connection to it is available.
//!
//! # Features
//!
//! - **Collections of keyed documents** - Created on first use, no schema
//! - **Snapshots** - Detached point-in-time copies of documents
//! - **Merge writes** - Overwrite only the fields you send
//! - **Sentinels** - Server timestamps and atomic increments resolved at commit time
//! - **Queries** - Conjunctive filters, ordering, offset and limit
//!
//! # Quick Start
//!
//! ```ignore
//! use docshim::{prelude::*, memory::InMemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> DocumentStoreResult<()> {
//!     let store = DataStore::new(InMemoryStore::builder().build().await?);
//!     let jobs = store.get_or_create_collection("jobs").await?;
//!
//!     jobs.document("JOB_1")
//!         .set(fields! {
//!             "title" => "Electrician",
//!             "status" => "active",
//!             "views" => 0,
//!             "createdAt" => FieldValue::server_timestamp_now(),
//!         })
//!         .await?;
//!
//!     jobs.document("JOB_1")
//!         .update(fields! { "views" => FieldValue::increment_by(1) })
//!         .await?;
//!
//!     let active = jobs
//!         .query()
//!         .filter("status", "==", "active")
//!         .order_by("createdAt", SortDirection::Desc)
//!         .limit(20)
//!         .evaluate()
//!         .await?;
//!
//!     println!("{} active jobs", active.len());
//!
//!     store.shutdown().await
//! }
//! ```
//!
//! # Dynamic Dispatch
//!
//! The routing layer can pick a backend at runtime by erasing the backend type:
//!
//! ```ignore
//! let store: DynDataStore = DataStore::new(InMemoryStore::new()).into_dyn();
//! let users = store.collection("users");
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage, the stand-in for the managed database

pub mod prelude;

pub use docshim_core::{backend, collection, document, error, query, snapshot, store, value, fields};

// Re-exported so callers can build timestamp values without a direct dependency
pub use chrono;

/// In-memory storage backend implementations.
pub mod memory {
    pub use docshim_memory::{Clock, InMemoryStore, InMemoryStoreBuilder, ManualClock, SystemClock};
}
