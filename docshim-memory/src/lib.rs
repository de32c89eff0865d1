//! In-memory document storage backend for docshim.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend`
//! trait that reproduces the managed database's semantics closely enough for code
//! written against it to run unmodified: merge writes, server-timestamp and increment
//! sentinels, and filtered, ordered, limited queries.
//!
//! # Features
//!
//! - **Per-collection locking** - Async-aware read-write locks, one per collection
//! - **Atomic read-modify-write** - Merges and increments never lose updates
//! - **Live queries** - Every evaluation scans the collection as it is at that moment
//! - **Deterministic time** - Pluggable [`Clock`] for server timestamps
//!
//! # Quick Start
//!
//! ```ignore
//! use docshim::{prelude::*, memory::InMemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DataStore::new(InMemoryStore::builder().build().await?);
//!     let wallets = store.collection("wallets");
//!
//!     wallets.document("user_1").set(fields! { "KES" => 100 }).await?;
//!     wallets.document("user_1").update(fields! { "KES" => FieldValue::increment_by(50) }).await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docshim_memory;

pub mod clock;
mod commit;
pub(crate) mod evaluator;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{InMemoryStore, InMemoryStoreBuilder};
