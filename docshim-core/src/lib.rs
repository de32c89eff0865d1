//! Core types for an in-process stand-in for a managed cloud document database.
//!
//! Calling code written against the managed database addresses documents through
//! named collections, reads point-in-time snapshots, writes whole or partial
//! documents, and runs simple conjunctive queries. This crate provides that surface
//! on top of a pluggable [`backend::StoreBackend`]:
//!
//! - **Values** ([`value`]) - The typed value model, including write-time sentinels
//! - **Snapshots** ([`snapshot`]) - Detached copies of documents as they were read
//! - **Queries** ([`query`]) - Filters, ordering and bounds, plus a visitor for backends
//! - **Backends** ([`backend`]) - The storage contract shared by every implementation
//! - **Store** ([`store`]), **collections** ([`collection`]) and **documents** ([`document`]) - Handles
//! - **Errors** ([`error`]) - Error and result types
//!
//! # Example
//!
//! ```ignore
//! use docshim_core::{fields, store::DataStore, value::FieldValue};
//!
//! let store = DataStore::new(backend);
//! let job = store.collection("jobs").document("JOB_1");
//!
//! job.set(fields! { "status" => "active", "createdAt" => FieldValue::server_timestamp_now() }).await?;
//! job.update(fields! { "views" => FieldValue::increment_by(1) }).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as docshim_core;

pub mod backend;
pub mod collection;
pub mod document;
pub mod error;
pub mod query;
pub mod snapshot;
pub mod store;
pub mod value;
