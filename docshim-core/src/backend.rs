//! Storage backend abstraction for the document store.
//!
//! The [`StoreBackend`] trait is the single seam between the handle types in this
//! crate and whatever actually stores documents. The in-memory backend implements it,
//! and a client for the managed database can implement the same contract and be
//! swapped in at runtime through [`DynStoreBackend`].
//!
//! # Traits
//!
//! - [`StoreBackend`]: The core trait for storage backends
//! - [`DynStoreBackend`]: A trait for dynamic dispatch over backend implementations
//! - [`StoreBackendBuilder`]: Factory trait for creating backend instances
//!
//! # Contract
//!
//! - Reading a missing document yields a snapshot with `exists() == false`.
//! - Reading or querying an unknown collection behaves like an empty collection.
//! - `set_document` creates the document if absent; with `merge` it overwrites only
//!   the given top-level fields. Sentinels are resolved when the write commits.
//! - `delete_document` on a missing id is a no-op.
//! - Read-modify-write (merge, increments) is atomic per document.

use async_trait::async_trait;
use std::{any::Any, fmt::Debug};

use crate::{error::DocumentStoreResult, query::Query, snapshot::Snapshot, value::Fields};

/// Options for a single document write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Overwrite only the given top-level fields instead of replacing the document.
    pub merge: bool,
}

impl SetOptions {
    /// Replace the whole document.
    pub fn overwrite() -> Self {
        Self { merge: false }
    }

    /// Shallow-merge the given fields into the existing document.
    pub fn merge() -> Self {
        Self { merge: true }
    }
}

/// Abstract interface for document storage backends.
///
/// # Thread Safety
///
/// All implementations must be thread-safe and support concurrent access from multiple
/// async tasks. Two concurrent writes to the same document must both take effect in
/// some order; in particular concurrent increments must never lose an update.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Reads one document.
    async fn get_document(&self, id: &str, collection: &str) -> DocumentStoreResult<Snapshot>;

    /// Writes one document, resolving sentinels against its current state.
    ///
    /// # Arguments
    ///
    /// * `id` - The document id. The document is created if it does not exist.
    /// * `fields` - The fields to write. May contain sentinels.
    /// * `options` - Whether to replace the document or merge into it.
    /// * `collection` - The collection name. Created on first write.
    async fn set_document(
        &self,
        id: &str,
        fields: Fields,
        options: SetOptions,
        collection: &str,
    ) -> DocumentStoreResult<()>;

    /// Deletes one document. Deleting a missing document succeeds.
    async fn delete_document(&self, id: &str, collection: &str) -> DocumentStoreResult<()>;

    /// Evaluates a query against the collection's state at the time of the call.
    ///
    /// Ordering and offset/limit apply to the full filtered set.
    async fn query_documents(
        &self,
        query: &Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Snapshot>>;

    /// Returns every document of a collection in the collection's iteration order.
    async fn list_documents(&self, collection: &str) -> DocumentStoreResult<Vec<Snapshot>>;

    /// Registers an empty collection if none exists under `name`.
    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()>;

    /// Lists the names of all registered collections.
    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>>;

    /// Releases backend resources.
    async fn shutdown(self) -> DocumentStoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<B> StoreBackend for &B
where
    B: StoreBackend,
{
    async fn get_document(&self, id: &str, collection: &str) -> DocumentStoreResult<Snapshot> {
        StoreBackend::get_document(*self, id, collection).await
    }

    async fn set_document(
        &self,
        id: &str,
        fields: Fields,
        options: SetOptions,
        collection: &str,
    ) -> DocumentStoreResult<()> {
        StoreBackend::set_document(*self, id, fields, options, collection).await
    }

    async fn delete_document(&self, id: &str, collection: &str) -> DocumentStoreResult<()> {
        StoreBackend::delete_document(*self, id, collection).await
    }

    async fn query_documents(
        &self,
        query: &Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Snapshot>> {
        StoreBackend::query_documents(*self, query, collection).await
    }

    async fn list_documents(&self, collection: &str) -> DocumentStoreResult<Vec<Snapshot>> {
        StoreBackend::list_documents(*self, collection).await
    }

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        StoreBackend::create_collection(*self, name).await
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        StoreBackend::list_collections(*self).await
    }
}

/// Object-safe mirror of [`StoreBackend`], so a backend can be chosen at runtime.
#[async_trait]
pub trait DynStoreBackend: Send + Sync + Debug {
    async fn get_document(&self, id: &str, collection: &str) -> DocumentStoreResult<Snapshot>;
    async fn set_document(
        &self,
        id: &str,
        fields: Fields,
        options: SetOptions,
        collection: &str,
    ) -> DocumentStoreResult<()>;
    async fn delete_document(&self, id: &str, collection: &str) -> DocumentStoreResult<()>;
    async fn query_documents(
        &self,
        query: &Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Snapshot>>;
    async fn list_documents(&self, collection: &str) -> DocumentStoreResult<Vec<Snapshot>>;
    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()>;
    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>>;
    async fn shutdown_boxed(self: Box<Self>) -> DocumentStoreResult<()>;

    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

#[async_trait]
impl<B: StoreBackend + 'static> DynStoreBackend for B {
    async fn get_document(&self, id: &str, collection: &str) -> DocumentStoreResult<Snapshot> {
        StoreBackend::get_document(self, id, collection).await
    }

    async fn set_document(
        &self,
        id: &str,
        fields: Fields,
        options: SetOptions,
        collection: &str,
    ) -> DocumentStoreResult<()> {
        StoreBackend::set_document(self, id, fields, options, collection).await
    }

    async fn delete_document(&self, id: &str, collection: &str) -> DocumentStoreResult<()> {
        StoreBackend::delete_document(self, id, collection).await
    }

    async fn query_documents(
        &self,
        query: &Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Snapshot>> {
        StoreBackend::query_documents(self, query, collection).await
    }

    async fn list_documents(&self, collection: &str) -> DocumentStoreResult<Vec<Snapshot>> {
        StoreBackend::list_documents(self, collection).await
    }

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        StoreBackend::create_collection(self, name).await
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        StoreBackend::list_collections(self).await
    }

    async fn shutdown_boxed(self: Box<Self>) -> DocumentStoreResult<()> {
        StoreBackend::shutdown(*self).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

#[async_trait]
impl StoreBackend for Box<dyn DynStoreBackend> {
    async fn get_document(&self, id: &str, collection: &str) -> DocumentStoreResult<Snapshot> {
        DynStoreBackend::get_document(&**self, id, collection).await
    }

    async fn set_document(
        &self,
        id: &str,
        fields: Fields,
        options: SetOptions,
        collection: &str,
    ) -> DocumentStoreResult<()> {
        DynStoreBackend::set_document(&**self, id, fields, options, collection).await
    }

    async fn delete_document(&self, id: &str, collection: &str) -> DocumentStoreResult<()> {
        DynStoreBackend::delete_document(&**self, id, collection).await
    }

    async fn query_documents(
        &self,
        query: &Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Snapshot>> {
        DynStoreBackend::query_documents(&**self, query, collection).await
    }

    async fn list_documents(&self, collection: &str) -> DocumentStoreResult<Vec<Snapshot>> {
        DynStoreBackend::list_documents(&**self, collection).await
    }

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        DynStoreBackend::create_collection(&**self, name).await
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        DynStoreBackend::list_collections(&**self).await
    }

    async fn shutdown(self) -> DocumentStoreResult<()> {
        DynStoreBackend::shutdown_boxed(self).await
    }
}

#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}
