//! The top-level store handle.
//!
//! A [`DataStore`] is an explicitly constructed value wrapping one backend. There is
//! no process-wide instance: the routing layer and each test build and pass their own.
//!
//! # Example
//!
//! ```ignore
//! use docshim::{prelude::*, memory::InMemoryStore};
//!
//! let store = DataStore::new(InMemoryStore::builder().build().await?);
//! let users = store.get_or_create_collection("users").await?;
//! users.document("user_1").set(fields! { "fullName" => "Test User" }).await?;
//! ```

use std::any::Any;

use crate::{
    backend::{DynStoreBackend, StoreBackend},
    collection::Collection,
    error::DocumentStoreResult,
};

/// A store bound to a specific backend implementation.
///
/// # Type Parameters
///
/// * `B` - The backend implementation type
#[derive(Debug, Clone)]
pub struct DataStore<B: StoreBackend> {
    backend: B,
}

/// A store whose backend was chosen at runtime.
pub type DynDataStore = DataStore<Box<dyn DynStoreBackend>>;

impl<B: StoreBackend> DataStore<B> {
    /// Creates a new store with the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns a handle on the named collection without touching the backend.
    ///
    /// An unknown collection reads as empty; the first write creates it.
    pub fn collection<'a>(&'a self, name: &str) -> Collection<'a, B> {
        Collection::new(name.to_string(), &self.backend)
    }

    /// Returns a handle on the named collection, registering it with the backend
    /// first if it does not exist yet.
    pub async fn get_or_create_collection<'a>(
        &'a self,
        name: &str,
    ) -> DocumentStoreResult<Collection<'a, B>> {
        self.backend.create_collection(name).await?;

        Ok(self.collection(name))
    }

    /// Lists all registered collections.
    pub async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        self.backend.list_collections().await
    }

    /// Shuts down the store and releases backend resources.
    pub async fn shutdown(self) -> DocumentStoreResult<()> {
        self.backend.shutdown().await
    }
}

impl<B: StoreBackend + 'static> DataStore<B> {
    /// Erases the backend type so it can be swapped for another at runtime.
    pub fn into_dyn(self) -> DynDataStore {
        DataStore::new(Box::new(self.backend))
    }
}

impl DataStore<Box<dyn DynStoreBackend>> {
    /// Returns the backend as `T` if that is the concrete backend in use.
    pub fn backend_as<T: StoreBackend + 'static>(&self) -> Option<&T> {
        DynStoreBackend::as_any(&*self.backend).downcast_ref::<T>()
    }

    /// Recovers the statically typed store if `T` is the concrete backend in use.
    pub fn into_static<T: StoreBackend + 'static>(self) -> Option<DataStore<T>> {
        let any: Box<dyn Any> = DynStoreBackend::into_any(self.backend);

        any.downcast::<T>()
            .ok()
            .map(|backend| DataStore::new(*backend))
    }
}
