//! In-memory storage implementation for document stores.
//!
//! Documents live in one insertion-ordered map per collection. Each collection has its
//! own async-aware read-write lock, and a second lock guards the registry of
//! collections, so work on one collection never waits on another.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use indexmap::IndexMap;
use mea::rwlock::RwLock;
use tracing::{debug, trace};

use docshim_core::{
    backend::{SetOptions, StoreBackend, StoreBackendBuilder},
    error::DocumentStoreResult,
    query::Query,
    snapshot::Snapshot,
    value::Fields,
};

use crate::{
    clock::{Clock, SystemClock},
    commit::commit,
    evaluator::DocumentEvaluator,
};

type CollectionMap = IndexMap<String, Fields>;
type SharedCollection = Arc<RwLock<CollectionMap>>;
type StoreMap = HashMap<String, SharedCollection>;

/// Thread-safe in-memory document storage backend.
///
/// # Thread Safety
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, allowing
/// it to be shared across async tasks. Clones of the same instance share the same
/// underlying data.
///
/// Writes hold their collection's write lock from reading the stored document until
/// the result is stored, so merges and increments on the same document never lose an
/// update. Queries hold the read lock for the whole scan and never observe a
/// half-applied write.
///
/// # Ordering
///
/// Documents iterate in insertion order. Rewriting an existing document keeps its
/// position; deleting and re-creating it moves it to the end. Unordered queries and
/// ties in ordered queries follow this order.
///
/// # Durability
///
/// None. Everything is lost when the last clone is dropped.
///
/// # Example
///
/// ```ignore
/// use docshim_memory::InMemoryStore;
/// use docshim_core::{backend::StoreBackendBuilder, store::DataStore, fields};
///
/// let store = DataStore::new(InMemoryStore::builder().build().await?);
/// store.collection("users").document("u1").set(fields! { "name" => "Amina" }).await?;
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryStore {
    /// collection_name -> (document_id -> fields)
    store: Arc<RwLock<StoreMap>>,
    /// Time source for server-timestamp sentinels
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
            clock,
        }
    }

    /// Creates a builder for constructing an `InMemoryStore` with custom options.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    async fn collection(&self, name: &str) -> Option<SharedCollection> {
        self.store
            .read()
            .await
            .get(name)
            .cloned()
    }

    async fn collection_or_create(&self, name: &str) -> SharedCollection {
        if let Some(collection) = self.collection(name).await {
            return collection;
        }

        self.store
            .write()
            .await
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!("Creating collection {}", name);
                Arc::new(RwLock::new(CollectionMap::new()))
            })
            .clone()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn get_document(&self, id: &str, collection: &str) -> DocumentStoreResult<Snapshot> {
        trace!("Reading document {} from collection {}", id, collection);

        let Some(documents) = self.collection(collection).await else {
            return Ok(Snapshot::missing(id));
        };

        let snapshot = match documents.read().await.get(id) {
            Some(fields) => Snapshot::found(id, fields.clone()),
            None => Snapshot::missing(id),
        };

        Ok(snapshot)
    }

    async fn set_document(
        &self,
        id: &str,
        fields: Fields,
        options: SetOptions,
        collection: &str,
    ) -> DocumentStoreResult<()> {
        trace!(
            "Writing document {} in collection {} (merge: {})",
            id, collection, options.merge
        );

        let documents = self.collection_or_create(collection).await;
        let mut documents = documents.write().await;

        let stored = commit(documents.get(id), fields, options, self.clock.now())?;
        let field_count = stored.len();
        let created = documents.insert(id.to_string(), stored).is_none();

        debug!(
            "Document {} in collection {} {} with {} fields",
            id,
            collection,
            if created { "created" } else { "updated" },
            field_count
        );

        Ok(())
    }

    async fn delete_document(&self, id: &str, collection: &str) -> DocumentStoreResult<()> {
        trace!("Deleting document {} from collection {}", id, collection);

        let Some(documents) = self.collection(collection).await else {
            return Ok(());
        };

        // shift_remove keeps the iteration order of the remaining documents
        if documents.write().await.shift_remove(id).is_some() {
            debug!("Document {} deleted from collection {}", id, collection);
        } else {
            trace!("Document {} not present in collection {}", id, collection);
        }

        Ok(())
    }

    async fn query_documents(
        &self,
        query: &Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Snapshot>> {
        trace!("Executing query on collection {}: {:?}", collection, query);

        query.validate()?;

        let Some(documents) = self.collection(collection).await else {
            return Ok(vec![]);
        };

        let documents = documents.read().await;
        let results = DocumentEvaluator::run_query(documents.iter(), query)?;

        debug!(
            "Query on collection {} matched {} of {} documents",
            collection,
            results.len(),
            documents.len()
        );

        Ok(results)
    }

    async fn list_documents(&self, collection: &str) -> DocumentStoreResult<Vec<Snapshot>> {
        trace!("Listing documents in collection {}", collection);

        let Some(documents) = self.collection(collection).await else {
            return Ok(vec![]);
        };

        Ok(documents
            .read()
            .await
            .iter()
            .map(|(id, fields)| Snapshot::found(id.clone(), fields.clone()))
            .collect())
    }

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.collection_or_create(name).await;

        Ok(())
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        let mut names: Vec<String> = self.store.read().await.keys().cloned().collect();
        names.sort();

        Ok(names)
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
///
/// # Example
///
/// ```ignore
/// use docshim_memory::{InMemoryStore, ManualClock};
///
/// let store = InMemoryStore::builder()
///     .with_clock(ManualClock::new(start))
///     .with_collections(["users", "wallets", "jobs"])
///     .build()
///     .await?;
/// ```
#[derive(Default, Debug)]
pub struct InMemoryStoreBuilder {
    clock: Option<Arc<dyn Clock>>,
    collections: Vec<String>,
}

impl InMemoryStoreBuilder {
    /// Uses `clock` to resolve server-timestamp sentinels.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Registers these collections up front so they are listed before their first write.
    pub fn with_collections(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.collections
            .extend(names.into_iter().map(Into::into));
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        let store = match self.clock {
            Some(clock) => InMemoryStore::with_clock(clock),
            None => InMemoryStore::new(),
        };

        for name in &self.collections {
            store.create_collection(name).await?;
        }

        debug!(
            "In-memory store ready with {} pre-registered collections",
            self.collections.len()
        );

        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docshim_core::fields;

    #[tokio::test]
    async fn unknown_collection_reads_as_empty() {
        let store = InMemoryStore::new();

        let snapshot = StoreBackend::get_document(&store, "u1", "nowhere").await.unwrap();
        assert!(!snapshot.exists());

        let listed = StoreBackend::list_documents(&store, "nowhere").await.unwrap();
        assert!(listed.is_empty());

        StoreBackend::delete_document(&store, "u1", "nowhere").await.unwrap();
        assert!(StoreBackend::list_collections(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rewrite_keeps_position_and_recreate_moves_to_end() {
        let store = InMemoryStore::new();

        for id in ["a", "b", "c"] {
            StoreBackend::set_document(&store, id, fields! { "n" => 1 }, SetOptions::overwrite(), "items")
                .await
                .unwrap();
        }

        StoreBackend::set_document(&store, "a", fields! { "n" => 2 }, SetOptions::overwrite(), "items")
            .await
            .unwrap();
        StoreBackend::delete_document(&store, "b", "items").await.unwrap();
        StoreBackend::set_document(&store, "b", fields! { "n" => 3 }, SetOptions::overwrite(), "items")
            .await
            .unwrap();

        let ids: Vec<String> = StoreBackend::list_documents(&store, "items")
            .await
            .unwrap()
            .iter()
            .map(|snapshot| snapshot.id().to_string())
            .collect();

        assert_eq!(ids, ["a", "c", "b"]);
    }

    #[tokio::test]
    async fn failed_write_leaves_document_untouched() {
        let store = InMemoryStore::new();
        StoreBackend::set_document(&store, "u1", fields! { "n" => 1 }, SetOptions::overwrite(), "users")
            .await
            .unwrap();

        let result = StoreBackend::set_document(
            &store,
            "u1",
            fields! { "log" => vec![docshim_core::value::FieldValue::server_timestamp_now()] },
            SetOptions::overwrite(),
            "users",
        )
        .await;

        assert!(result.is_err());
        let snapshot = StoreBackend::get_document(&store, "u1", "users").await.unwrap();
        assert_eq!(snapshot.data(), Some(fields! { "n" => 1 }));
    }

    #[tokio::test]
    async fn builder_preregisters_collections() {
        let store = InMemoryStore::builder()
            .with_collections(["wallets", "users"])
            .build()
            .await
            .unwrap();

        assert_eq!(
            StoreBackend::list_collections(&store).await.unwrap(),
            ["users", "wallets"]
        );
    }
}
