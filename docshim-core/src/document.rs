//! Handles addressing a single document.

use crate::{
    backend::{SetOptions, StoreBackend},
    error::DocumentStoreResult,
    snapshot::Snapshot,
    value::Fields,
};

/// A reference to one `(collection, id)` pair.
///
/// Holding a reference says nothing about whether the document exists; every call
/// goes to the backend and sees its current state.
///
/// # Example
///
/// ```ignore
/// let job = store.collection("jobs").document("JOB_1");
///
/// job.set(fields! { "title" => "Mason", "views" => 0 }).await?;
/// job.update(fields! { "views" => FieldValue::increment_by(1) }).await?;
///
/// let snapshot = job.read().await?;
/// assert_eq!(snapshot.get("views"), Some(&Value::Integer(1)));
/// ```
#[derive(Debug)]
pub struct DocumentRef<'a, B: StoreBackend> {
    id: String,
    collection: String,
    backend: &'a B,
}

impl<'a, B: StoreBackend> DocumentRef<'a, B> {
    pub(crate) fn new(id: String, collection: String, backend: &'a B) -> Self {
        Self { id, collection, backend }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name of the collection this document belongs to.
    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    /// `collection/id`, the way the managed database addresses documents.
    pub fn path(&self) -> String {
        format!("{}/{}", self.collection, self.id)
    }

    /// Reads the document. A missing document yields a snapshot with `exists() == false`.
    pub async fn read(&self) -> DocumentStoreResult<Snapshot> {
        self.backend
            .get_document(&self.id, &self.collection)
            .await
    }

    /// Replaces the whole document with `fields`, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidDocument`](crate::error::DocumentStoreError::InvalidDocument)
    /// if a sentinel appears where it cannot be resolved (inside a list).
    pub async fn set(&self, fields: Fields) -> DocumentStoreResult<()> {
        self.set_with(fields, SetOptions::overwrite()).await
    }

    /// Writes `fields` with explicit options. With `merge`, only the given top-level
    /// fields are overwritten and the rest of the document is left untouched.
    pub async fn set_with(&self, fields: Fields, options: SetOptions) -> DocumentStoreResult<()> {
        self.backend
            .set_document(&self.id, fields, options, &self.collection)
            .await
    }

    /// Partial update: same as [`set_with`](Self::set_with) with [`SetOptions::merge`].
    /// Creates the document if absent.
    pub async fn update(&self, fields: Fields) -> DocumentStoreResult<()> {
        self.set_with(fields, SetOptions::merge()).await
    }

    /// Deletes the document. Deleting a missing document is a no-op.
    pub async fn delete(&self) -> DocumentStoreResult<()> {
        self.backend
            .delete_document(&self.id, &self.collection)
            .await
    }
}
