//! Collection handles and the queries bound to them.
//!
//! A [`Collection`] is a named handle on a backend. It never checks that the
//! collection exists: an unknown collection reads as empty, and the first write
//! creates it.
//!
//! # Example
//!
//! ```ignore
//! let jobs = store.collection("jobs");
//!
//! let latest = jobs
//!     .query()
//!     .filter("status", "==", "active")
//!     .filter("category", "==", "plumbing")
//!     .order_by("createdAt", SortDirection::Desc)
//!     .limit(20)
//!     .evaluate()
//!     .await?;
//! ```

use futures::{
    StreamExt,
    stream::{self, BoxStream},
};
use uuid::Uuid;

use crate::{
    backend::StoreBackend,
    document::DocumentRef,
    error::{DocumentStoreError, DocumentStoreResult},
    query::{FieldFilter, IntoFieldOp, Query, Sort, SortDirection},
    snapshot::Snapshot,
    value::{Fields, Value},
};

/// A named set of documents on a backend.
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the backend reference
/// * `B` - The storage backend type
#[derive(Debug)]
pub struct Collection<'a, B: StoreBackend> {
    name: String,
    backend: &'a B,
}

impl<'a, B: StoreBackend> Collection<'a, B> {
    pub(crate) fn new(name: String, backend: &'a B) -> Self {
        Self { name, backend }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a handle on the document with the given id. The document need not exist.
    pub fn document(&self, id: impl Into<String>) -> DocumentRef<'a, B> {
        DocumentRef::new(id.into(), self.name.clone(), self.backend)
    }

    /// Returns a handle on a freshly generated id without writing anything.
    pub fn new_document(&self) -> DocumentRef<'a, B> {
        self.document(Uuid::new_v4().to_string())
    }

    /// Writes `fields` as a new document under a generated id.
    pub async fn add(&self, fields: Fields) -> DocumentStoreResult<DocumentRef<'a, B>> {
        let document = self.new_document();
        document.set(fields).await?;

        Ok(document)
    }

    /// Starts a query over this collection.
    pub fn query(&self) -> CollectionQuery<'a, B> {
        CollectionQuery::new(self.name.clone(), self.backend)
    }

    /// Shorthand for `query().filter(field, op, value)`.
    pub fn filter(
        &self,
        field: impl Into<String>,
        op: impl IntoFieldOp,
        value: impl Into<Value>,
    ) -> CollectionQuery<'a, B> {
        self.query().filter(field, op, value)
    }

    /// Returns every current document, in insertion order.
    pub async fn all_documents(&self) -> DocumentStoreResult<Vec<Snapshot>> {
        self.backend.list_documents(&self.name).await
    }
}

/// A query bound to a collection.
///
/// Building the query does not touch the backend. Each call to
/// [`evaluate`](Self::evaluate) or [`stream`](Self::stream) scans the collection as it
/// is at that moment, so two evaluations separated by writes may differ.
///
/// Malformed filters (an unsupported operator token, `in` without a list, a sentinel
/// operand) are recorded when added and returned by the first evaluation; such a
/// query never silently matches nothing or everything.
#[derive(Debug)]
pub struct CollectionQuery<'a, B: StoreBackend> {
    collection: String,
    backend: &'a B,
    query: Query,
    error: Option<DocumentStoreError>,
}

impl<'a, B: StoreBackend> CollectionQuery<'a, B> {
    pub(crate) fn new(collection: String, backend: &'a B) -> Self {
        Self {
            collection,
            backend,
            query: Query::new(),
            error: None,
        }
    }

    /// Appends a filter. Multiple filters must all match.
    ///
    /// `op` is either a [`FieldOp`](crate::query::FieldOp) or a wire token such as
    /// `"=="` or `"array-contains"`.
    pub fn filter(
        mut self,
        field: impl Into<String>,
        op: impl IntoFieldOp,
        value: impl Into<Value>,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }

        let filter = op.into_field_op().and_then(|op| {
            let filter = FieldFilter::new(field, op, value);
            filter.validate()?;
            Ok(filter)
        });

        match filter {
            Ok(filter) => self.query.filters.push(filter),
            Err(err) => self.error = Some(err),
        }

        self
    }

    /// Orders results by `field`. Repeated calls add secondary keys.
    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.query.sort.push(Sort { field: field.into(), direction });
        self
    }

    /// Caps the number of results, applied after filtering and ordering.
    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Skips the first `offset` results, applied after ordering and before the limit.
    pub fn offset(mut self, offset: usize) -> Self {
        self.query.offset = Some(offset);
        self
    }

    /// Name of the collection this query scans.
    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    /// The query as built so far.
    pub fn as_query(&self) -> &Query {
        &self.query
    }

    /// Runs the query against the collection's current state.
    ///
    /// # Errors
    ///
    /// Returns the first error recorded while building the query, or a backend error.
    pub async fn evaluate(&self) -> DocumentStoreResult<Vec<Snapshot>> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        self.backend
            .query_documents(&self.query, &self.collection)
            .await
    }

    /// Returns a lazy stream of results. The scan happens on first poll, and each call
    /// produces an independent stream over the then-current state.
    pub fn stream(&self) -> BoxStream<'_, DocumentStoreResult<Snapshot>> {
        stream::once(self.evaluate())
            .map(|result| match result {
                Ok(snapshots) => stream::iter(snapshots.into_iter().map(Ok)).left_stream(),
                Err(err) => stream::iter([Err(err)]).right_stream(),
            })
            .flatten()
            .boxed()
    }
}
