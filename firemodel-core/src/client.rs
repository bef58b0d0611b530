//! Store client abstraction: the narrow interface to the document store.
//!
//! This module defines the trait the model layer calls through for every
//! store round trip. Transport concerns (connection pooling, retries,
//! authentication) live entirely behind this trait; the model layer performs
//! exactly one client call per operation, never retries, and never holds a
//! lock across a suspension point.
//!
//! # Traits
//!
//! - [`StoreClient`]: the four store operations the mapper and query builder need
//! - [`StoreClientBuilder`]: factory trait for constructing client instances
//!
//! # Examples
//!
//! ```ignore
//! use firemodel_core::client::StoreClient;
//! use bson::doc;
//!
//! // Use a concrete client implementation
//! let client = MyClientImpl::new();
//!
//! // Persist a payload, letting the store allocate the identity
//! let id = client.put("users", None, doc! { "name": "Alice" }).await?;
//! let payload = client.fetch("users", &id).await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use bson::Document;
use std::fmt::Debug;

use crate::{error::ModelResult, query::CompiledQuery};

/// Abstract interface to a schemaless document store.
///
/// Implementers provide the concrete transport for document persistence. All
/// methods are async and suspend the calling task until the store responds;
/// cancellation of an in-flight call is delegated to the implementation.
///
/// Failures should be reported as
/// [`ModelError::StoreUnavailable`](crate::error::ModelError::StoreUnavailable)
/// so the model layer can surface them unmodified.
#[async_trait]
pub trait StoreClient: Send + Sync + Debug {
    /// Creates or overwrites a document.
    ///
    /// An explicit `id` always overwrites the addressed document; `None`
    /// asks the store to allocate a fresh identity. Returns the identity
    /// the document was written under.
    async fn put(
        &self,
        collection: &str,
        id: Option<&str>,
        payload: Document,
    ) -> ModelResult<String>;

    /// Point lookup by identity.
    ///
    /// A non-existent document yields `Ok(None)`, never an error.
    async fn fetch(&self, collection: &str, id: &str) -> ModelResult<Option<Document>>;

    /// Removes a document by identity.
    ///
    /// Removing an already-absent document is a no-op.
    async fn remove(&self, collection: &str, id: &str) -> ModelResult<()>;

    /// Executes a compiled query and returns the matching `(id, payload)`
    /// rows.
    ///
    /// An empty result set is `Ok(vec![])`, never an error.
    async fn query(
        &self,
        collection: &str,
        query: &CompiledQuery,
    ) -> ModelResult<Vec<(String, Document)>>;
}

#[async_trait]
impl<C> StoreClient for &C
where
    C: StoreClient,
{
    async fn put(
        &self,
        collection: &str,
        id: Option<&str>,
        payload: Document,
    ) -> ModelResult<String> {
        (*self)
            .put(collection, id, payload)
            .await
    }

    async fn fetch(&self, collection: &str, id: &str) -> ModelResult<Option<Document>> {
        (*self).fetch(collection, id).await
    }

    async fn remove(&self, collection: &str, id: &str) -> ModelResult<()> {
        (*self).remove(collection, id).await
    }

    async fn query(
        &self,
        collection: &str,
        query: &CompiledQuery,
    ) -> ModelResult<Vec<(String, Document)>> {
        (*self).query(collection, query).await
    }
}

#[async_trait]
pub trait StoreClientBuilder {
    type Client: StoreClient;

    async fn build(self) -> ModelResult<Self::Client>;
}
