//! In-memory store client implementation.
//!
//! This module provides a simple but complete [`StoreClient`] that keeps
//! documents in HashMaps behind an async-aware read-write lock. Identity
//! allocation, point lookups, idempotent removal, and compiled-query
//! execution all behave like a remote document store, which makes the client
//! a drop-in collaborator for development and tests.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use bson::Document;
use log::trace;
use mea::rwlock::RwLock;
use uuid::Uuid;

use firemodel_core::{
    client::{StoreClient, StoreClientBuilder},
    error::ModelResult,
    query::CompiledQuery,
};

use crate::evaluator::{compare, matches_all};

type CollectionMap = HashMap<String, Document>;
type StoreMap = HashMap<String, CollectionMap>;

/// In-memory document store client.
///
/// Cloneable; clones share the same underlying state through an `Arc`, so a
/// single logical store can back multiple [`ModelStore`] instances in tests.
/// Queries scan the collection (no indexing), which is fine for the dataset
/// sizes this client is meant for.
///
/// # Example
///
/// ```ignore
/// use firemodel_memory::MemoryClient;
/// use bson::doc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = MemoryClient::new();
///
///     // The store allocates an identity when none is given
///     let id = client.put("users", None, doc! { "name": "Alice" }).await?;
///
///     let payload = client.fetch("users", &id).await?;
///     assert!(payload.is_some());
///
///     Ok(())
/// }
/// ```
#[derive(Default, Clone, Debug)]
pub struct MemoryClient {
    /// The main storage map: collection_name -> (document_id -> payload)
    store: Arc<RwLock<StoreMap>>,
}

impl MemoryClient {
    /// Creates a new empty in-memory client.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder for constructing a `MemoryClient`.
    ///
    /// Currently the builder simply creates a default client, but it can be
    /// extended with configuration options.
    pub fn builder() -> MemoryClientBuilder {
        MemoryClientBuilder::default()
    }
}

#[async_trait]
impl StoreClient for MemoryClient {
    async fn put(
        &self,
        collection: &str,
        id: Option<&str>,
        payload: Document,
    ) -> ModelResult<String> {
        let mut store = self.store.write().await;
        let collection_map = store
            .entry(collection.to_string())
            .or_default();

        let id = match id {
            Some(id) => id.to_string(),
            None => Uuid::new_v4().simple().to_string(),
        };

        trace!("put `{id}` into `{collection}`");
        collection_map.insert(id.clone(), payload);

        Ok(id)
    }

    async fn fetch(&self, collection: &str, id: &str) -> ModelResult<Option<Document>> {
        let store = self.store.read().await;

        Ok(store
            .get(collection)
            .and_then(|collection_map| collection_map.get(id))
            .cloned())
    }

    async fn remove(&self, collection: &str, id: &str) -> ModelResult<()> {
        let mut store = self.store.write().await;

        // Removing an absent document or collection is a no-op.
        if let Some(collection_map) = store.get_mut(collection) {
            collection_map.remove(id);
        }

        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        query: &CompiledQuery,
    ) -> ModelResult<Vec<(String, Document)>> {
        let store = self.store.read().await;
        let collection_map = match store.get(collection) {
            Some(col) => col,
            None => return Ok(vec![]),
        };

        let mut rows = collection_map
            .iter()
            .filter(|(id, payload)| matches_all(id, payload, &query.filters))
            .map(|(id, payload)| (id.clone(), payload.clone()))
            .collect::<Vec<_>>();

        if !query.order.is_empty() {
            rows.sort_by(|(a_id, a), (b_id, b)| {
                compare((a_id.as_str(), a), (b_id.as_str(), b), &query.order)
            });
        }

        Ok(rows
            .into_iter()
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .collect())
    }
}

/// Builder for constructing [`MemoryClient`] instances.
#[derive(Default)]
pub struct MemoryClientBuilder;

#[async_trait]
impl StoreClientBuilder for MemoryClientBuilder {
    type Client = MemoryClient;

    /// Builds and returns a new [`MemoryClient`] instance.
    ///
    /// This always succeeds and returns a freshly initialized client.
    async fn build(self) -> ModelResult<Self::Client> {
        Ok(MemoryClient::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use firemodel_core::query::{Direction, FilterOp, OrderClause, Predicate};

    fn empty_query() -> CompiledQuery {
        CompiledQuery {
            filters: vec![],
            order: vec![],
            offset: None,
            limit: None,
        }
    }

    #[tokio::test]
    async fn put_without_identity_allocates_one() {
        let client = MemoryClient::new();

        let id = client
            .put("users", None, doc! { "name": "Alice" })
            .await
            .unwrap();
        assert!(!id.is_empty());

        let payload = client.fetch("users", &id).await.unwrap().unwrap();
        assert_eq!(payload.get_str("name").unwrap(), "Alice");
    }

    #[tokio::test]
    async fn put_with_identity_overwrites() {
        let client = MemoryClient::new();

        let id = client
            .put("users", Some("u1"), doc! { "name": "Alice" })
            .await
            .unwrap();
        assert_eq!(id, "u1");

        client
            .put("users", Some("u1"), doc! { "name": "Alicia" })
            .await
            .unwrap();

        let payload = client.fetch("users", "u1").await.unwrap().unwrap();
        assert_eq!(payload.get_str("name").unwrap(), "Alicia");
    }

    #[tokio::test]
    async fn fetch_of_missing_document_is_none() {
        let client = MemoryClient::new();
        assert!(client.fetch("users", "ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let client = MemoryClient::new();

        client
            .put("users", Some("u1"), doc! { "name": "Alice" })
            .await
            .unwrap();

        client.remove("users", "u1").await.unwrap();
        client.remove("users", "u1").await.unwrap();
        client.remove("ghosts", "u1").await.unwrap();

        assert!(client.fetch("users", "u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let client = MemoryClient::new();
        let other = client.clone();

        client
            .put("users", Some("u1"), doc! { "name": "Alice" })
            .await
            .unwrap();

        assert!(other.fetch("users", "u1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn query_filters_sorts_and_paginates() {
        let client = MemoryClient::new();

        for (id, age) in [("a", 20_i64), ("b", 26), ("c", 31), ("d", 44), ("e", 35)] {
            client
                .put("users", Some(id), doc! { "age": age })
                .await
                .unwrap();
        }

        let query = CompiledQuery {
            filters: vec![Predicate {
                field: "age".to_string(),
                op: FilterOp::Gt,
                value: bson::Bson::Int64(25),
            }],
            order: vec![OrderClause {
                field: "age".to_string(),
                direction: Direction::Descending,
            }],
            offset: Some(1),
            limit: Some(2),
        };

        let rows = client.query("users", &query).await.unwrap();
        let ids = rows
            .iter()
            .map(|(id, _)| id.as_str())
            .collect::<Vec<_>>();

        // Matching ages 26, 31, 35, 44 sorted descending, skip 1, take 2.
        assert_eq!(ids, vec!["e", "c"]);
    }

    #[tokio::test]
    async fn query_can_address_the_identity() {
        let client = MemoryClient::new();

        for id in ["a", "b", "c"] {
            client
                .put("users", Some(id), doc! { "age": 1_i64 })
                .await
                .unwrap();
        }

        let query = CompiledQuery {
            filters: vec![Predicate {
                field: "id".to_string(),
                op: FilterOp::Ne,
                value: bson::Bson::String("b".to_string()),
            }],
            order: vec![OrderClause {
                field: "id".to_string(),
                direction: Direction::Ascending,
            }],
            offset: None,
            limit: None,
        };

        let rows = client.query("users", &query).await.unwrap();
        let ids = rows
            .iter()
            .map(|(id, _)| id.as_str())
            .collect::<Vec<_>>();

        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn query_on_missing_collection_is_empty() {
        let client = MemoryClient::new();
        let rows = client.query("ghosts", &empty_query()).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn builder_constructs_a_client() {
        let client = MemoryClient::builder().build().await.unwrap();
        assert!(client.fetch("users", "u1").await.unwrap().is_none());
    }
}
