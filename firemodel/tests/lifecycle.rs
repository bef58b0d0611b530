//! Save/get/delete lifecycle against the in-memory client.

use std::time::Duration;

use firemodel::{memory::MemoryClient, prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct User {
    #[serde(skip)]
    meta: Meta,
    name: String,
    email: String,
    age: i64,
}

impl Model for User {
    fn collection_name() -> &'static str {
        "lifecycle_users"
    }

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::required("name", FieldKind::String),
            FieldSpec::required("email", FieldKind::String),
            FieldSpec::required("age", FieldKind::Integer),
        ]
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }
}

fn john() -> User {
    User {
        meta: Meta::default(),
        name: "John Doe".to_string(),
        email: "john.doe@example.com".to_string(),
        age: 30,
    }
}

#[tokio::test]
async fn first_save_assigns_identity_and_timestamps() {
    let store = ModelStore::new(MemoryClient::new());

    let mut user = john();
    assert!(!user.meta().is_persisted());

    store.save(&mut user).await.unwrap();

    let id = user.meta().id().expect("identity assigned").to_string();
    assert!(!id.is_empty());
    assert!(user.meta().created_at().is_some());
    assert_eq!(user.meta().created_at(), user.meta().updated_at());

    let found: User = store
        .get(&id)
        .await
        .unwrap()
        .expect("document exists");

    assert_eq!(found.name, "John Doe");
    assert_eq!(found.email, "john.doe@example.com");
    assert_eq!(found.age, 30);
    assert_eq!(found.meta().id(), Some(id.as_str()));
    assert_eq!(found.meta().created_at(), user.meta().created_at());
    assert_eq!(found.meta().updated_at(), user.meta().updated_at());
}

#[tokio::test]
async fn repeat_save_refreshes_only_updated_at() {
    let store = ModelStore::new(MemoryClient::new());

    let mut user = john();
    store.save(&mut user).await.unwrap();

    let first_id = user.meta().id().unwrap().to_string();
    let first_created = user.meta().created_at().unwrap();
    let first_updated = user.meta().updated_at().unwrap();

    // Timestamps carry millisecond precision; step past it.
    tokio::time::sleep(Duration::from_millis(5)).await;

    user.age = 31;
    store.save(&mut user).await.unwrap();

    assert_eq!(user.meta().id(), Some(first_id.as_str()));
    assert_eq!(user.meta().created_at(), Some(first_created));
    assert!(user.meta().updated_at().unwrap() > first_updated);

    let found: User = store.get(&first_id).await.unwrap().unwrap();
    assert_eq!(found.age, 31);
    assert_eq!(found.meta().created_at(), Some(first_created));
}

#[tokio::test]
async fn explicit_identity_overwrites() {
    let client = MemoryClient::new();
    let store = ModelStore::new(client.clone());

    let mut user = john();
    store.save(&mut user).await.unwrap();
    let id = user.meta().id().unwrap().to_string();

    // A second instance fetched under the same identity overwrites.
    let mut twin: User = store.get(&id).await.unwrap().unwrap();
    twin.name = "Jonathan Doe".to_string();
    store.save(&mut twin).await.unwrap();

    let found: User = store.get(&id).await.unwrap().unwrap();
    assert_eq!(found.name, "Jonathan Doe");
}

#[tokio::test]
async fn lookup_of_missing_document_is_absence() {
    let store = ModelStore::new(MemoryClient::new());
    let found: Option<User> = store.get("no-such-id").await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn delete_then_lookup_yields_absence() {
    let store = ModelStore::new(MemoryClient::new());

    let mut user = john();
    store.save(&mut user).await.unwrap();
    let id = user.meta().id().unwrap().to_string();

    store.delete(&user).await.unwrap();

    let found: Option<User> = store.get(&id).await.unwrap();
    assert!(found.is_none());

    // Deleting the already-absent document is a no-op.
    store.delete(&user).await.unwrap();
}

#[tokio::test]
async fn delete_of_unsaved_instance_fails() {
    let store = ModelStore::new(MemoryClient::new());

    let user = john();
    let err = store.delete(&user).await.unwrap_err();
    assert!(matches!(err, ModelError::NotPersisted(_)));
}

/// A client whose writes always fail, for checking that a failed save leaves
/// the instance untouched.
#[derive(Debug)]
struct BrokenClient;

#[async_trait::async_trait]
impl StoreClient for BrokenClient {
    async fn put(
        &self,
        _collection: &str,
        _id: Option<&str>,
        _payload: bson::Document,
    ) -> ModelResult<String> {
        Err(ModelError::StoreUnavailable("connection reset".to_string()))
    }

    async fn fetch(&self, _collection: &str, _id: &str) -> ModelResult<Option<bson::Document>> {
        Err(ModelError::StoreUnavailable("connection reset".to_string()))
    }

    async fn remove(&self, _collection: &str, _id: &str) -> ModelResult<()> {
        Err(ModelError::StoreUnavailable("connection reset".to_string()))
    }

    async fn query(
        &self,
        _collection: &str,
        _query: &CompiledQuery,
    ) -> ModelResult<Vec<(String, bson::Document)>> {
        Err(ModelError::StoreUnavailable("connection reset".to_string()))
    }
}

#[tokio::test]
async fn failed_save_leaves_the_instance_unchanged() {
    let store = ModelStore::new(BrokenClient);

    let mut user = john();
    let err = store.save(&mut user).await.unwrap_err();

    assert!(matches!(err, ModelError::StoreUnavailable(_)));
    assert!(user.meta().id().is_none());
    assert!(user.meta().created_at().is_none());
    assert!(user.meta().updated_at().is_none());
}
