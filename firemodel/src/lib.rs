//! Main firemodel crate providing a typed model layer over document stores.
//!
//! This crate is the primary entry point for users of the firemodel project.
//! It re-exports the core types and functionality from the sub-crates and
//! provides convenient access to the bundled store client implementations.
//!
//! # Features
//!
//! - **Typed models** - Plain serde structs with an explicit field schema and a managed lifecycle
//! - **Automatic identity and timestamps** - The store assigns identity and `created_at` on first save
//! - **Immutable chainable queries** - Filters, ordering, and pagination that validate before any round trip
//! - **Narrow store interface** - Any backend implementing four async operations can serve as the store
//!
//! # Quick Start
//!
//! ```ignore
//! use firemodel::{prelude::*, memory::MemoryClient};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     #[serde(skip)]
//!     pub meta: Meta,
//!     pub name: String,
//!     pub email: String,
//!     pub age: i64,
//! }
//!
//! impl Model for User {
//!     fn collection_name() -> &'static str {
//!         "users"
//!     }
//!
//!     fn fields() -> Vec<FieldSpec> {
//!         vec![
//!             FieldSpec::required("name", FieldKind::String),
//!             FieldSpec::required("email", FieldKind::String),
//!             FieldSpec::required("age", FieldKind::Integer),
//!         ]
//!     }
//!
//!     fn meta(&self) -> &Meta {
//!         &self.meta
//!     }
//!
//!     fn meta_mut(&mut self) -> &mut Meta {
//!         &mut self.meta
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = ModelStore::new(MemoryClient::new());
//!
//!     // Save a fresh instance; the store allocates its identity.
//!     let mut user = User {
//!         meta: Default::default(),
//!         name: "John Doe".to_string(),
//!         email: "john.doe@example.com".to_string(),
//!         age: 30,
//!     };
//!     store.save(&mut user).await.unwrap();
//!
//!     let id = user.meta().id().unwrap().to_string();
//!
//!     // Point lookup by identity.
//!     let found: Option<User> = store.get(&id).await.unwrap();
//!     assert!(found.is_some());
//!
//!     // Chainable query: filters, ordering, pagination.
//!     let adults = store
//!         .query::<User>()
//!         .unwrap()
//!         .filter("age", FilterOp::Gte, 18)
//!         .unwrap()
//!         .order_by("-age")
//!         .unwrap()
//!         .limit(10)
//!         .unwrap()
//!         .get()
//!         .await
//!         .unwrap();
//!
//!     println!("Queried users: {:?}", adults);
//!
//!     // Delete the backing document.
//!     store.delete(&user).await.unwrap();
//! }
//! ```

pub mod prelude;

pub use firemodel_core::{client, codec, error, mapper, model, query, schema};

// Re-export BSON types for convenience
pub use bson;

/// In-memory store client implementations.
pub mod memory {
    pub use firemodel_memory::{MemoryClient, MemoryClientBuilder};
}
