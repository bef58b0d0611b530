//! In-memory store client for firemodel.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! `StoreClient` trait. It uses async-aware read-write locks for concurrent
//! access and is ideal for development and tests that should not touch a
//! remote document store.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using an async-aware RwLock
//! - **Identity allocation** - Documents saved without an identity get a store-generated one
//! - **Full query support** - Conjunctive filtering, multi-key sorting, offset and limit
//!
//! # Quick Start
//!
//! ```ignore
//! use firemodel_core::mapper::ModelStore;
//! use firemodel_memory::MemoryClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = ModelStore::new(MemoryClient::new());
//!
//!     let mut user = User { meta: Default::default(), name: "Alice".to_string(), age: 30 };
//!     store.save(&mut user).await?;
//!
//!     assert!(user.meta().is_persisted());
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as firemodel_memory;

pub mod evaluator;
pub mod store;

pub use store::{MemoryClient, MemoryClientBuilder};
