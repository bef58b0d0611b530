//! A typed model layer that maps in-memory values onto a schemaless remote document store.
//!
//! This crate is the core of the firemodel project and provides:
//!
//! - **Model traits** ([`model`]) - The contract stored model types implement, plus lifecycle state
//! - **Entity descriptors** ([`schema`]) - Cached per-type storage metadata and field schemas
//! - **Field codec** ([`codec`]) - Bidirectional conversion between declared types and store values
//! - **Document mapper** ([`mapper`]) - Instance/document conversion and the save/get/delete lifecycle
//! - **Query building** ([`query`]) - Immutable chainable filters, ordering, and pagination
//! - **Store client abstraction** ([`client`]) - The narrow async interface to the document store
//! - **Error handling** ([`error`]) - Error taxonomy and result types
//!
//! # Example
//!
//! ```ignore
//! use firemodel_core::{
//!     model::{Meta, Model},
//!     schema::{FieldKind, FieldSpec},
//! };
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     #[serde(skip)]
//!     pub meta: Meta,
//!     pub name: String,
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
//! ```

#[allow(unused_extern_crates)]
extern crate self as firemodel_core;

pub mod client;
pub mod codec;
pub mod error;
pub mod mapper;
pub mod model;
pub mod query;
pub mod schema;
