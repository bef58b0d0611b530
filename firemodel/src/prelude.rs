//! Convenient re-exports of commonly used types from firemodel.
//!
//! Import this prelude module to quickly access the most frequently used
//! types and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use firemodel::prelude::*;
//! ```
//!
//! This provides access to:
//! - Model traits and lifecycle state
//! - Field schema declarations
//! - The model store and query construction
//! - Store client traits
//! - Error types

pub use firemodel_core::{
    client::{StoreClient, StoreClientBuilder},
    error::{ModelError, ModelResult},
    mapper::{ModelStore, from_document, to_document},
    model::{Meta, Model, ModelExt},
    query::{
        CompiledQuery, Direction, FilterOp, ModelQuery, OrderClause, Predicate, QueryExpression,
    },
    schema::{EntityDescriptor, FieldKind, FieldSpec, describe},
};
