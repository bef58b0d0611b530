//! Error types and result types for model and query operations.
//!
//! This module provides the error taxonomy for every fallible operation in the
//! crate. Use [`ModelResult<T>`] as the return type for fallible operations.
//!
//! Validation errors (`InvalidModelDefinition`, `UnknownField`,
//! `InvalidArgument`, `SchemaMismatch`, `NotPersisted`) are always raised
//! before any store round trip. Failures originating in the store client are
//! surfaced unmodified as `StoreUnavailable`.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors raised by the model layer.
///
/// This enum covers descriptor construction, field validation, query
/// construction, document lifecycle issues, and pass-through store failures.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The model type's static definition is unusable (empty collection name,
    /// zero declared fields, duplicate or reserved field names).
    /// Raised when the descriptor is first constructed, never later.
    #[error("Invalid model definition: {0}")]
    InvalidModelDefinition(String),
    /// A filter or ordering clause referenced a field the model does not
    /// declare. The first argument is the field name, the second the
    /// collection name.
    #[error("Unknown field `{0}` on collection `{1}`")]
    UnknownField(String, String),
    /// A caller-supplied argument is outside the accepted range or set
    /// (negative limit/offset, unsupported operator symbol, wrong value shape
    /// for an operator).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// A value is incompatible with the field's declared type, either when
    /// decoding a stored document or when validating a query predicate value.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),
    /// A delete was attempted on an instance that has never been saved and
    /// therefore has no identity.
    #[error("Instance has no identity: {0}")]
    NotPersisted(String),
    /// A failure surfaced unmodified from the store client collaborator.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

/// A specialized `Result` type for model layer operations.
pub type ModelResult<T> = Result<T, ModelError>;

impl From<BsonError> for ModelError {
    fn from(err: BsonError) -> Self {
        ModelError::SchemaMismatch(err.to_string())
    }
}

impl From<SerdeJsonError> for ModelError {
    fn from(err: SerdeJsonError) -> Self {
        ModelError::SchemaMismatch(err.to_string())
    }
}
