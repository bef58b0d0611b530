//! Core traits and types for model representation and serialization.
//!
//! This module provides the contract every stored model must implement, plus
//! the [`Meta`] value carrying store-managed lifecycle state (identity and
//! timestamps) and serialization utilities for converting models between
//! BSON and JSON.
//!
//! A model is an ordinary serde struct that embeds a `#[serde(skip)]` [`Meta`]
//! field; serde handles the declared fields while the document mapper manages
//! identity and timestamps out of band.

use bson::{Bson, Document, de::deserialize_from_bson, ser::serialize_to_bson};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, from_value, to_value};

use crate::{
    error::{ModelError, ModelResult},
    schema::FieldSpec,
};

/// Store-managed lifecycle state embedded in every model instance.
///
/// Fresh instances carry no identity and no timestamps; the store assigns the
/// identity and `created_at` on first save and refreshes `updated_at` on
/// every save. None of these values are settable by callers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Meta {
    id: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl Meta {
    /// Returns the document identity, or `None` before first persistence.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns the creation timestamp assigned on first save.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Returns the timestamp of the most recent save.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Whether the instance has been persisted at least once.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub(crate) fn assign(
        &mut self,
        id: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) {
        self.id = Some(id);
        self.created_at = Some(created_at);
        self.updated_at = Some(updated_at);
    }

    pub(crate) fn restore(
        &mut self,
        id: String,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) {
        self.id = Some(id);
        self.created_at = created_at;
        self.updated_at = updated_at;
    }
}

/// Contract every stored model type must implement.
///
/// The trait pairs a serde-serializable value with its static storage
/// metadata (collection name and field schema) and access to the embedded
/// [`Meta`] lifecycle state. The document mapper and query builder operate
/// generically over this trait.
///
/// # Example
///
/// ```ignore
/// use firemodel_core::{
///     model::{Meta, Model},
///     schema::{FieldKind, FieldSpec},
/// };
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct User {
///     #[serde(skip)]
///     pub meta: Meta,
///     pub name: String,
///     pub email: String,
///     pub age: i64,
/// }
///
/// impl Model for User {
///     fn collection_name() -> &'static str {
///         "users"
///     }
///
///     fn fields() -> Vec<FieldSpec> {
///         vec![
///             FieldSpec::required("name", FieldKind::String),
///             FieldSpec::required("email", FieldKind::String),
///             FieldSpec::required("age", FieldKind::Integer),
///         ]
///     }
///
///     fn meta(&self) -> &Meta {
///         &self.meta
///     }
///
///     fn meta_mut(&mut self) -> &mut Meta {
///         &mut self.meta
///     }
/// }
/// ```
pub trait Model: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns the name of the collection this model's documents belong to.
    ///
    /// This should be a static, lowercase identifier (e.g. "users").
    fn collection_name() -> &'static str;

    /// Returns the declared field schema in declaration order.
    ///
    /// The implicit `id`, `created_at`, and `updated_at` fields must not
    /// appear here; declaring them fails descriptor construction.
    fn fields() -> Vec<FieldSpec>;

    /// Returns the store-managed lifecycle state.
    fn meta(&self) -> &Meta;

    /// Returns mutable access to the lifecycle state (mapper use).
    fn meta_mut(&mut self) -> &mut Meta;
}

/// Extension trait providing serialization utilities for models.
///
/// Automatically implemented for all types that implement [`Model`].
pub trait ModelExt: Model {
    /// Serializes the declared fields into a raw BSON document.
    ///
    /// The embedded [`Meta`] is skipped; the result carries only declared
    /// fields, not yet validated against the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the model does not
    /// serialize to a document.
    fn to_raw(&self) -> ModelResult<Document>;

    /// Deserializes a model from a raw BSON document.
    ///
    /// The embedded [`Meta`] is left at its default; use the document mapper
    /// to populate identity and timestamps.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    fn from_raw(document: Document) -> ModelResult<Self>;

    /// Converts this model to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_json(&self) -> ModelResult<Value>;

    /// Creates a model from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    fn from_json(value: Value) -> ModelResult<Self>;
}

impl<M: Model> ModelExt for M {
    fn to_raw(&self) -> ModelResult<Document> {
        match serialize_to_bson(self)? {
            Bson::Document(document) => Ok(document),
            _ => Err(ModelError::SchemaMismatch(format!(
                "model for collection `{}` did not serialize to a document",
                M::collection_name()
            ))),
        }
    }

    fn from_raw(document: Document) -> ModelResult<Self> {
        Ok(deserialize_from_bson(Bson::Document(document))?)
    }

    fn to_json(&self) -> ModelResult<Value> {
        Ok(to_value(self)?)
    }

    fn from_json(value: Value) -> ModelResult<Self> {
        Ok(from_value(value)?)
    }
}
