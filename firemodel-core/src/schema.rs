//! Entity descriptors: per-model static storage metadata.
//!
//! Every model type resolves to exactly one [`EntityDescriptor`] holding its
//! collection name and ordered field schema. Descriptors are built lazily on
//! first use, validated at construction time, and cached process-wide for the
//! lifetime of the type. Both the document mapper and the query builder
//! consult the descriptor for field existence and type checks, so an invalid
//! field name fails before any store round trip.

use std::{
    any::TypeId,
    collections::{HashMap, HashSet},
    sync::{Arc, LazyLock, RwLock},
};

use bson::Bson;

use crate::{
    error::{ModelError, ModelResult},
    model::Model,
};

/// Name of the implicit identity field on every model.
pub const IDENTITY_FIELD: &str = "id";

/// Name of the implicit store-managed creation timestamp field.
pub const CREATED_AT_FIELD: &str = "created_at";

/// Name of the implicit store-managed update timestamp field.
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Declared type of a model field.
///
/// The codec maps each kind to a store-native BSON representation; timestamps
/// are stored as native datetime values so that `order_by` over them keeps
/// chronological ordering.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// UTF-8 string.
    String,
    /// Signed integer, normalized to 64 bits in storage.
    Integer,
    /// Double-precision float.
    Float,
    /// Boolean.
    Boolean,
    /// Point in time, stored as a native datetime value.
    Timestamp,
    /// Homogeneous list of the given element kind.
    List(Box<FieldKind>),
    /// Nested document with free-form keys.
    Map,
}

impl FieldKind {
    /// Returns a short human-readable name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Boolean => "boolean",
            FieldKind::Timestamp => "timestamp",
            FieldKind::List(_) => "list",
            FieldKind::Map => "map",
        }
    }
}

/// Schema entry for a single declared field.
///
/// # Example
///
/// ```ignore
/// use firemodel_core::schema::{FieldSpec, FieldKind};
///
/// let name = FieldSpec::required("name", FieldKind::String);
/// let nickname = FieldSpec::optional("nickname", FieldKind::String)
///     .with_default("anonymous");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// The field name as stored in the document.
    pub name: String,
    /// The declared type.
    pub kind: FieldKind,
    /// Whether the field may be absent or null.
    pub optional: bool,
    /// Value substituted when an optional field is absent.
    pub default: Option<Bson>,
}

impl FieldSpec {
    /// Creates a required field specification.
    pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
        Self { name: name.into(), kind, optional: false, default: None }
    }

    /// Creates an optional field specification with no default.
    ///
    /// An absent optional field decodes to null unless a default is attached
    /// with [`FieldSpec::with_default`].
    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self { name: name.into(), kind, optional: true, default: None }
    }

    /// Attaches a default value substituted when the field is absent.
    pub fn with_default(mut self, default: impl Into<Bson>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Cached static metadata describing a model type's storage shape.
///
/// Constructed at most once per model type via [`describe`]; read-only after
/// construction. The descriptor is the single source of truth for field
/// existence and type checks.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDescriptor {
    collection: String,
    fields: Vec<FieldSpec>,
}

impl EntityDescriptor {
    /// Validates and constructs a descriptor from a collection name and an
    /// ordered field schema.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidModelDefinition`] when the collection
    /// name is empty, the schema declares zero fields, a field name is
    /// duplicated, or a field shadows one of the implicit fields
    /// (`id`, `created_at`, `updated_at`).
    pub fn new(collection: impl Into<String>, fields: Vec<FieldSpec>) -> ModelResult<Self> {
        let collection = collection.into();

        if collection.is_empty() {
            return Err(ModelError::InvalidModelDefinition(
                "collection name must not be empty".to_string(),
            ));
        }

        if fields.is_empty() {
            return Err(ModelError::InvalidModelDefinition(format!(
                "model for collection `{collection}` declares zero fields"
            )));
        }

        let mut seen = HashSet::new();

        for spec in &fields {
            if matches!(
                spec.name.as_str(),
                IDENTITY_FIELD | CREATED_AT_FIELD | UPDATED_AT_FIELD
            ) {
                return Err(ModelError::InvalidModelDefinition(format!(
                    "field `{}` is implicit and must not be declared",
                    spec.name
                )));
            }

            if !seen.insert(spec.name.as_str()) {
                return Err(ModelError::InvalidModelDefinition(format!(
                    "duplicate field `{}` in collection `{collection}`",
                    spec.name
                )));
            }
        }

        Ok(Self { collection, fields })
    }

    /// Returns the collection name documents of this model are stored under.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Returns the declared fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up a declared field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|spec| spec.name == name)
    }

    /// Looks up a declared field by name, failing fast when it is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownField`] when the model does not declare
    /// the field.
    pub fn expect_field(&self, name: &str) -> ModelResult<&FieldSpec> {
        self.field(name)
            .ok_or_else(|| ModelError::UnknownField(name.to_string(), self.collection.clone()))
    }

    /// Resolves a field path for query validation.
    ///
    /// Recognizes the implicit `id` (string) and `created_at` / `updated_at`
    /// (timestamp) fields alongside declared ones, so the store-managed
    /// fields are filterable and orderable like any other. Dotted paths
    /// descend into [`FieldKind::Map`] fields; map interiors are free-form,
    /// so a path landing inside one resolves to `None` and its values cannot
    /// be type-checked statically.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownField`] when the head segment is neither
    /// a declared nor an implicit field, or when the path descends into a
    /// non-map field.
    pub fn query_kind(&self, path: &str) -> ModelResult<Option<FieldKind>> {
        let mut segments = path.split('.');
        let head = segments.next().unwrap_or("");

        let kind = match head {
            IDENTITY_FIELD => FieldKind::String,
            CREATED_AT_FIELD | UPDATED_AT_FIELD => FieldKind::Timestamp,
            _ => self.expect_field(head)?.kind.clone(),
        };

        if segments.next().is_none() {
            return Ok(Some(kind));
        }

        // Deeper segments are only addressable inside free-form maps.
        match kind {
            FieldKind::Map => Ok(None),
            _ => Err(ModelError::UnknownField(
                path.to_string(),
                self.collection.clone(),
            )),
        }
    }
}

type DescriptorMap = HashMap<TypeId, Arc<EntityDescriptor>>;

static REGISTRY: LazyLock<RwLock<DescriptorMap>> = LazyLock::new(Default::default);

/// Resolves the cached descriptor for a model type, building it on first use.
///
/// Idempotent: repeated calls for the same type return the same shared
/// descriptor. Construction failures are not cached, so a broken definition
/// fails on every call.
///
/// # Errors
///
/// Returns [`ModelError::InvalidModelDefinition`] when the model's static
/// definition fails descriptor validation.
pub fn describe<M: Model>() -> ModelResult<Arc<EntityDescriptor>> {
    let key = TypeId::of::<M>();

    if let Some(descriptor) = REGISTRY
        .read()
        .expect("descriptor registry poisoned")
        .get(&key)
    {
        return Ok(descriptor.clone());
    }

    let descriptor = Arc::new(EntityDescriptor::new(M::collection_name(), M::fields())?);

    let mut registry = REGISTRY
        .write()
        .expect("descriptor registry poisoned");

    // A racing caller may have populated the entry; keep the first one.
    Ok(registry
        .entry(key)
        .or_insert(descriptor)
        .clone())
}
