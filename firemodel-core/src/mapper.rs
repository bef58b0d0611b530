//! Document mapping and the main store interface for model instances.
//!
//! This module converts model instances to store documents and back, and
//! exposes [`ModelStore`], the entry point application code uses for the
//! whole model lifecycle: `save`, `get`, `delete`, and query construction.
//!
//! # Lifecycle
//!
//! A fresh instance has no identity. The first `save` writes it, lets the
//! store allocate an identity when none is set, and stamps `created_at` and
//! `updated_at`. Later saves overwrite the document and refresh `updated_at`
//! only. `delete` removes the backing document; the in-memory instance
//! remains but is stale afterwards.
//!
//! # Example
//!
//! ```ignore
//! use firemodel_core::mapper::ModelStore;
//!
//! let store = ModelStore::new(client);
//!
//! let mut user = User { meta: Default::default(), name: "Alice".into(), age: 30 };
//! store.save(&mut user).await?;
//! assert!(user.meta().is_persisted());
//!
//! let found: Option<User> = store.get(user.meta().id().unwrap()).await?;
//! store.delete(&user).await?;
//! # Ok::<(), firemodel_core::error::ModelError>(())
//! ```

use bson::{Bson, Document};
use chrono::{DateTime, Utc};
use log::debug;

use crate::{
    client::StoreClient,
    codec,
    error::{ModelError, ModelResult},
    model::{Model, ModelExt},
    query::{FilterOp, ModelQuery},
    schema::{CREATED_AT_FIELD, UPDATED_AT_FIELD, describe},
};

/// Serializes a model instance into its store document form.
///
/// Every declared field is validated and encoded through the field codec.
/// The payload's `updated_at` is set to `now` on every call; `created_at` is
/// set to `now` only when the instance is unpersisted, otherwise the existing
/// value is carried over. The returned identity is `None` for unpersisted
/// instances, signalling the store to allocate one.
///
/// The instance itself is never mutated here; lifecycle state is only
/// updated after a successful write.
///
/// # Errors
///
/// Returns [`ModelError::SchemaMismatch`] when a field value does not fit its
/// declared type.
pub fn to_document<M: Model>(
    instance: &M,
    now: DateTime<Utc>,
) -> ModelResult<(Option<String>, Document)> {
    let descriptor = describe::<M>()?;
    let raw = instance.to_raw()?;

    let mut payload = Document::new();

    for spec in descriptor.fields() {
        payload.insert(
            spec.name.clone(),
            codec::encode(spec, raw.get(&spec.name))?,
        );
    }

    let created_at = instance
        .meta()
        .created_at()
        .unwrap_or(now);

    payload.insert(
        CREATED_AT_FIELD,
        Bson::DateTime(bson::DateTime::from_chrono(created_at)),
    );
    payload.insert(
        UPDATED_AT_FIELD,
        Bson::DateTime(bson::DateTime::from_chrono(now)),
    );

    Ok((instance.meta().id().map(str::to_string), payload))
}

/// Materializes a model instance from a stored document.
///
/// Every declared field is decoded through the field codec (absent optional
/// fields fall back to their defaults), then the identity and store-managed
/// timestamps are restored onto the instance's lifecycle state.
///
/// # Errors
///
/// Returns [`ModelError::SchemaMismatch`] when a required field is absent or
/// a stored value is incompatible with its declared type.
pub fn from_document<M: Model>(id: &str, payload: &Document) -> ModelResult<M> {
    let descriptor = describe::<M>()?;

    let mut validated = Document::new();

    for spec in descriptor.fields() {
        validated.insert(
            spec.name.clone(),
            codec::decode(spec, payload.get(&spec.name))?,
        );
    }

    let mut instance = M::from_raw(validated)?;

    let created_at = stored_timestamp(payload, CREATED_AT_FIELD)?;
    let updated_at = stored_timestamp(payload, UPDATED_AT_FIELD)?;

    instance
        .meta_mut()
        .restore(id.to_string(), created_at, updated_at);

    Ok(instance)
}

fn stored_timestamp(payload: &Document, field: &str) -> ModelResult<Option<DateTime<Utc>>> {
    match payload.get(field) {
        Some(Bson::DateTime(ts)) => Ok(Some(ts.to_chrono())),
        Some(_) => Err(ModelError::SchemaMismatch(format!(
            "stored `{field}` is not a native timestamp"
        ))),
        None => Ok(None),
    }
}

/// The main interface for persisting and retrieving model instances.
///
/// Wraps a [`StoreClient`] and operates generically over any [`Model`].
/// Every operation is a single store round trip with no retry and no
/// partial-state cleanup; concurrent saves against the same identity are
/// last-write-wins at the store level.
#[derive(Debug)]
pub struct ModelStore<C: StoreClient> {
    client: C,
}

impl<C: StoreClient> ModelStore<C> {
    /// Creates a new store over the given client.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Returns the underlying store client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Starts a chainable query over the model's collection.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidModelDefinition`] when the model's
    /// descriptor fails validation.
    pub fn query<M: Model>(&self) -> ModelResult<ModelQuery<'_, C, M>> {
        Ok(ModelQuery::new(self, describe::<M>()?))
    }

    /// Persists the instance with create-or-overwrite semantics.
    ///
    /// An instance without identity is written under a store-allocated
    /// identity; an instance with identity overwrites its document. On
    /// success the instance's identity and timestamps are updated in place
    /// to what was written; on failure the instance is left untouched.
    ///
    /// This is an at-most-one-write operation with no implicit retry.
    ///
    /// # Errors
    ///
    /// Field validation failures are raised before the store is contacted;
    /// store failures are surfaced unmodified.
    pub async fn save<M: Model>(&self, instance: &mut M) -> ModelResult<()> {
        let descriptor = describe::<M>()?;

        // Millisecond precision, matching what the store retains.
        let now = bson::DateTime::now().to_chrono();

        let (id, payload) = to_document(instance, now)?;
        let created_at = instance
            .meta()
            .created_at()
            .unwrap_or(now);

        debug!(
            "saving document to `{}` (id: {:?})",
            descriptor.collection(),
            id
        );

        let assigned = self
            .client
            .put(descriptor.collection(), id.as_deref(), payload)
            .await?;

        instance
            .meta_mut()
            .assign(assigned, created_at, now);

        Ok(())
    }

    /// Point lookup by identity.
    ///
    /// A non-existent document yields `Ok(None)`, never an error.
    ///
    /// # Errors
    ///
    /// Surfaces store failures unmodified and returns
    /// [`ModelError::SchemaMismatch`] when the stored document does not fit
    /// the model's schema.
    pub async fn get<M: Model>(&self, id: &str) -> ModelResult<Option<M>> {
        let descriptor = describe::<M>()?;

        match self
            .client
            .fetch(descriptor.collection(), id)
            .await?
        {
            Some(payload) => Ok(Some(from_document::<M>(id, &payload)?)),
            None => Ok(None),
        }
    }

    /// Removes the instance's backing document.
    ///
    /// Deleting an already-absent document is a no-op. The in-memory
    /// instance keeps its identity but is stale afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotPersisted`] when the instance has never been
    /// saved; surfaces store failures unmodified.
    pub async fn delete<M: Model>(&self, instance: &M) -> ModelResult<()> {
        let descriptor = describe::<M>()?;

        let id = instance.meta().id().ok_or_else(|| {
            ModelError::NotPersisted(format!(
                "cannot delete an unsaved `{}` instance",
                descriptor.collection()
            ))
        })?;

        debug!("deleting document `{id}` from `{}`", descriptor.collection());

        self.client
            .remove(descriptor.collection(), id)
            .await
    }

    /// Builds the single-call convenience query without executing it.
    ///
    /// Composes through the same chain transitions as manual chaining, so
    /// the compiled form is identical by construction. Exposed separately so
    /// the equivalence can be asserted.
    ///
    /// # Errors
    ///
    /// Same validation errors as the corresponding chain calls.
    pub fn find_query<M: Model>(
        &self,
        filter: Option<(&str, FilterOp, Bson)>,
        order: &[&str],
        limit: Option<i64>,
    ) -> ModelResult<ModelQuery<'_, C, M>> {
        let mut query = self.query::<M>()?;

        if let Some((field, op, value)) = filter {
            query = query.filter(field, op, value)?;
        }

        for clause in order {
            query = query.order_by(clause)?;
        }

        if let Some(limit) = limit {
            query = query.limit(limit)?;
        }

        Ok(query)
    }

    /// Single-call convenience form of the chainable query.
    ///
    /// Accepts an optional filter predicate, an ordered sequence of order
    /// clauses (`-` prefix for descending), and an optional limit, and
    /// executes the resulting query.
    ///
    /// # Errors
    ///
    /// Same errors as the corresponding chain calls and
    /// [`ModelQuery::get`].
    pub async fn find<M: Model>(
        &self,
        filter: Option<(&str, FilterOp, Bson)>,
        order: &[&str],
        limit: Option<i64>,
    ) -> ModelResult<Vec<M>> {
        self.find_query::<M>(filter, order, limit)?
            .get()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::Meta,
        schema::{FieldKind, FieldSpec},
    };
    use bson::doc;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Note {
        #[serde(skip)]
        meta: Meta,
        title: String,
        body: Option<String>,
        stars: i64,
    }

    impl Model for Note {
        fn collection_name() -> &'static str {
            "notes"
        }

        fn fields() -> Vec<FieldSpec> {
            vec![
                FieldSpec::required("title", FieldKind::String),
                FieldSpec::optional("body", FieldKind::String),
                FieldSpec::required("stars", FieldKind::Integer),
            ]
        }

        fn meta(&self) -> &Meta {
            &self.meta
        }

        fn meta_mut(&mut self) -> &mut Meta {
            &mut self.meta
        }
    }

    fn note() -> Note {
        Note {
            meta: Meta::default(),
            title: "groceries".to_string(),
            body: None,
            stars: 3,
        }
    }

    #[test]
    fn unpersisted_instance_serializes_without_identity() {
        let now = bson::DateTime::now().to_chrono();
        let (id, payload) = to_document(&note(), now).unwrap();

        assert!(id.is_none());
        assert_eq!(payload.get_str("title").unwrap(), "groceries");
        assert_eq!(payload.get("body"), Some(&Bson::Null));
        assert_eq!(payload.get("stars"), Some(&Bson::Int64(3)));
        assert_eq!(
            payload.get(CREATED_AT_FIELD),
            Some(&Bson::DateTime(bson::DateTime::from_chrono(now)))
        );
        assert_eq!(
            payload.get(UPDATED_AT_FIELD),
            Some(&Bson::DateTime(bson::DateTime::from_chrono(now)))
        );
    }

    #[test]
    fn document_round_trip_restores_fields_and_meta() {
        let now = bson::DateTime::now().to_chrono();
        let (_, payload) = to_document(&note(), now).unwrap();

        let restored: Note = from_document("note-1", &payload).unwrap();

        assert_eq!(restored.title, "groceries");
        assert_eq!(restored.body, None);
        assert_eq!(restored.stars, 3);
        assert_eq!(restored.meta.id(), Some("note-1"));
        assert_eq!(restored.meta.created_at(), Some(now));
        assert_eq!(restored.meta.updated_at(), Some(now));
    }

    #[test]
    fn missing_required_field_fails_decoding() {
        let payload = doc! { "title": "orphan" };
        let err = from_document::<Note>("note-2", &payload).unwrap_err();
        assert!(matches!(err, ModelError::SchemaMismatch(_)));
    }

    #[test]
    fn incompatible_stored_type_fails_decoding() {
        let payload = doc! { "title": "bad", "stars": "three" };
        let err = from_document::<Note>("note-3", &payload).unwrap_err();
        assert!(matches!(err, ModelError::SchemaMismatch(_)));
    }

    #[test]
    fn string_timestamps_are_rejected() {
        let payload = doc! {
            "title": "bad",
            "stars": 1,
            "created_at": "2024-01-01T00:00:00Z",
        };
        let err = from_document::<Note>("note-4", &payload).unwrap_err();
        assert!(matches!(err, ModelError::SchemaMismatch(_)));
    }
}
