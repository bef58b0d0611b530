//! Field-level conversion between declared model types and store values.
//!
//! The codec is the bidirectional bridge between a field's declared
//! [`FieldKind`](crate::schema::FieldKind) and the BSON value held by the
//! store. Encoding and decoding are symmetric: every value accepted by
//! [`encode`] round-trips through [`decode`] unchanged.
//!
//! Integers are normalized to 64 bits and floats to doubles, so the two
//! possible BSON widths never leak into comparisons. Timestamps stay native
//! datetime values (never strings), preserving chronological ordering under
//! sort. A store value whose type does not match the declared kind is a
//! [`ModelError::SchemaMismatch`]; the codec never coerces silently, with the
//! single exception of widening integers into declared float fields.

use bson::Bson;

use crate::{
    error::{ModelError, ModelResult},
    schema::{FieldKind, FieldSpec},
};

/// Encodes a model field value into its store representation.
///
/// `value` is the field's entry in the serialized instance, or `None` when
/// the instance does not carry the field. Absent optional fields encode to
/// their declared default, or null when no default is attached.
///
/// # Errors
///
/// Returns [`ModelError::SchemaMismatch`] when a required field is absent or
/// the value's type is incompatible with the declared kind.
pub fn encode(spec: &FieldSpec, value: Option<&Bson>) -> ModelResult<Bson> {
    convert(spec, value)
}

/// Decodes a stored value back into the field's normalized representation.
///
/// `value` is the field's entry in the stored document, or `None` when the
/// document lacks the key. Absent optional fields decode to their declared
/// default, or null when no default is attached.
///
/// # Errors
///
/// Returns [`ModelError::SchemaMismatch`] when a required field is absent
/// from the document or the stored type is incompatible with the declared
/// kind.
pub fn decode(spec: &FieldSpec, value: Option<&Bson>) -> ModelResult<Bson> {
    convert(spec, value)
}

/// Validates a caller-supplied value against a declared kind and returns the
/// normalized store representation.
///
/// Used by the query builder to reject predicate values that could never
/// match the field, before any store round trip.
///
/// # Errors
///
/// Returns [`ModelError::SchemaMismatch`] when the value's type is
/// incompatible with the declared kind.
pub fn check(kind: &FieldKind, field: &str, value: &Bson) -> ModelResult<Bson> {
    check_kind(kind, field, value)
}

fn convert(spec: &FieldSpec, value: Option<&Bson>) -> ModelResult<Bson> {
    match value {
        Some(Bson::Null) | None => {
            if let Some(default) = &spec.default {
                return Ok(default.clone());
            }

            if spec.optional {
                return Ok(Bson::Null);
            }

            Err(ModelError::SchemaMismatch(format!(
                "required field `{}` is missing",
                spec.name
            )))
        }
        Some(value) => check_kind(&spec.kind, &spec.name, value),
    }
}

fn check_kind(kind: &FieldKind, field: &str, value: &Bson) -> ModelResult<Bson> {
    match (kind, value) {
        (FieldKind::String, Bson::String(s)) => Ok(Bson::String(s.clone())),
        (FieldKind::Integer, Bson::Int32(n)) => Ok(Bson::Int64(*n as i64)),
        (FieldKind::Integer, Bson::Int64(n)) => Ok(Bson::Int64(*n)),
        (FieldKind::Float, Bson::Double(f)) => Ok(Bson::Double(*f)),
        // Integers widen losslessly into declared float fields.
        (FieldKind::Float, Bson::Int32(n)) => Ok(Bson::Double(*n as f64)),
        (FieldKind::Float, Bson::Int64(n)) => Ok(Bson::Double(*n as f64)),
        (FieldKind::Boolean, Bson::Boolean(b)) => Ok(Bson::Boolean(*b)),
        (FieldKind::Timestamp, Bson::DateTime(ts)) => Ok(Bson::DateTime(*ts)),
        (FieldKind::List(element), Bson::Array(items)) => Ok(Bson::Array(
            items
                .iter()
                .map(|item| check_kind(element, field, item))
                .collect::<ModelResult<Vec<_>>>()?,
        )),
        (FieldKind::Map, Bson::Document(doc)) => Ok(Bson::Document(doc.clone())),
        (kind, value) => Err(ModelError::SchemaMismatch(format!(
            "field `{field}` declared as {} but value is {}",
            kind.name(),
            type_name(value)
        ))),
    }
}

fn type_name(value: &Bson) -> &'static str {
    match value {
        Bson::Double(_) => "double",
        Bson::String(_) => "string",
        Bson::Array(_) => "array",
        Bson::Document(_) => "document",
        Bson::Boolean(_) => "boolean",
        Bson::Null => "null",
        Bson::Int32(_) => "int32",
        Bson::Int64(_) => "int64",
        Bson::DateTime(_) => "datetime",
        _ => "unsupported",
    }
}
