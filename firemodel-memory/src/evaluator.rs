//! Predicate evaluation and ordering for in-memory query execution.
//!
//! This module provides the evaluation engine the in-memory client uses to
//! filter documents against compiled predicates and to order result sets
//! with multi-key tie-breaking.

use std::{cmp::Ordering, collections::HashMap};

use bson::{Bson, Document, datetime::DateTime};

use firemodel_core::{
    query::{Direction, FilterOp, OrderClause, Predicate},
    schema::IDENTITY_FIELD,
};

/// Type-erased, comparable representation of BSON values.
///
/// Wraps BSON values for comparisons during filtering and sorting. All
/// numeric widths are normalized to f64 so integer and double fields compare
/// consistently.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (all integers and floats normalized to f64)
    Number(f64),
    /// DateTime value
    DateTime(DateTime),
    /// String value
    String(&'a str),
    /// Array of comparable values
    Array(Vec<Comparable<'a>>),
    /// Map/Object of comparable values
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr.iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>(),
            ),
            Bson::Document(doc) => Comparable::Map(
                doc.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>(),
            ),
            _ => Comparable::Null, // Other types are not comparable
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Resolves a field path on a stored row.
///
/// The row's identity is addressable as `id`; dotted paths descend into
/// nested documents.
fn lookup<'a>(id: &'a str, document: &'a Document, path: &str) -> Option<Comparable<'a>> {
    if path == IDENTITY_FIELD {
        return Some(Comparable::String(id));
    }

    let mut segments = path.split('.');
    let mut value = document.get(segments.next()?)?;

    for segment in segments {
        value = value.as_document()?.get(segment)?;
    }

    Some(Comparable::from(value))
}

/// Whether a row satisfies every predicate (conjunctive semantics).
pub(crate) fn matches_all(id: &str, document: &Document, predicates: &[Predicate]) -> bool {
    predicates
        .iter()
        .all(|predicate| matches(id, document, predicate))
}

/// Whether a row satisfies a single predicate.
///
/// A document lacking the predicate's field never matches, regardless of the
/// operator.
pub(crate) fn matches(id: &str, document: &Document, predicate: &Predicate) -> bool {
    let Some(left) = lookup(id, document, &predicate.field) else {
        return false;
    };

    let right = Comparable::from(&predicate.value);

    match predicate.op {
        FilterOp::Eq => left == right,
        FilterOp::Ne => left != right,
        FilterOp::Lt | FilterOp::Lte | FilterOp::Gt | FilterOp::Gte => {
            match left.partial_cmp(&right) {
                Some(ordering) => match predicate.op {
                    FilterOp::Lt => ordering == Ordering::Less,
                    FilterOp::Lte => ordering != Ordering::Greater,
                    FilterOp::Gt => ordering == Ordering::Greater,
                    FilterOp::Gte => ordering != Ordering::Less,
                    _ => unreachable!(),
                },
                None => false,
            }
        }
        FilterOp::In => match right {
            Comparable::Array(candidates) => candidates
                .iter()
                .any(|candidate| candidate == &left),
            _ => false,
        },
        FilterOp::NotIn => match right {
            Comparable::Array(candidates) => !candidates
                .iter()
                .any(|candidate| candidate == &left),
            _ => false,
        },
        FilterOp::ArrayContains => match &left {
            Comparable::Array(items) => items.iter().any(|item| item == &right),
            _ => false,
        },
        FilterOp::ArrayContainsAny => match (&left, &right) {
            (Comparable::Array(items), Comparable::Array(candidates)) => items
                .iter()
                .any(|item| candidates.iter().any(|candidate| candidate == item)),
            _ => false,
        },
    }
}

/// Compares two rows under the given ordering clauses.
///
/// Clauses are applied in declaration order; later clauses only break ties
/// left by earlier ones. Incomparable or missing values compare equal, so
/// they neither panic nor reorder.
pub(crate) fn compare(
    (a_id, a): (&str, &Document),
    (b_id, b): (&str, &Document),
    order: &[OrderClause],
) -> Ordering {
    for clause in order {
        let left = lookup(a_id, a, &clause.field).unwrap_or(Comparable::Null);
        let right = lookup(b_id, b, &clause.field).unwrap_or(Comparable::Null);

        let ordering = match clause.direction {
            Direction::Ascending => left.partial_cmp(&right),
            Direction::Descending => right.partial_cmp(&left),
        }
        .unwrap_or(Ordering::Equal);

        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}
