//! Query construction and compilation for model collections.
//!
//! This module provides the chainable, immutable query builder and the
//! store-native compiled form it produces.
//!
//! # Query building
//!
//! A query is built by chaining transitions on a [`ModelQuery`] obtained from
//! [`ModelStore::query`](crate::mapper::ModelStore::query). Every transition
//! takes `&self` and returns a *new* query value; the receiver is never
//! mutated, so a partially-built query can be reused across branches:
//!
//! ```ignore
//! let adults = store.query::<User>()?
//!     .filter("age", FilterOp::Gte, 18)?;
//!
//! // Both derive from `adults` without affecting it.
//! let newest = adults.order_by("-created_at")?.limit(10)?;
//! let named = adults.filter("name", FilterOp::Eq, "Alice")?;
//! ```
//!
//! # Validation
//!
//! Field names are checked against the model's entity descriptor and
//! predicate values against the field's declared type when the clause is
//! appended, so a bad query fails before any store round trip.
//!
//! # Compilation
//!
//! [`ModelQuery::get`] compiles the accumulated expression into a
//! [`CompiledQuery`] with a fixed clause order (filters, then ordering
//! clauses in declaration order, then offset, then limit) and executes it
//! through the store client.

use std::{marker::PhantomData, sync::Arc};

use bson::Bson;
use log::debug;

use crate::{
    client::StoreClient,
    codec,
    error::{ModelError, ModelResult},
    mapper::{ModelStore, from_document},
    model::Model,
    schema::{EntityDescriptor, FieldKind},
};

/// Filter comparison operators.
///
/// The allowed set is fixed; [`FilterOp::parse`] maps the store's operator
/// symbols onto it and rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Equal to.
    Eq,
    /// Not equal to.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal to.
    Lte,
    /// Greater than.
    Gt,
    /// Greater than or equal to.
    Gte,
    /// Field value is a member of the given array.
    In,
    /// Field value is not a member of the given array.
    NotIn,
    /// Array field contains the given value.
    ArrayContains,
    /// Array field contains at least one of the given values.
    ArrayContainsAny,
}

impl FilterOp {
    /// Parses a store operator symbol.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidArgument`] for symbols outside the
    /// supported set.
    pub fn parse(symbol: &str) -> ModelResult<Self> {
        match symbol {
            "==" => Ok(FilterOp::Eq),
            "!=" => Ok(FilterOp::Ne),
            "<" => Ok(FilterOp::Lt),
            "<=" => Ok(FilterOp::Lte),
            ">" => Ok(FilterOp::Gt),
            ">=" => Ok(FilterOp::Gte),
            "in" => Ok(FilterOp::In),
            "not-in" => Ok(FilterOp::NotIn),
            "array-contains" => Ok(FilterOp::ArrayContains),
            "array-contains-any" => Ok(FilterOp::ArrayContainsAny),
            other => Err(ModelError::InvalidArgument(format!(
                "unsupported filter operator `{other}`"
            ))),
        }
    }

    /// Returns the store operator symbol for this operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            FilterOp::Eq => "==",
            FilterOp::Ne => "!=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::In => "in",
            FilterOp::NotIn => "not-in",
            FilterOp::ArrayContains => "array-contains",
            FilterOp::ArrayContainsAny => "array-contains-any",
        }
    }
}

/// Ordering direction for a single order clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Ascending,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Descending,
}

/// A single validated filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// The declared field the predicate applies to.
    pub field: String,
    /// The comparison operator.
    pub op: FilterOp,
    /// The normalized comparison value.
    pub value: Bson,
}

/// A single ordering clause.
///
/// Clauses compose left to right: the first appended clause is the primary
/// sort key, later clauses break ties.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderClause {
    /// The declared field to order by.
    pub field: String,
    /// The ordering direction.
    pub direction: Direction,
}

/// An immutable, append-only accumulation of query clauses.
///
/// Predicates combine conjunctively (AND semantics only). Every mutation
/// method returns a new expression value, leaving the receiver untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryExpression {
    /// Filter predicates, combined with AND semantics.
    pub predicates: Vec<Predicate>,
    /// Ordering clauses in declaration order.
    pub order: Vec<OrderClause>,
    /// Optional result-count bound.
    pub limit: Option<usize>,
    /// Optional skip count applied before the limit.
    pub offset: Option<usize>,
}

impl QueryExpression {
    /// Creates an empty expression with no clauses or bounds.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_predicate(&self, predicate: Predicate) -> Self {
        let mut next = self.clone();
        next.predicates.push(predicate);
        next
    }

    fn with_order(&self, clause: OrderClause) -> Self {
        let mut next = self.clone();
        next.order.push(clause);
        next
    }

    fn with_limit(&self, limit: usize) -> Self {
        let mut next = self.clone();
        next.limit = Some(limit);
        next
    }

    fn with_offset(&self, offset: usize) -> Self {
        let mut next = self.clone();
        next.offset = Some(offset);
        next
    }

    /// Compiles the expression into its store-native form.
    ///
    /// Clause order is fixed: filters, then ordering clauses in declaration
    /// order, then offset, then limit.
    pub fn compile(&self) -> CompiledQuery {
        CompiledQuery {
            filters: self.predicates.clone(),
            order: self.order.clone(),
            offset: self.offset,
            limit: self.limit,
        }
    }
}

/// The store-native representation of a query, ready for execution.
///
/// Two queries that compile to equal `CompiledQuery` values have identical
/// execution semantics, which is what makes the chained and single-call
/// construction forms interchangeable.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// Conjunctive filter predicates.
    pub filters: Vec<Predicate>,
    /// Ordering clauses, primary key first.
    pub order: Vec<OrderClause>,
    /// Skip count applied before the limit.
    pub offset: Option<usize>,
    /// Result-count bound.
    pub limit: Option<usize>,
}

/// A chainable, immutable query over a model collection.
///
/// Obtained from [`ModelStore::query`](crate::mapper::ModelStore::query).
/// Each transition validates its clause against the entity descriptor and
/// returns a new query value; [`ModelQuery::get`] is the terminal operation.
#[derive(Debug)]
pub struct ModelQuery<'a, C: StoreClient, M: Model> {
    store: &'a ModelStore<C>,
    descriptor: Arc<EntityDescriptor>,
    expr: QueryExpression,
    _marker: PhantomData<M>,
}

impl<'a, C: StoreClient, M: Model> Clone for ModelQuery<'a, C, M> {
    fn clone(&self) -> Self {
        Self {
            store: self.store,
            descriptor: self.descriptor.clone(),
            expr: self.expr.clone(),
            _marker: PhantomData,
        }
    }
}

impl<'a, C: StoreClient, M: Model> ModelQuery<'a, C, M> {
    pub(crate) fn new(store: &'a ModelStore<C>, descriptor: Arc<EntityDescriptor>) -> Self {
        Self {
            store,
            descriptor,
            expr: QueryExpression::new(),
            _marker: PhantomData,
        }
    }

    fn derive(&self, expr: QueryExpression) -> Self {
        Self {
            store: self.store,
            descriptor: self.descriptor.clone(),
            expr,
            _marker: PhantomData,
        }
    }

    /// Returns the accumulated expression.
    pub fn expression(&self) -> &QueryExpression {
        &self.expr
    }

    /// Appends a filter predicate, returning a new query.
    ///
    /// The field must be declared by the model; the implicit `id`,
    /// `created_at`, and `updated_at` fields count as declared, and dotted
    /// paths reach into map fields. The value must be compatible with the
    /// field's type, except inside a map, where values are free-form. For
    /// [`FilterOp::In`] and [`FilterOp::NotIn`] the value must be an array
    /// whose elements match the field's type; for
    /// [`FilterOp::ArrayContains`] the field must be a list and the value
    /// must match its element type; for [`FilterOp::ArrayContainsAny`] the
    /// field must be a list and the value an array of its element type.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownField`] for undeclared fields,
    /// [`ModelError::InvalidArgument`] for a value shape the operator cannot
    /// accept, and [`ModelError::SchemaMismatch`] for values incompatible
    /// with the field's declared type. No store interaction takes place.
    pub fn filter(&self, field: &str, op: FilterOp, value: impl Into<Bson>) -> ModelResult<Self> {
        let kind = self.descriptor.query_kind(field)?;
        let value = value.into();

        let normalized = match op {
            FilterOp::In | FilterOp::NotIn => match value {
                Bson::Array(items) => Bson::Array(
                    items
                        .iter()
                        .map(|item| match &kind {
                            Some(kind) => codec::check(kind, field, item),
                            None => Ok(item.clone()),
                        })
                        .collect::<ModelResult<Vec<_>>>()?,
                ),
                _ => {
                    return Err(ModelError::InvalidArgument(format!(
                        "value for `{}` on field `{field}` must be an array",
                        op.symbol()
                    )));
                }
            },
            FilterOp::ArrayContains => match &kind {
                Some(FieldKind::List(element)) => codec::check(element, field, &value)?,
                Some(kind) => {
                    return Err(ModelError::InvalidArgument(format!(
                        "`array-contains` requires a list field, but `{field}` is {}",
                        kind.name()
                    )));
                }
                None => value,
            },
            FilterOp::ArrayContainsAny => match &kind {
                Some(FieldKind::List(element)) => match value {
                    Bson::Array(items) => Bson::Array(
                        items
                            .iter()
                            .map(|item| codec::check(element, field, item))
                            .collect::<ModelResult<Vec<_>>>()?,
                    ),
                    _ => {
                        return Err(ModelError::InvalidArgument(format!(
                            "value for `array-contains-any` on field `{field}` must be an array"
                        )));
                    }
                },
                Some(kind) => {
                    return Err(ModelError::InvalidArgument(format!(
                        "`array-contains-any` requires a list field, but `{field}` is {}",
                        kind.name()
                    )));
                }
                None => match value {
                    Bson::Array(_) => value,
                    _ => {
                        return Err(ModelError::InvalidArgument(format!(
                            "value for `array-contains-any` on field `{field}` must be an array"
                        )));
                    }
                },
            },
            _ => match &kind {
                Some(kind) => codec::check(kind, field, &value)?,
                None => value,
            },
        };

        Ok(self.derive(self.expr.with_predicate(Predicate {
            field: field.to_string(),
            op,
            value: normalized,
        })))
    }

    /// Appends an ordering clause, returning a new query.
    ///
    /// A leading `-` selects descending order (`"-age"`); clauses compose
    /// left to right, the first call being the primary sort key.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownField`] for undeclared fields.
    pub fn order_by(&self, field: &str) -> ModelResult<Self> {
        match field.strip_prefix('-') {
            Some(name) => self.sort(name, Direction::Descending),
            None => self.sort(field, Direction::Ascending),
        }
    }

    /// Appends an ordering clause with an explicit direction.
    ///
    /// The implicit `id`, `created_at`, and `updated_at` fields are
    /// orderable, as are dotted paths into map fields.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownField`] for undeclared fields.
    pub fn sort(&self, field: &str, direction: Direction) -> ModelResult<Self> {
        self.descriptor.query_kind(field)?;

        Ok(self.derive(self.expr.with_order(OrderClause {
            field: field.to_string(),
            direction,
        })))
    }

    /// Sets or overwrites the result-count bound, returning a new query.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidArgument`] for negative values.
    pub fn limit(&self, limit: i64) -> ModelResult<Self> {
        if limit < 0 {
            return Err(ModelError::InvalidArgument(format!(
                "limit must be non-negative, got {limit}"
            )));
        }

        Ok(self.derive(self.expr.with_limit(limit as usize)))
    }

    /// Sets or overwrites the skip count, returning a new query.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidArgument`] for negative values.
    pub fn offset(&self, offset: i64) -> ModelResult<Self> {
        if offset < 0 {
            return Err(ModelError::InvalidArgument(format!(
                "offset must be non-negative, got {offset}"
            )));
        }

        Ok(self.derive(self.expr.with_offset(offset as usize)))
    }

    /// Compiles the accumulated expression into its store-native form.
    pub fn compile(&self) -> CompiledQuery {
        self.expr.compile()
    }

    /// Executes the query and materializes the results.
    ///
    /// Compiles the expression, runs it through the store client in a single
    /// round trip, and maps every returned document back into a model
    /// instance. No matches yield an empty vector, not an error.
    ///
    /// # Errors
    ///
    /// Surfaces store failures unmodified and returns
    /// [`ModelError::SchemaMismatch`] when a returned document does not fit
    /// the model's schema.
    pub async fn get(&self) -> ModelResult<Vec<M>> {
        let compiled = self.compile();
        let collection = self.descriptor.collection();

        debug!(
            "querying collection `{collection}` with {} filter(s)",
            compiled.filters.len()
        );

        self.store
            .client()
            .query(collection, &compiled)
            .await?
            .into_iter()
            .map(|(id, payload)| from_document::<M>(&id, &payload))
            .collect()
    }
}
