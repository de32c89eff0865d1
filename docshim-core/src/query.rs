//! Query construction and filtering API for document stores.
//!
//! A [`Query`] is a conjunction of field filters, an optional ordering, and
//! offset/limit bounds. There is no disjunction: every filter must match.
//!
//! # Query Building
//!
//! ```ignore
//! use docshim_core::query::{Query, FieldOp, SortDirection};
//!
//! let query = Query::builder()
//!     .filter("status", FieldOp::Eq, "active")
//!     .filter("category", FieldOp::In, vec!["plumbing", "wiring"])
//!     .sort("createdAt", SortDirection::Desc)
//!     .limit(20)
//!     .build();
//! ```
//!
//! # Operators
//!
//! | Token            | [`FieldOp`]                   |
//! |------------------|-------------------------------|
//! | `==`             | [`FieldOp::Eq`]               |
//! | `!=`             | [`FieldOp::Ne`]               |
//! | `>` / `>=`       | [`FieldOp::Gt`] / [`FieldOp::Gte`] |
//! | `<` / `<=`       | [`FieldOp::Lt`] / [`FieldOp::Lte`] |
//! | `in`             | [`FieldOp::In`]               |
//! | `array-contains` | [`FieldOp::ArrayContains`]    |
//!
//! Any other token is rejected with [`DocumentStoreError::UnsupportedOperator`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    error::{DocumentStoreError, DocumentStoreResult},
    value::Value,
};

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    #[default]
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

/// Sort specification for query results.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    /// The field name to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

/// Field comparison operators for filter expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldOp {
    /// Equal to.
    #[serde(rename = "==")]
    Eq,
    /// Not equal to.
    #[serde(rename = "!=")]
    Ne,
    /// Greater than.
    #[serde(rename = ">")]
    Gt,
    /// Greater than or equal to.
    #[serde(rename = ">=")]
    Gte,
    /// Less than.
    #[serde(rename = "<")]
    Lt,
    /// Less than or equal to.
    #[serde(rename = "<=")]
    Lte,
    /// Field value equals one of the values in the given list.
    #[serde(rename = "in")]
    In,
    /// List-typed field has the given value as an element.
    #[serde(rename = "array-contains")]
    ArrayContains,
}

impl FieldOp {
    /// The operator's wire token.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldOp::Eq => "==",
            FieldOp::Ne => "!=",
            FieldOp::Gt => ">",
            FieldOp::Gte => ">=",
            FieldOp::Lt => "<",
            FieldOp::Lte => "<=",
            FieldOp::In => "in",
            FieldOp::ArrayContains => "array-contains",
        }
    }
}

impl fmt::Display for FieldOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldOp {
    type Err = DocumentStoreError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "==" => Ok(FieldOp::Eq),
            "!=" => Ok(FieldOp::Ne),
            ">" => Ok(FieldOp::Gt),
            ">=" => Ok(FieldOp::Gte),
            "<" => Ok(FieldOp::Lt),
            "<=" => Ok(FieldOp::Lte),
            "in" => Ok(FieldOp::In),
            "array-contains" => Ok(FieldOp::ArrayContains),
            other => Err(DocumentStoreError::UnsupportedOperator(other.to_string())),
        }
    }
}

/// Anything that names a filter operator: a typed [`FieldOp`] or a wire token.
pub trait IntoFieldOp {
    fn into_field_op(self) -> DocumentStoreResult<FieldOp>;
}

impl IntoFieldOp for FieldOp {
    fn into_field_op(self) -> DocumentStoreResult<FieldOp> {
        Ok(self)
    }
}

impl IntoFieldOp for &str {
    fn into_field_op(self) -> DocumentStoreResult<FieldOp> {
        self.parse()
    }
}

impl IntoFieldOp for String {
    fn into_field_op(self) -> DocumentStoreResult<FieldOp> {
        self.parse()
    }
}

/// One predicate of a query: `field <op> value`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    /// The field name to compare.
    pub field: String,
    /// The comparison operator.
    pub op: FieldOp,
    /// The value to compare against.
    pub value: Value,
}

impl FieldFilter {
    pub fn new(field: impl Into<String>, op: FieldOp, value: impl Into<Value>) -> Self {
        Self { field: field.into(), op, value: value.into() }
    }

    /// Checks that the operand fits the operator.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidQuery`] if the operand holds a sentinel,
    /// or if `in` is given anything but a list.
    pub fn validate(&self) -> DocumentStoreResult<()> {
        if self.value.contains_sentinel() {
            return Err(DocumentStoreError::InvalidQuery(format!(
                "sentinel values cannot be used to filter field '{}'",
                self.field
            )));
        }

        if self.op == FieldOp::In && self.value.as_list().is_none() {
            return Err(DocumentStoreError::InvalidQuery(format!(
                "'in' filter on field '{}' requires a list, got {}",
                self.field,
                self.value.type_name()
            )));
        }

        Ok(())
    }
}

/// A structured query for retrieving and filtering documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Filters that must all match.
    pub filters: Vec<FieldFilter>,
    /// Sort keys, most significant first.
    pub sort: Vec<Sort>,
    /// Maximum number of documents to return.
    pub limit: Option<usize>,
    /// Number of documents to skip after ordering.
    pub offset: Option<usize>,
}

impl Query {
    /// Creates a new empty query with no filters or limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new query builder for fluent construction.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }

    /// Validates every filter of this query.
    pub fn validate(&self) -> DocumentStoreResult<()> {
        self.filters
            .iter()
            .try_for_each(FieldFilter::validate)
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Creates a new query builder.
    pub fn new() -> Self {
        QueryBuilder { query: Query::default() }
    }

    /// Appends a filter. Filters are combined with logical AND.
    pub fn filter(mut self, field: impl Into<String>, op: FieldOp, value: impl Into<Value>) -> Self {
        self.query.filters.push(FieldFilter::new(field, op, value));
        self
    }

    /// Sets the maximum number of documents to return.
    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Sets the number of documents to skip.
    pub fn offset(mut self, offset: usize) -> Self {
        self.query.offset = Some(offset);
        self
    }

    /// Appends a sort key. The first key is the most significant.
    ///
    /// # Arguments
    ///
    /// * `field` - The field name to sort by
    /// * `direction` - The sort direction (ascending or descending)
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.query.sort.push(Sort { field: field.into(), direction });
        self
    }

    /// Builds and returns the final query.
    pub fn build(self) -> Query {
        self.query
    }
}

/// Walks the filters of a query. Backends implement this to evaluate or translate
/// queries into their native form.
pub trait QueryVisitor {
    type Output;
    type Error: Into<DocumentStoreError>;

    /// Combines the outcome of every filter (logical AND).
    fn visit_and(&mut self, filters: &[FieldFilter]) -> Result<Self::Output, Self::Error>;

    fn visit_filter(&mut self, filter: &FieldFilter) -> Result<Self::Output, Self::Error>;

    fn visit_query(&mut self, query: &Query) -> Result<Self::Output, Self::Error> {
        self.visit_and(&query.filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip_through_from_str() {
        for op in [
            FieldOp::Eq,
            FieldOp::Ne,
            FieldOp::Gt,
            FieldOp::Gte,
            FieldOp::Lt,
            FieldOp::Lte,
            FieldOp::In,
            FieldOp::ArrayContains,
        ] {
            assert_eq!(op.as_str().parse::<FieldOp>().unwrap(), op);
        }
    }

    #[test]
    fn unknown_tokens_are_unsupported() {
        for token in ["array-contains-any", "not-in", "=~", ""] {
            assert_eq!(
                token.into_field_op(),
                Err(DocumentStoreError::UnsupportedOperator(token.to_string()))
            );
        }
    }

    #[test]
    fn operators_deserialize_from_wire_tokens() {
        let op: FieldOp = serde_json::from_str("\"array-contains\"").unwrap();
        assert_eq!(op, FieldOp::ArrayContains);
        assert!(serde_json::from_str::<FieldOp>("\"like\"").is_err());
    }

    #[test]
    fn in_requires_a_list() {
        let query = Query::builder()
            .filter("status", FieldOp::In, "active")
            .build();

        assert!(matches!(query.validate(), Err(DocumentStoreError::InvalidQuery(_))));
    }

    #[test]
    fn sentinels_are_not_filter_values() {
        let filter = FieldFilter::new(
            "createdAt",
            FieldOp::Lt,
            crate::value::FieldValue::server_timestamp_now(),
        );

        assert!(matches!(filter.validate(), Err(DocumentStoreError::InvalidQuery(_))));
    }

    #[test]
    fn builder_keeps_sort_keys_in_call_order() {
        let query = Query::builder()
            .sort("priority", SortDirection::Desc)
            .sort("createdAt", SortDirection::Asc)
            .offset(5)
            .limit(10)
            .build();

        assert_eq!(query.sort[0].field, "priority");
        assert_eq!(query.sort[1].direction, SortDirection::Asc);
        assert_eq!((query.offset, query.limit), (Some(5), Some(10)));
    }
}
