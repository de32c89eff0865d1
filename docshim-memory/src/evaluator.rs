//! Query expression evaluation for in-memory document filtering.
//!
//! This module matches stored documents against query filters and orders the
//! matches, following the managed database's comparison rules:
//!
//! - integers and doubles compare numerically (`1 == 1.0`)
//! - range operators only match values of the same type class
//! - a document without the filtered field never matches, whatever the operator
//! - ordering across types follows null < boolean < number < timestamp < string < list < map

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use docshim_core::{
    error::{DocumentStoreError, DocumentStoreResult},
    query::{FieldFilter, FieldOp, Query, QueryVisitor, Sort, SortDirection},
    snapshot::Snapshot,
    value::{Fields, Number, Value},
};

/// Borrowed, comparable view of a [`Value`].
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(Number),
    Timestamp(&'a DateTime<Utc>),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    Map(Vec<(&'a str, Comparable<'a>)>),
}

impl<'a> From<&'a Value> for Comparable<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => Comparable::Null,
            Value::Boolean(value) => Comparable::Bool(*value),
            Value::Integer(value) => Comparable::Number(Number::Integer(*value)),
            Value::Double(value) => Comparable::Number(Number::Double(*value)),
            Value::Timestamp(value) => Comparable::Timestamp(value),
            Value::String(value) => Comparable::String(value),
            Value::List(values) => Comparable::Array(values.iter().map(Comparable::from).collect()),
            // BTreeMap iteration is sorted by key, so maps compare key by key
            Value::Map(fields) => Comparable::Map(
                fields
                    .iter()
                    .map(|(key, value)| (key.as_str(), Comparable::from(value)))
                    .collect(),
            ),
            // Sentinels are resolved before storage and rejected as filter operands
            Value::Sentinel(_) => Comparable::Null,
        }
    }
}

impl Comparable<'_> {
    fn type_rank(&self) -> u8 {
        match self {
            Comparable::Null => 0,
            Comparable::Bool(_) => 1,
            Comparable::Number(_) => 2,
            Comparable::Timestamp(_) => 3,
            Comparable::String(_) => 4,
            Comparable::Array(_) => 5,
            Comparable::Map(_) => 6,
        }
    }

    /// Total order used for sorting results.
    pub(crate) fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => Ordering::Equal,
            (Comparable::Bool(a), Comparable::Bool(b)) => a.cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => total_cmp_numbers(*a, *b),
            (Comparable::Timestamp(a), Comparable::Timestamp(b)) => a.cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.cmp(b),
            (Comparable::Array(a), Comparable::Array(b)) => a
                .iter()
                .zip(b.iter())
                .map(|(left, right)| left.total_cmp(right))
                .find(|ordering| ordering.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            (Comparable::Map(a), Comparable::Map(b)) => a
                .iter()
                .zip(b.iter())
                .map(|((left_key, left), (right_key, right))| {
                    left_key.cmp(right_key).then_with(|| left.total_cmp(right))
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

fn numbers_eq(a: Number, b: Number) -> bool {
    match (a, b) {
        (Number::Integer(a), Number::Integer(b)) => a == b,
        (a, b) => a.as_f64() == b.as_f64(),
    }
}

fn partial_cmp_numbers(a: Number, b: Number) -> Option<Ordering> {
    match (a, b) {
        (Number::Integer(a), Number::Integer(b)) => Some(a.cmp(&b)),
        (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
    }
}

/// NaN sorts before every other number.
fn total_cmp_numbers(a: Number, b: Number) -> Ordering {
    match (a.as_f64().is_nan(), b.as_f64().is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => partial_cmp_numbers(a, b).unwrap_or(Ordering::Equal),
    }
}

impl PartialEq for Comparable<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => numbers_eq(*a, *b),
            (Comparable::Timestamp(a), Comparable::Timestamp(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialOrd for Comparable<'_> {
    /// Only values of the same type class are ordered; anything else is unordered
    /// so range filters never match across types.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => partial_cmp_numbers(*a, *b),
            (Comparable::Timestamp(a), Comparable::Timestamp(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Fields,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Fields) -> Self {
        Self { document }
    }

    pub fn evaluate(&mut self, query: &Query) -> DocumentStoreResult<bool> {
        self.visit_query(query)
    }

    /// Filters, orders and bounds `documents` according to `query`, returning owned
    /// snapshots. Documents are only cloned once they are part of the result.
    ///
    /// Ties in ordering keep the input order.
    pub fn run_query(
        documents: impl IntoIterator<Item = (&'a String, &'a Fields)>,
        query: &Query,
    ) -> DocumentStoreResult<Vec<Snapshot>> {
        let mut matched = Vec::new();

        for (id, document) in documents {
            if DocumentEvaluator::new(document).evaluate(query)? {
                matched.push((id, document));
            }
        }

        if !query.sort.is_empty() {
            // Ordering on a field drops documents that do not have it
            matched.retain(|(_, document)| {
                query
                    .sort
                    .iter()
                    .all(|sort| document.contains_key(&sort.field))
            });
            matched.sort_by(|(_, left), (_, right)| compare_by(&query.sort, left, right));
        }

        Ok(matched
            .into_iter()
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .map(|(id, document)| Snapshot::found(id.clone(), document.clone()))
            .collect())
    }
}

fn compare_by(sort: &[Sort], left: &Fields, right: &Fields) -> Ordering {
    sort.iter()
        .map(|sort| {
            let ordering = match (left.get(&sort.field), right.get(&sort.field)) {
                (Some(left), Some(right)) => {
                    Comparable::from(left).total_cmp(&Comparable::from(right))
                }
                _ => Ordering::Equal,
            };

            match sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

impl QueryVisitor for DocumentEvaluator<'_> {
    type Output = bool;
    type Error = DocumentStoreError;

    fn visit_and(&mut self, filters: &[FieldFilter]) -> Result<Self::Output, Self::Error> {
        for filter in filters {
            if !self.visit_filter(filter)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_filter(&mut self, filter: &FieldFilter) -> Result<Self::Output, Self::Error> {
        let Some(field_value) = self.document.get(&filter.field) else {
            return Ok(false);
        };

        let left = Comparable::from(field_value);
        let right = Comparable::from(&filter.value);

        Ok(match filter.op {
            FieldOp::Eq => left == right,
            FieldOp::Ne => left != right,
            FieldOp::Gt => left.partial_cmp(&right) == Some(Ordering::Greater),
            FieldOp::Gte => matches!(
                left.partial_cmp(&right),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FieldOp::Lt => left.partial_cmp(&right) == Some(Ordering::Less),
            FieldOp::Lte => matches!(
                left.partial_cmp(&right),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FieldOp::In => match right {
                Comparable::Array(candidates) => candidates.iter().any(|candidate| candidate == &left),
                _ => {
                    return Err(DocumentStoreError::InvalidQuery(format!(
                        "'in' filter on field '{}' requires a list",
                        filter.field
                    )));
                }
            },
            FieldOp::ArrayContains => match left {
                Comparable::Array(items) => items.iter().any(|item| item == &right),
                _ => false,
            },
        })
    }
}
