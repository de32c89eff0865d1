//! The write-commit routine: applies one write to one document and resolves sentinels.
//!
//! Every write in the in-memory store goes through [`commit`], under the owning
//! collection's write lock, so sentinel resolution always sees the value that is
//! stored at the moment the write lands.

use chrono::{DateTime, Utc};

use docshim_core::{
    backend::SetOptions,
    error::{DocumentStoreError, DocumentStoreResult},
    value::{Fields, Number, Sentinel, Value},
};

/// Computes the stored document that results from writing `fields` over `existing`.
///
/// - Without merge the result holds exactly the written fields.
/// - With merge each written top-level field replaces the stored one; other stored
///   fields are kept. Nested maps are replaced whole.
/// - A server-timestamp sentinel becomes `now`. An increment becomes the stored
///   numeric value at the same path (0 if missing or not numeric) plus the delta.
///
/// # Errors
///
/// Returns [`DocumentStoreError::InvalidDocument`] if a sentinel sits inside a list.
/// `existing` is never modified, so a failed write leaves the document as it was.
pub(crate) fn commit(
    existing: Option<&Fields>,
    fields: Fields,
    options: SetOptions,
    now: DateTime<Utc>,
) -> DocumentStoreResult<Fields> {
    let resolved = resolve_fields(fields, existing, now, "")?;

    if !options.merge {
        return Ok(resolved);
    }

    let mut merged = existing.cloned().unwrap_or_default();
    merged.extend(resolved);

    Ok(merged)
}

fn resolve_fields(
    fields: Fields,
    prior: Option<&Fields>,
    now: DateTime<Utc>,
    path: &str,
) -> DocumentStoreResult<Fields> {
    fields
        .into_iter()
        .map(|(key, value)| {
            let field_path = if path.is_empty() { key.clone() } else { format!("{path}.{key}") };
            let prior_value = prior.and_then(|prior| prior.get(&key));
            let value = resolve_value(value, prior_value, now, &field_path)?;

            Ok((key, value))
        })
        .collect()
}

fn resolve_value(
    value: Value,
    prior: Option<&Value>,
    now: DateTime<Utc>,
    path: &str,
) -> DocumentStoreResult<Value> {
    match value {
        Value::Sentinel(Sentinel::ServerTimestamp) => Ok(Value::Timestamp(now)),
        Value::Sentinel(Sentinel::Increment(delta)) => {
            let base = prior
                .and_then(Value::as_number)
                .unwrap_or(Number::Integer(0));

            Ok(base.add(delta).into())
        }
        Value::Map(fields) => Ok(Value::Map(resolve_fields(
            fields,
            prior.and_then(Value::as_map),
            now,
            path,
        )?)),
        Value::List(values) if values.iter().any(Value::contains_sentinel) => {
            Err(DocumentStoreError::InvalidDocument(format!(
                "sentinel values are not allowed inside lists (field '{path}')"
            )))
        }
        other => Ok(other),
    }
}
