//! Point-in-time read results.

use serde::de::DeserializeOwned;

use crate::{
    error::DocumentStoreResult,
    value::{Fields, Value, from_fields},
};

/// An owned copy of one document as it was when it was read.
///
/// A snapshot never aliases the stored document: later writes to the store do not
/// change it, and changing the data taken out of it does not change the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    id: String,
    data: Option<Fields>,
}

impl Snapshot {
    /// A snapshot of an existing document.
    pub fn found(id: impl Into<String>, data: Fields) -> Self {
        Self { id: id.into(), data: Some(data) }
    }

    /// A snapshot of a document that does not exist.
    pub fn missing(id: impl Into<String>) -> Self {
        Self { id: id.into(), data: None }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the document existed at the moment of the read.
    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    /// Returns a copy of the document's fields, or `None` if it did not exist.
    pub fn data(&self) -> Option<Fields> {
        self.data.clone()
    }

    /// Consumes the snapshot, returning its fields without copying.
    pub fn into_data(self) -> Option<Fields> {
        self.data
    }

    /// Returns a single top-level field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.as_ref()?.get(field)
    }

    /// Deserializes the document into `T`, or returns `None` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the fields do not fit `T`.
    pub fn data_as<T: DeserializeOwned>(&self) -> DocumentStoreResult<Option<T>> {
        self.data.as_ref().map(from_fields::<T>).transpose()
    }

    /// Renders the document as a JSON object (`null` if it did not exist).
    pub fn to_json(&self) -> DocumentStoreResult<serde_json::Value> {
        match &self.data {
            Some(fields) => Ok(serde_json::to_value(fields)?),
            None => Ok(serde_json::Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;

    #[test]
    fn data_is_a_detached_copy() {
        let snapshot = Snapshot::found("u1", fields! { "name" => "Wanjiru" });

        let mut copy = snapshot.data().unwrap();
        copy.insert("name".into(), Value::from("changed"));

        assert_eq!(snapshot.get("name"), Some(&Value::from("Wanjiru")));
    }

    #[test]
    fn missing_snapshot_has_no_data() {
        let snapshot = Snapshot::missing("ghost");

        assert!(!snapshot.exists());
        assert_eq!(snapshot.data(), None);
        assert_eq!(snapshot.to_json().unwrap(), serde_json::Value::Null);
        assert_eq!(snapshot.data_as::<serde_json::Value>().unwrap(), None);
    }
}
