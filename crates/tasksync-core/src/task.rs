//! Task data model
//!
//! A task is an `id` plus opaque remaining fields. The id is assigned by
//! the store at creation and denormalized onto the record, so every
//! persisted record carries an `id` equal to its storage key.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One task record
///
/// Fields other than `id` (title, description, ...) are opaque to the
/// sync core and round-trip untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Storage key, denormalized onto the record
    #[serde(default)]
    pub id: String,
    /// Opaque remaining fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl TaskRecord {
    /// Record with no id yet; the gateway assigns one at creation
    #[must_use]
    pub fn new(mut fields: Map<String, Value>) -> Self {
        // A stray "id" field would shadow the denormalized one.
        fields.remove("id");
        Self {
            id: String::new(),
            fields,
        }
    }

    /// Record bound to a storage key
    #[must_use]
    pub fn with_id(id: impl Into<String>, mut fields: Map<String, Value>) -> Self {
        fields.remove("id");
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Full JSON object as persisted, `id` included
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(self.fields.len() + 1);
        map.insert("id".to_string(), Value::String(self.id.clone()));
        for (key, value) in &self.fields {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }

    /// Decode a stored value read back at `key`
    ///
    /// The storage key is authoritative for the id: records written
    /// before ids were denormalized decode with the key filled in.
    ///
    /// # Errors
    /// When the stored value is not a JSON object.
    pub fn from_snapshot(key: &str, value: Value) -> Result<Self, serde_json::Error> {
        let mut record: Self = serde_json::from_value(value)?;
        record.id = key.to_string();
        Ok(record)
    }
}

/// Full collection snapshot: storage key to record, key-ordered
pub type TaskMap = BTreeMap<String, TaskRecord>;

/// Decode a collection snapshot
///
/// An absent subtree decodes to an empty map, never to an error.
///
/// # Errors
/// When the snapshot is present but not an object of objects.
pub fn decode_task_map(snapshot: Option<Value>) -> Result<TaskMap, serde_json::Error> {
    let Some(value) = snapshot else {
        return Ok(TaskMap::new());
    };
    let Value::Object(entries) = value else {
        return Err(serde::de::Error::custom("task collection is not an object"));
    };
    let mut tasks = TaskMap::new();
    for (key, value) in entries {
        let record = TaskRecord::from_snapshot(&key, value)?;
        tasks.insert(key, record);
    }
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn to_value_flattens_id_and_fields() {
        let mut fields = Map::new();
        fields.insert("title".to_string(), json!("laundry"));
        let record = TaskRecord::with_id("t1", fields);

        assert_eq!(record.to_value(), json!({"id": "t1", "title": "laundry"}));
    }

    #[test]
    fn constructor_strips_stray_id_field() {
        let mut fields = Map::new();
        fields.insert("id".to_string(), json!("impostor"));
        fields.insert("title".to_string(), json!("x"));

        let record = TaskRecord::with_id("t1", fields);
        assert_eq!(record.id, "t1");
        assert!(!record.fields.contains_key("id"));
    }

    #[test]
    fn from_snapshot_key_is_authoritative() {
        let record =
            TaskRecord::from_snapshot("t2", json!({"id": "stale", "title": "x"})).unwrap();
        assert_eq!(record.id, "t2");
        assert_eq!(record.fields["title"], json!("x"));
    }

    #[test]
    fn from_snapshot_fills_missing_id() {
        let record = TaskRecord::from_snapshot("t3", json!({"title": "x"})).unwrap();
        assert_eq!(record.id, "t3");
    }

    #[test]
    fn from_snapshot_rejects_non_object() {
        assert!(TaskRecord::from_snapshot("t", json!("scalar")).is_err());
    }

    #[test]
    fn decode_absent_collection_is_empty_map() {
        let tasks = decode_task_map(None).unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn decode_collection_round_trip() {
        let tasks = decode_task_map(Some(json!({
            "a": {"id": "a", "title": "first"},
            "b": {"id": "b", "title": "second"},
        })))
        .unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks["a"].fields["title"], json!("first"));
        assert_eq!(tasks["b"].id, "b");
    }

    #[test]
    fn decode_rejects_scalar_collection() {
        assert!(decode_task_map(Some(json!(42))).is_err());
    }
}
