//! Table metadata and the generic JSONB-backed row shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A user-defined table, as persisted in `tables`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMeta {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A generic record, as persisted in `table_rows`.
///
/// Cell values live in the `data` JSON object keyed by field name; the row
/// itself only carries identity and table ownership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl TableRow {
    #[must_use]
    pub fn new(id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            table_id: None,
            data,
        }
    }

    /// Cell value for a field, `Null` when absent.
    #[must_use]
    pub fn value(&self, field: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.data.get(field).unwrap_or(&NULL)
    }
}
