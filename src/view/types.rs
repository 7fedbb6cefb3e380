//! Persisted view row shapes: `views`, `view_sorts`, `view_fields`, and
//! `grid_view_settings`.

use serde::{Deserialize, Serialize};

/// The five view renderings a table supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Grid,
    Kanban,
    Gallery,
    Calendar,
    Timeline,
}

/// A persisted view (`views`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub id: String,
    pub table_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ViewKind,
    #[serde(default)]
    pub order_index: i32,
}

/// Sort direction for a view sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub fn is_ascending(self) -> bool {
        self == SortDirection::Asc
    }
}

/// A persisted sort key (`view_sorts`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSort {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_id: Option<String>,
    pub field_name: String,
    pub direction: SortDirection,
    #[serde(default)]
    pub order_index: i32,
}

impl ViewSort {
    #[must_use]
    pub fn new(field_name: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            id: None,
            view_id: None,
            field_name: field_name.into(),
            direction,
            order_index: 0,
        }
    }
}

/// Per-view field visibility and ordering (`view_fields`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewField {
    pub view_id: String,
    pub field_name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub order_index: i32,
}

fn default_visible() -> bool {
    true
}

/// Grid-specific presentation settings (`grid_view_settings`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridViewSettings {
    pub view_id: String,
    #[serde(default = "default_row_height")]
    pub row_height: String,
    #[serde(default)]
    pub wrap_text: bool,
    #[serde(default)]
    pub frozen_columns: i32,
}

fn default_row_height() -> String {
    "short".to_string()
}
