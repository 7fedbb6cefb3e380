//! Per-block-type config validation and normalization.
//!
//! Block configs arrive as untyped JSON dictionaries edited by end users, so
//! each type carries a minimal required-field set checked at the boundary.
//! Invalid configs are never thrown across the component boundary: the block
//! falls back to its type-specific default (plus a developer-facing warning)
//! and renders an empty state.

use serde_json::{json, Map, Value};
use tracing::warn;

use super::block::BlockType;

/// Result of validating one block config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    fn invalid(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }
}

/// Validate a block config against its type's required-field set.
#[must_use]
pub fn validate_block_config(block_type: BlockType, config: &Value) -> ValidationReport {
    let Some(object) = config.as_object() else {
        return ValidationReport::invalid(vec![format!(
            "{block_type} config must be an object"
        )]);
    };

    let mut errors = Vec::new();
    match block_type {
        BlockType::Grid => {
            // A grid is fed either directly from a table or through a saved view.
            if !has_field(object, "table_id") && !has_field(object, "source_view") {
                errors.push("grid requires table_id or source_view".to_string());
            }
        }
        BlockType::Chart => {
            require(object, "table_id", block_type, &mut errors);
            require(object, "chart_type", block_type, &mut errors);
        }
        BlockType::Kpi => {
            require(object, "table_id", block_type, &mut errors);
            require(object, "kpi_aggregate", block_type, &mut errors);
        }
        BlockType::Form | BlockType::Filter | BlockType::Record => {
            require(object, "table_id", block_type, &mut errors);
        }
        BlockType::Text => {
            require(object, "content_json", block_type, &mut errors);
            // Legacy rows sometimes hold a bare string here; the rich-text
            // renderer needs the document shape.
            if matches!(object.get("content_json"), Some(v) if !v.is_null() && !v.is_object()) {
                errors.push("text content_json must be a rich-text document".to_string());
            }
        }
        BlockType::Field => {
            require(object, "table_id", block_type, &mut errors);
            require(object, "field_name", block_type, &mut errors);
        }
        BlockType::Action => {
            require(object, "action_type", block_type, &mut errors);
            require(object, "label", block_type, &mut errors);
            validate_action_subtype(object, &mut errors);
        }
    }

    if errors.is_empty() {
        ValidationReport::ok()
    } else {
        ValidationReport::invalid(errors)
    }
}

/// Each action sub-type needs its own payload on top of `action_type` + `label`.
fn validate_action_subtype(object: &Map<String, Value>, errors: &mut Vec<String>) {
    match object.get("action_type").and_then(Value::as_str) {
        Some("open_url") => {
            if !has_field(object, "url") {
                errors.push("open_url action requires url".to_string());
            }
        }
        Some("open_page") => {
            if !has_field(object, "page_id") {
                errors.push("open_page action requires page_id".to_string());
            }
        }
        Some("create_record") => {
            if !has_field(object, "table_id") {
                errors.push("create_record action requires table_id".to_string());
            }
        }
        // Unknown sub-types only need the common fields; new sub-types must
        // not invalidate configs saved by newer builders.
        _ => {}
    }
}

fn require(object: &Map<String, Value>, field: &str, block_type: BlockType, errors: &mut Vec<String>) {
    if !has_field(object, field) {
        errors.push(format!("{block_type} requires {field}"));
    }
}

fn has_field(object: &Map<String, Value>, field: &str) -> bool {
    match object.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Return the config unchanged when valid, otherwise the type's minimal
/// default.
///
/// The `text` type is special-cased: its `content_json` payload is user
/// content that cannot be regenerated, so it survives normalization even when
/// the rest of the config is invalid.
#[must_use]
pub fn normalize_block_config(block_type: BlockType, config: &Value) -> Value {
    let report = validate_block_config(block_type, config);
    if report.valid {
        return config.clone();
    }
    warn!(
        block_type = %block_type,
        errors = ?report.errors,
        "invalid block config; substituting default"
    );

    let mut normalized = default_block_config(block_type);
    if block_type == BlockType::Text {
        if let Some(content) = config.get("content_json") {
            if let Some(object) = normalized.as_object_mut() {
                object.insert("content_json".to_string(), content.clone());
            }
        }
    }
    normalized
}

/// Type-specific minimal default config (the "unconfigured" empty state).
#[must_use]
pub fn default_block_config(block_type: BlockType) -> Value {
    match block_type {
        BlockType::Grid => json!({ "table_id": null, "source_view": null }),
        BlockType::Chart => json!({ "table_id": null, "chart_type": "bar" }),
        BlockType::Kpi => json!({ "table_id": null, "kpi_aggregate": "count" }),
        BlockType::Form => json!({ "table_id": null }),
        BlockType::Filter => json!({ "table_id": null, "target_blocks": "all" }),
        BlockType::Record => json!({ "table_id": null, "record_id": null }),
        BlockType::Text => json!({ "content_json": { "type": "doc", "content": [] } }),
        BlockType::Field => json!({ "table_id": null, "field_name": null }),
        BlockType::Action => json!({ "action_type": "open_url", "label": "New action", "url": "" }),
    }
}
