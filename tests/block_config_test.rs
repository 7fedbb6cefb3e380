#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing
)]

use gridbase_core::{
    default_block_config, effective_block_sizing, normalize_block_config, validate_block_config,
    Block, BlockSizing, BlockType, LayoutError,
};
use serde_json::json;

#[test]
fn test_required_fields_per_type() {
    assert!(validate_block_config(BlockType::Grid, &json!({"source_view": "v1"})).valid);
    assert!(!validate_block_config(BlockType::Grid, &json!({"title": "x"})).valid);

    assert!(
        validate_block_config(
            BlockType::Chart,
            &json!({"table_id": "deals", "chart_type": "line"})
        )
        .valid
    );
    assert!(!validate_block_config(BlockType::Chart, &json!({"chart_type": "line"})).valid);

    assert!(
        validate_block_config(
            BlockType::Kpi,
            &json!({"table_id": "deals", "kpi_aggregate": "sum"})
        )
        .valid
    );
    assert!(
        validate_block_config(
            BlockType::Field,
            &json!({"table_id": "deals", "field_name": "amount"})
        )
        .valid
    );
    assert!(!validate_block_config(BlockType::Field, &json!({"table_id": "deals"})).valid);
}

#[test]
fn test_action_subtypes() {
    assert!(
        validate_block_config(
            BlockType::Action,
            &json!({"action_type": "open_url", "label": "Docs", "url": "https://example.com"})
        )
        .valid
    );
    assert!(
        !validate_block_config(
            BlockType::Action,
            &json!({"action_type": "open_url", "label": "Docs"})
        )
        .valid
    );
    assert!(
        !validate_block_config(
            BlockType::Action,
            &json!({"action_type": "create_record", "label": "Add"})
        )
        .valid
    );
}

#[test]
fn test_invalid_config_normalizes_to_type_default() {
    let normalized = normalize_block_config(BlockType::Kpi, &json!({"title": "Revenue"}));
    assert_eq!(normalized, default_block_config(BlockType::Kpi));
}

#[test]
fn test_valid_config_passes_through_untouched() {
    let config = json!({"table_id": "deals", "kpi_aggregate": "sum", "color": "green"});
    assert_eq!(normalize_block_config(BlockType::Kpi, &config), config);
}

#[test]
fn test_text_content_is_never_dropped() {
    // A rich-text document with an otherwise broken config shape.
    let content = json!({"type": "doc", "content": [{"type": "heading", "level": 2}]});
    let normalized = normalize_block_config(BlockType::Text, &json!({"content_json": content}));
    assert_eq!(normalized.get("content_json"), Some(&content));

    // Even a legacy bare-string payload survives the default substitution.
    let legacy = json!({"content_json": "typed by a user"});
    assert!(!validate_block_config(BlockType::Text, &legacy).valid);
    let normalized = normalize_block_config(BlockType::Text, &legacy);
    assert_eq!(
        normalized.get("content_json"),
        Some(&json!("typed by a user"))
    );
}

#[test]
fn test_fill_sizing_is_always_collapsed() {
    for block_type in [
        BlockType::Grid,
        BlockType::Chart,
        BlockType::Kpi,
        BlockType::Form,
        BlockType::Filter,
        BlockType::Record,
        BlockType::Text,
        BlockType::Field,
        BlockType::Action,
    ] {
        assert_eq!(
            effective_block_sizing(block_type, BlockSizing::Fill),
            BlockSizing::Content
        );
        assert_eq!(
            effective_block_sizing(block_type, BlockSizing::Content),
            BlockSizing::Content
        );
    }
}

#[test]
fn test_partial_position_is_the_one_fatal_case() {
    let block: Block = serde_json::from_value(json!({
        "id": "b1",
        "page_id": "p1",
        "type": "text",
        "config": {"content_json": {"type": "doc", "content": []}},
        "x": 3, "y": null, "w": 4, "h": null
    }))
    .expect("row shape should deserialize");

    assert_eq!(
        block.placement(),
        Err(LayoutError::PartialPosition {
            block_id: "b1".to_string()
        })
    );

    let unplaced: Block = serde_json::from_value(json!({
        "id": "b2",
        "page_id": "p1",
        "type": "grid",
        "config": {"table_id": "deals"}
    }))
    .expect("row shape should deserialize");
    assert_eq!(unplaced.placement(), Ok(None));
}
