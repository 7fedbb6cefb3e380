#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing
)]

mod common;

use common::{deal_fields, eq};
use gridbase_core::{
    derive_default_values_from_filters, merge_filters, merge_view_defaults_with_quick_filters,
    FilterConfig, Operator,
};
use serde_json::json;

// ─── Three-tier precedence (base ≻ filter block ≻ temporary) ────────────────

#[test]
fn test_base_filter_survives_every_overlap() {
    let base = vec![eq("stage", json!("Won"))];
    let block = vec![eq("stage", json!("Lead")), eq("tags", json!("hot"))];
    let temp = vec![eq("stage", json!("Qualified")), eq("amount", json!(5))];

    let merged = merge_filters(&base, &block, &temp);

    let stage: Vec<&FilterConfig> = merged.iter().filter(|f| f.field == "stage").collect();
    assert_eq!(stage.len(), 1);
    assert_eq!(stage[0].value, json!("Won"));
    // Non-overlapping lower-tier fields still narrow.
    assert!(merged.iter().any(|f| f.field == "tags"));
    assert!(merged.iter().any(|f| f.field == "amount"));
}

#[test]
fn test_filter_block_tier_shields_temporary_tier() {
    let merged = merge_filters(
        &[],
        &[eq("tags", json!("hot"))],
        &[eq("tags", json!("east"))],
    );
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].value, json!("hot"));
}

#[test]
fn test_all_tiers_empty() {
    assert!(merge_filters(&[], &[], &[]).is_empty());
}

// ─── Quick-filter override (inverse precedence) ─────────────────────────────

#[test]
fn test_quick_filter_replaces_default_for_its_field_only() {
    let defaults = vec![eq("stage", json!("Lead")), eq("archived", json!(false))];
    let user = vec![eq("stage", json!("Won"))];

    let merged = merge_view_defaults_with_quick_filters(&defaults, &user);

    let stage: Vec<&FilterConfig> = merged.iter().filter(|f| f.field == "stage").collect();
    assert_eq!(stage.len(), 1);
    assert_eq!(stage[0].value, json!("Won"));
    assert!(merged
        .iter()
        .any(|f| f.field == "archived" && f.value == json!(false)));
}

#[test]
fn test_quick_filter_removes_every_default_condition_on_the_field() {
    let defaults = vec![
        FilterConfig::new("amount", Operator::GreaterThanOrEqual, json!(10)),
        FilterConfig::new("amount", Operator::LessThan, json!(100)),
    ];
    let user = vec![eq("amount", json!(42))];
    let merged = merge_view_defaults_with_quick_filters(&defaults, &user);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].operator, Operator::Equal);
}

#[test]
fn test_no_quick_filters_keeps_defaults_verbatim() {
    let defaults = vec![eq("stage", json!("Lead"))];
    assert_eq!(
        merge_view_defaults_with_quick_filters(&defaults, &[]),
        defaults
    );
}

// ─── Create-form default derivation ─────────────────────────────────────────

#[test]
fn test_conflicting_equality_filters_omit_the_field() {
    let filters = vec![eq("stage", json!("Lead")), eq("stage", json!("Won"))];
    let values = derive_default_values_from_filters(&filters, &[]);
    assert!(values.is_empty());
}

#[test]
fn test_qualifying_filters_prefill_the_form() {
    let filters = vec![
        eq("stage", json!("Lead")),
        eq("tags", json!(["hot"])),
        FilterConfig::new("amount", Operator::GreaterThan, json!(10)),
        eq("notes", json!(["a", "b"])),
    ];
    let values = derive_default_values_from_filters(&filters, &deal_fields());
    assert_eq!(values.get("stage"), Some(&json!("Lead")));
    assert_eq!(values.get("tags"), Some(&json!("hot")));
    assert!(!values.contains_key("amount"));
    assert!(!values.contains_key("notes"));
}

#[test]
fn test_computed_fields_never_prefill() {
    let filters = vec![eq("forecast", json!(900))];
    let values = derive_default_values_from_filters(&filters, &deal_fields());
    assert!(values.is_empty());
}
