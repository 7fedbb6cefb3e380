//! Precedence rules for combining filters from different sources.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::schema::{find_field, FieldMeta};

use super::model::{FilterConfig, Operator};

/// Combine filters from the three runtime sources under strict precedence.
///
/// Base filters are the block's hard-coded narrowing and are always included;
/// a filter-block filter is added only when no base filter already targets
/// its field; a temporary (search/UI) filter is added only when neither of
/// the higher tiers targets its field. Lower tiers narrow further, they never
/// override.
#[must_use]
pub fn merge_filters(
    base: &[FilterConfig],
    filter_block: &[FilterConfig],
    temporary: &[FilterConfig],
) -> Vec<FilterConfig> {
    let mut merged: Vec<FilterConfig> = base.to_vec();
    let base_fields: HashSet<&str> = base.iter().map(|f| f.field.as_str()).collect();

    let mut block_fields: HashSet<&str> = HashSet::new();
    for filter in filter_block {
        if !base_fields.contains(filter.field.as_str()) {
            block_fields.insert(filter.field.as_str());
            merged.push(filter.clone());
        }
    }

    for filter in temporary {
        let field = filter.field.as_str();
        if !base_fields.contains(field) && !block_fields.contains(field) {
            merged.push(filter.clone());
        }
    }

    merged
}

/// Merge view-default filters with the user's quick-filter session state.
///
/// Deliberately the inverse of [`merge_filters`]: any field present in the
/// user's quick filters completely replaces the default condition(s) for that
/// field, while untouched fields keep their defaults. A quick-filter bar
/// overrides a builder-defined default; it does not narrow it.
#[must_use]
pub fn merge_view_defaults_with_quick_filters(
    defaults: &[FilterConfig],
    user_filters: &[FilterConfig],
) -> Vec<FilterConfig> {
    let user_fields: HashSet<&str> = user_filters.iter().map(|f| f.field.as_str()).collect();

    let mut merged: Vec<FilterConfig> = defaults
        .iter()
        .filter(|f| !user_fields.contains(f.field.as_str()))
        .cloned()
        .collect();
    merged.extend(user_filters.iter().cloned());
    merged
}

/// Derive pre-filled form values from the active equality filters, so a
/// record created inside a filtered view lands in that view.
///
/// Only `equal` conditions qualify; the value must be a scalar or a
/// single-element array (unwrapped); computed fields are skipped. When two
/// qualifying filters disagree on a field's value the field is omitted
/// entirely: conflict means omit, never guess.
#[must_use]
pub fn derive_default_values_from_filters(
    active_filters: &[FilterConfig],
    table_fields: &[FieldMeta],
) -> HashMap<String, Value> {
    // None marks a field with conflicting candidate values.
    let mut candidates: HashMap<String, Option<Value>> = HashMap::new();

    for filter in active_filters {
        if filter.operator != Operator::Equal {
            continue;
        }
        if find_field(table_fields, &filter.field)
            .is_some_and(|meta| meta.field_type.is_computed())
        {
            continue;
        }
        let Some(value) = default_value_candidate(&filter.value) else {
            continue;
        };
        match candidates.get(&filter.field) {
            Some(Some(existing)) if *existing != value => {
                candidates.insert(filter.field.clone(), None);
            }
            Some(_) => {}
            None => {
                candidates.insert(filter.field.clone(), Some(value));
            }
        }
    }

    candidates
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
}

/// Scalars qualify as-is; a single-element array is unwrapped; anything else
/// (multi-element arrays, objects, null) does not qualify.
fn default_value_candidate(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Some(value.clone()),
        Value::Array(items) if items.len() == 1 => items.first().cloned(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;
    use serde_json::json;

    fn eq(field: &str, value: Value) -> FilterConfig {
        FilterConfig::new(field, Operator::Equal, value)
    }

    #[test]
    fn test_merge_base_always_wins() {
        let base = vec![eq("status", json!("done"))];
        let block = vec![eq("status", json!("open")), eq("owner", json!("ada"))];
        let temp = vec![eq("status", json!("archived")), eq("title", json!("x"))];

        let merged = merge_filters(&base, &block, &temp);

        let status: Vec<&FilterConfig> = merged.iter().filter(|f| f.field == "status").collect();
        assert_eq!(status.len(), 1);
        assert_eq!(status.first().map(|f| &f.value), Some(&json!("done")));
        assert!(merged.iter().any(|f| f.field == "owner"));
        assert!(merged.iter().any(|f| f.field == "title"));
    }

    #[test]
    fn test_merge_filter_block_blocks_temporary() {
        let block = vec![eq("owner", json!("ada"))];
        let temp = vec![eq("owner", json!("grace"))];
        let merged = merge_filters(&[], &block, &temp);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.first().map(|f| &f.value), Some(&json!("ada")));
    }

    #[test]
    fn test_merge_empty_tiers() {
        assert!(merge_filters(&[], &[], &[]).is_empty());
        let temp = vec![eq("title", json!("x"))];
        assert_eq!(merge_filters(&[], &[], &temp), temp);
    }

    #[test]
    fn test_quick_filters_replace_defaults_per_field() {
        let defaults = vec![eq("status", json!("open")), eq("owner", json!("ada"))];
        let user = vec![eq("status", json!("done"))];

        let merged = merge_view_defaults_with_quick_filters(&defaults, &user);

        let status: Vec<&FilterConfig> = merged.iter().filter(|f| f.field == "status").collect();
        assert_eq!(status.len(), 1);
        assert_eq!(status.first().map(|f| &f.value), Some(&json!("done")));
        // Untouched fields keep their default.
        assert!(merged
            .iter()
            .any(|f| f.field == "owner" && f.value == json!("ada")));
    }

    #[test]
    fn test_quick_filters_replace_all_default_conditions_for_field() {
        let defaults = vec![
            FilterConfig::new("amount", Operator::GreaterThan, json!(5)),
            FilterConfig::new("amount", Operator::LessThan, json!(100)),
        ];
        let user = vec![eq("amount", json!(42))];
        let merged = merge_view_defaults_with_quick_filters(&defaults, &user);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.first().map(|f| f.operator), Some(Operator::Equal));
    }

    #[test]
    fn test_derive_defaults_scalar_and_single_element_array() {
        let filters = vec![
            eq("stage", json!("Lead")),
            eq("tags", json!(["hot"])),
            FilterConfig::new("amount", Operator::GreaterThan, json!(10)),
        ];
        let values = derive_default_values_from_filters(&filters, &[]);
        assert_eq!(values.get("stage"), Some(&json!("Lead")));
        assert_eq!(values.get("tags"), Some(&json!("hot")));
        // Non-equality operators never qualify.
        assert!(!values.contains_key("amount"));
    }

    #[test]
    fn test_derive_defaults_conflict_omits_field() {
        let filters = vec![eq("stage", json!("Lead")), eq("stage", json!("Won"))];
        let values = derive_default_values_from_filters(&filters, &[]);
        assert!(values.is_empty());
    }

    #[test]
    fn test_derive_defaults_duplicate_agreeing_filters_keep_field() {
        let filters = vec![eq("stage", json!("Lead")), eq("stage", json!("Lead"))];
        let values = derive_default_values_from_filters(&filters, &[]);
        assert_eq!(values.get("stage"), Some(&json!("Lead")));
    }

    #[test]
    fn test_derive_defaults_skips_computed_fields() {
        let fields = vec![FieldMeta::new("total", FieldType::Formula)];
        let filters = vec![eq("total", json!(99))];
        let values = derive_default_values_from_filters(&filters, &fields);
        assert!(values.is_empty());
    }

    #[test]
    fn test_derive_defaults_rejects_multi_element_arrays_and_objects() {
        let filters = vec![
            eq("tags", json!(["a", "b"])),
            eq("meta", json!({"k": "v"})),
            eq("empty", json!(null)),
        ];
        let values = derive_default_values_from_filters(&filters, &[]);
        assert!(values.is_empty());
    }
}
