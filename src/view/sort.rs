//! Field-type-aware sorting and the client-side fallback decision.
//!
//! A generic backend `ORDER BY` sorts select fields lexically, but their
//! natural order is the configured choice order (multi-select sorts by its
//! first value). Any sort touching such a field therefore has to run
//! application-side over a larger fetched page.

use std::cmp::Ordering;

use serde_json::Value;

use crate::filter::matches::parse_date_value;
use crate::schema::{find_field, FieldMeta, FieldType, TableRow};

use super::types::{SortDirection, ViewSort};

/// Whether any requested sort forces client-side evaluation.
#[must_use]
pub fn should_use_client_side_sorting(sorts: &[ViewSort], fields: &[FieldMeta]) -> bool {
    sorts.iter().any(|sort| {
        find_field(fields, &sort.field_name)
            .is_some_and(|meta| meta.field_type.is_select())
    })
}

/// Stable multi-key sort over fetched rows.
///
/// Keys apply in `order_index` order; rows that compare equal keep their
/// fetched order.
pub fn sort_rows(rows: &mut [TableRow], sorts: &[ViewSort], fields: &[FieldMeta]) {
    if sorts.is_empty() {
        return;
    }
    let mut ordered: Vec<&ViewSort> = sorts.iter().collect();
    ordered.sort_by_key(|s| s.order_index);

    rows.sort_by(|a, b| {
        for sort in &ordered {
            let meta = find_field(fields, &sort.field_name);
            let a_value = a.value(&sort.field_name);
            let b_value = b.value(&sort.field_name);
            // Empty cells sort last in either direction, so the missing
            // check sits outside the direction reversal.
            let ordering = match (is_missing(a_value), is_missing(b_value)) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => {
                    let ordering = compare_field_values(meta, a_value, b_value);
                    match sort.direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                }
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// Compare two cell values under a field's natural order.
///
/// Empty cells sort after present ones; single-select compares by choice
/// position, multi-select by its first value, and everything else
/// numerically or case-insensitively.
#[must_use]
pub fn compare_field_values(meta: Option<&FieldMeta>, a: &Value, b: &Value) -> Ordering {
    match (is_missing(a), is_missing(b)) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    match meta.map(|m| m.field_type) {
        Some(FieldType::SingleSelect) => compare_choices(meta, a, b),
        Some(FieldType::MultiSelect) => {
            compare_choices(meta, first_element(a), first_element(b))
        }
        Some(FieldType::Number) => compare_numbers(a, b),
        Some(FieldType::Date) => compare_dates(a, b),
        Some(FieldType::Checkbox) => compare_bools(a, b),
        _ => compare_text(a, b),
    }
}

fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn first_element(value: &Value) -> &Value {
    match value {
        Value::Array(items) => items.first().unwrap_or(value),
        other => other,
    }
}

/// Choice-list position beats everything; values missing from the choice
/// list sort after configured ones, compared as text among themselves.
fn compare_choices(meta: Option<&FieldMeta>, a: &Value, b: &Value) -> Ordering {
    let a_text = text_of(a);
    let b_text = text_of(b);
    let a_index = meta.and_then(|m| m.choice_index(&a_text));
    let b_index = meta.and_then(|m| m.choice_index(&b_text));
    match (a_index, b_index) {
        (Some(ai), Some(bi)) => ai.cmp(&bi),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a_text.to_lowercase().cmp(&b_text.to_lowercase()),
    }
}

fn compare_numbers(a: &Value, b: &Value) -> Ordering {
    match (number_of(a), number_of(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => compare_text(a, b),
    }
}

fn compare_dates(a: &Value, b: &Value) -> Ordering {
    match (parse_date_value(a), parse_date_value(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => compare_text(a, b),
    }
}

fn compare_bools(a: &Value, b: &Value) -> Ordering {
    bool_of(a).cmp(&bool_of(b))
}

fn compare_text(a: &Value, b: &Value) -> Ordering {
    text_of(a).to_lowercase().cmp(&text_of(b).to_lowercase())
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn bool_of(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}
