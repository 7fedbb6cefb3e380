//! In-memory filter evaluation over JSON-backed rows.
//!
//! This is the reference semantics for every operator and is what the
//! client-side fallback and the in-memory store evaluate with. A condition
//! that cannot be interpreted (unknown field value shape, unparseable filter
//! value) degrades to a no-op that passes the row through; filters must never
//! turn into exclude-everything by accident.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde_json::{Map, Value};

use crate::schema::{find_field, FieldMeta, FieldType};

use super::model::{ConditionType, FilterConfig, FilterTree, Operator};

/// Today's calendar day in UTC, used by the relative date operators.
///
/// Callers that need determinism (tests, snapshotting) pass an explicit day
/// into [`row_matches_tree`] instead.
#[must_use]
pub fn current_day() -> NaiveDate {
    Utc::now().date_naive()
}

/// Evaluate a filter tree against one row.
///
/// Empty groups pass the row through, AND groups require every child, OR
/// groups require at least one.
#[must_use]
pub fn row_matches_tree(
    data: &Map<String, Value>,
    tree: &FilterTree,
    fields: &[FieldMeta],
    today: NaiveDate,
) -> bool {
    match tree {
        FilterTree::Leaf(config) => row_matches_leaf(data, config, fields, today),
        FilterTree::Group {
            condition_type,
            children,
        } => {
            if children.is_empty() {
                return true;
            }
            match condition_type {
                ConditionType::And => children
                    .iter()
                    .all(|child| row_matches_tree(data, child, fields, today)),
                ConditionType::Or => children
                    .iter()
                    .any(|child| row_matches_tree(data, child, fields, today)),
            }
        }
    }
}

/// Evaluate a single condition against one row.
#[must_use]
pub fn row_matches_leaf(
    data: &Map<String, Value>,
    config: &FilterConfig,
    fields: &[FieldMeta],
    today: NaiveDate,
) -> bool {
    let field_value = data.get(&config.field).unwrap_or(&Value::Null);
    let field_type = find_field(fields, &config.field).map(|meta| meta.field_type);

    match config.operator {
        Operator::Equal => equals(field_value, &config.value, field_type),
        Operator::NotEqual => !equals(field_value, &config.value, field_type),
        Operator::Contains => contains(field_value, &config.value),
        Operator::NotContains => !contains(field_value, &config.value),
        Operator::GreaterThan => {
            compare(field_value, &config.value).is_some_and(std::cmp::Ordering::is_gt)
        }
        Operator::GreaterThanOrEqual => {
            compare(field_value, &config.value).is_some_and(std::cmp::Ordering::is_ge)
        }
        Operator::LessThan => {
            compare(field_value, &config.value).is_some_and(std::cmp::Ordering::is_lt)
        }
        Operator::LessThanOrEqual => {
            compare(field_value, &config.value).is_some_and(std::cmp::Ordering::is_le)
        }
        Operator::IsEmpty => is_empty_value(field_value),
        Operator::IsNotEmpty => !is_empty_value(field_value),
        Operator::DateEqual => match parse_date_value(&config.value) {
            Some(day) => parse_date_value(field_value).is_some_and(|row_day| row_day == day),
            None => true,
        },
        Operator::DateBefore => match parse_date_value(&config.value) {
            Some(day) => parse_date_value(field_value).is_some_and(|row_day| row_day < day),
            None => true,
        },
        Operator::DateAfter => match parse_date_value(&config.value) {
            Some(day) => parse_date_value(field_value).is_some_and(|row_day| row_day > day),
            None => true,
        },
        Operator::DateOnOrBefore => match parse_date_value(&config.value) {
            Some(day) => parse_date_value(field_value).is_some_and(|row_day| row_day <= day),
            None => true,
        },
        Operator::DateOnOrAfter => match parse_date_value(&config.value) {
            Some(day) => parse_date_value(field_value).is_some_and(|row_day| row_day >= day),
            None => true,
        },
        Operator::DateRange => {
            let (start, end) = date_range_bounds(config);
            if start.is_none() && end.is_none() {
                return true;
            }
            let Some(row_day) = parse_date_value(field_value) else {
                return false;
            };
            start.is_none_or(|s| row_day >= s) && end.is_none_or(|e| row_day <= e)
        }
        Operator::DateToday => parse_date_value(field_value).is_some_and(|row_day| row_day == today),
        Operator::DateNextDays => {
            let Some(days) = as_integer(&config.value) else {
                return true;
            };
            let Some(end) = today.checked_add_signed(Duration::days(days)) else {
                return true;
            };
            parse_date_value(field_value)
                .is_some_and(|row_day| row_day >= today && row_day <= end)
        }
    }
}

/// Inclusive bounds for a `date_range` condition, from `value.start` /
/// `value.end` with a `value` / `value2` fallback.
fn date_range_bounds(config: &FilterConfig) -> (Option<NaiveDate>, Option<NaiveDate>) {
    if let Value::Object(object) = &config.value {
        let start = object.get("start").and_then(parse_date_value);
        let end = object.get("end").and_then(parse_date_value);
        return (start, end);
    }
    (
        parse_date_value(&config.value),
        config.value2.as_ref().and_then(parse_date_value),
    )
}

/// Parse a cell or filter value to a calendar day, time-of-day ignored.
///
/// Accepts `YYYY-MM-DD` and anything ISO-ish with a `T` separator.
#[must_use]
pub fn parse_date_value(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?;
    let date_part = text.split('T').next().unwrap_or(text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Type-aware equality.
///
/// Multi-select checks array containment rather than exact equality, and
/// checkbox comparisons coerce `'true'` / `'false'` strings.
fn equals(field_value: &Value, filter_value: &Value, field_type: Option<FieldType>) -> bool {
    match field_type {
        Some(FieldType::MultiSelect) => multi_select_equals(field_value, filter_value),
        Some(FieldType::Checkbox) => coerce_bool(field_value) == coerce_bool(filter_value),
        _ => loose_eq(field_value, filter_value),
    }
}

fn multi_select_equals(field_value: &Value, filter_value: &Value) -> bool {
    match (field_value, filter_value) {
        (Value::Array(items), Value::Array(wanted)) => wanted
            .iter()
            .all(|w| items.iter().any(|item| loose_eq(item, w))),
        (Value::Array(items), wanted) => items.iter().any(|item| loose_eq(item, wanted)),
        // Legacy rows sometimes hold a bare scalar for a multi-select cell.
        (item, Value::Array(wanted)) => wanted.iter().all(|w| loose_eq(item, w)),
        (item, wanted) => loose_eq(item, wanted),
    }
}

/// Case-insensitive substring match; array cells match when any element does.
fn contains(field_value: &Value, filter_value: &Value) -> bool {
    let needle = value_to_string(filter_value).to_lowercase();
    if needle.is_empty() {
        return true;
    }
    match field_value {
        Value::Array(items) => items
            .iter()
            .any(|item| value_to_string(item).to_lowercase().contains(&needle)),
        other => value_to_string(other).to_lowercase().contains(&needle),
    }
}

/// Numeric comparison when both sides parse as numbers, lexical (lowercased)
/// comparison otherwise. A missing cell never compares.
fn compare(field_value: &Value, filter_value: &Value) -> Option<std::cmp::Ordering> {
    if field_value.is_null() {
        return None;
    }
    if let (Some(a), Some(b)) = (as_number(field_value), as_number(filter_value)) {
        return a.partial_cmp(&b);
    }
    let a = value_to_string(field_value).to_lowercase();
    let b = value_to_string(filter_value).to_lowercase();
    Some(a.cmp(&b))
}

/// Null, missing, empty string, and empty array all count as empty.
#[must_use]
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Equality that tolerates scalar representation drift (`5` vs `"5"`,
/// `true` vs `"true"`).
fn loose_eq(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    match (a, b) {
        (Value::Object(_) | Value::Array(_), _) | (_, Value::Object(_) | Value::Array(_)) => false,
        _ => value_to_string(a) == value_to_string(b),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

/// Resolve `today + n days`, for building query-side day windows.
#[must_use]
pub fn day_offset(day: NaiveDate, days: i64) -> NaiveDate {
    day.checked_add_signed(Duration::days(days)).unwrap_or(day)
}

/// ISO `YYYY-MM-DD` rendering of a day.
#[must_use]
pub fn format_day(day: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", day.year(), day.month(), day.day())
}
