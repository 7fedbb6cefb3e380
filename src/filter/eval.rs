//! Translation of filter trees onto the abstract query builder.
//!
//! AND groups chain sequential predicate calls; OR groups collapse into the
//! builder's single disjunction-expression primitive. Date operators compare
//! calendar days, so each one becomes a half-open day window over the
//! underlying timestamp column. Conditions that cannot be translated
//! (unparseable date operands) are skipped rather than poisoning the query.

use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::warn;

use crate::query::{format_operand, QueryBuilder};
use crate::schema::{find_field, FieldMeta, FieldType};

use super::matches::{day_offset, format_day, parse_date_value};
use super::model::{ConditionType, FilterConfig, FilterTree, Operator};

/// Apply a filter tree to a query builder.
///
/// `fields` enables type-aware translation (multi-select containment,
/// checkbox coercion); unresolvable field names fall back to naive equality
/// and string matching. `today` anchors the relative date operators.
#[must_use]
pub fn apply_filter_tree<Q: QueryBuilder>(
    query: Q,
    tree: &FilterTree,
    fields: &[FieldMeta],
    today: NaiveDate,
) -> Q {
    match tree {
        FilterTree::Leaf(config) => apply_leaf(query, config, fields, today),
        FilterTree::Group {
            condition_type,
            children,
        } => {
            if children.is_empty() {
                return query;
            }
            match condition_type {
                ConditionType::And => children
                    .iter()
                    .fold(query, |q, child| apply_filter_tree(q, child, fields, today)),
                ConditionType::Or => match or_expression(children, fields, today) {
                    Some(expression) => query.or(&expression),
                    None => query,
                },
            }
        }
    }
}

/// Apply one condition as chained builder calls.
fn apply_leaf<Q: QueryBuilder>(
    query: Q,
    config: &FilterConfig,
    fields: &[FieldMeta],
    today: NaiveDate,
) -> Q {
    let field = config.field.as_str();
    let field_type = find_field(fields, field).map(|meta| meta.field_type);

    match config.operator {
        Operator::Equal => match field_type {
            Some(FieldType::MultiSelect) => query.contains(field, &config.value),
            Some(FieldType::Checkbox) => query.eq(field, &coerce_checkbox(&config.value)),
            _ => query.eq(field, &config.value),
        },
        Operator::NotEqual => query.neq(field, &config.value),
        Operator::Contains => query.ilike(field, &substring_pattern(&config.value)),
        Operator::NotContains => {
            let pattern = substring_pattern(&config.value);
            query.not(field, "ilike", &Value::String(pattern))
        }
        Operator::GreaterThan => query.gt(field, &config.value),
        Operator::GreaterThanOrEqual => query.gte(field, &config.value),
        Operator::LessThan => query.lt(field, &config.value),
        Operator::LessThanOrEqual => query.lte(field, &config.value),
        Operator::IsEmpty => query.or(&format!("{field}.is.null,{field}.eq.\"\"")),
        Operator::IsNotEmpty => query
            .not(field, "is", &Value::Null)
            .neq(field, &json!("")),
        Operator::DateEqual => match parse_date_value(&config.value) {
            Some(day) => apply_day_window(query, field, Some(day), Some(day)),
            None => skip_untranslatable(query, config),
        },
        Operator::DateBefore => match parse_date_value(&config.value) {
            Some(day) => query.lt(field, &json!(format_day(day))),
            None => skip_untranslatable(query, config),
        },
        Operator::DateAfter => match parse_date_value(&config.value) {
            Some(day) => query.gte(field, &json!(format_day(day_offset(day, 1)))),
            None => skip_untranslatable(query, config),
        },
        Operator::DateOnOrBefore => match parse_date_value(&config.value) {
            Some(day) => query.lt(field, &json!(format_day(day_offset(day, 1)))),
            None => skip_untranslatable(query, config),
        },
        Operator::DateOnOrAfter => match parse_date_value(&config.value) {
            Some(day) => query.gte(field, &json!(format_day(day))),
            None => skip_untranslatable(query, config),
        },
        Operator::DateRange => {
            let (start, end) = range_bounds(config);
            if start.is_none() && end.is_none() {
                return skip_untranslatable(query, config);
            }
            apply_day_window(query, field, start, end)
        }
        Operator::DateToday => apply_day_window(query, field, Some(today), Some(today)),
        Operator::DateNextDays => match day_count(&config.value) {
            Some(days) => {
                apply_day_window(query, field, Some(today), Some(day_offset(today, days)))
            }
            None => skip_untranslatable(query, config),
        },
    }
}

/// Inclusive calendar-day window as a half-open timestamp range:
/// `[start 00:00, end + 1 day 00:00)`.
fn apply_day_window<Q: QueryBuilder>(
    query: Q,
    field: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Q {
    let query = match start {
        Some(day) => query.gte(field, &json!(format_day(day))),
        None => query,
    };
    match end {
        Some(day) => query.lt(field, &json!(format_day(day_offset(day, 1)))),
        None => query,
    }
}

/// Render a group's children as a disjunction expression.
///
/// Returns `None` when nothing in the group translates, in which case the
/// group is a no-op (pass-through, never exclude-everything).
fn or_expression(children: &[FilterTree], fields: &[FieldMeta], today: NaiveDate) -> Option<String> {
    let parts: Vec<String> = children
        .iter()
        .filter_map(|child| tree_expression(child, fields, today))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(","))
    }
}

/// Render a subtree as one expression token (leaf token or nested
/// `and(...)` / `or(...)`).
fn tree_expression(tree: &FilterTree, fields: &[FieldMeta], today: NaiveDate) -> Option<String> {
    match tree {
        FilterTree::Leaf(config) => leaf_expression(config, fields, today),
        FilterTree::Group {
            condition_type,
            children,
        } => {
            let parts: Vec<String> = children
                .iter()
                .filter_map(|child| tree_expression(child, fields, today))
                .collect();
            match parts.len() {
                0 => None,
                1 => parts.into_iter().next(),
                _ => match condition_type {
                    ConditionType::And => Some(format!("and({})", parts.join(","))),
                    ConditionType::Or => Some(format!("or({})", parts.join(","))),
                },
            }
        }
    }
}

/// Render one condition as a disjunction-expression token, mirroring
/// [`apply_leaf`] exactly.
fn leaf_expression(
    config: &FilterConfig,
    fields: &[FieldMeta],
    today: NaiveDate,
) -> Option<String> {
    let field = config.field.as_str();
    let field_type = find_field(fields, field).map(|meta| meta.field_type);

    let token = match config.operator {
        Operator::Equal => match field_type {
            Some(FieldType::MultiSelect) => {
                format!("{field}.cs.{{{}}}", format_operand(&config.value))
            }
            Some(FieldType::Checkbox) => {
                format!("{field}.eq.{}", format_operand(&coerce_checkbox(&config.value)))
            }
            _ => format!("{field}.eq.{}", format_operand(&config.value)),
        },
        Operator::NotEqual => format!("{field}.neq.{}", format_operand(&config.value)),
        Operator::Contains => format!("{field}.ilike.{}", like_token(&config.value)),
        Operator::NotContains => format!("{field}.not.ilike.{}", like_token(&config.value)),
        Operator::GreaterThan => format!("{field}.gt.{}", format_operand(&config.value)),
        Operator::GreaterThanOrEqual => format!("{field}.gte.{}", format_operand(&config.value)),
        Operator::LessThan => format!("{field}.lt.{}", format_operand(&config.value)),
        Operator::LessThanOrEqual => format!("{field}.lte.{}", format_operand(&config.value)),
        Operator::IsEmpty => format!("or({field}.is.null,{field}.eq.\"\")"),
        Operator::IsNotEmpty => format!("and({field}.not.is.null,{field}.neq.\"\")"),
        Operator::DateEqual => {
            let day = parse_date_value(&config.value)?;
            day_window_token(field, Some(day), Some(day))?
        }
        Operator::DateBefore => {
            let day = parse_date_value(&config.value)?;
            format!("{field}.lt.{}", format_day(day))
        }
        Operator::DateAfter => {
            let day = parse_date_value(&config.value)?;
            format!("{field}.gte.{}", format_day(day_offset(day, 1)))
        }
        Operator::DateOnOrBefore => {
            let day = parse_date_value(&config.value)?;
            format!("{field}.lt.{}", format_day(day_offset(day, 1)))
        }
        Operator::DateOnOrAfter => {
            let day = parse_date_value(&config.value)?;
            format!("{field}.gte.{}", format_day(day))
        }
        Operator::DateRange => {
            let (start, end) = range_bounds(config);
            day_window_token(field, start, end)?
        }
        Operator::DateToday => day_window_token(field, Some(today), Some(today))?,
        Operator::DateNextDays => {
            let days = day_count(&config.value)?;
            day_window_token(field, Some(today), Some(day_offset(today, days)))?
        }
    };
    Some(token)
}

fn day_window_token(
    field: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Option<String> {
    match (start, end) {
        (Some(s), Some(e)) => Some(format!(
            "and({field}.gte.{},{field}.lt.{})",
            format_day(s),
            format_day(day_offset(e, 1))
        )),
        (Some(s), None) => Some(format!("{field}.gte.{}", format_day(s))),
        (None, Some(e)) => Some(format!("{field}.lt.{}", format_day(day_offset(e, 1)))),
        (None, None) => None,
    }
}

fn range_bounds(config: &FilterConfig) -> (Option<NaiveDate>, Option<NaiveDate>) {
    if let Value::Object(object) = &config.value {
        return (
            object.get("start").and_then(parse_date_value),
            object.get("end").and_then(parse_date_value),
        );
    }
    (
        parse_date_value(&config.value),
        config.value2.as_ref().and_then(parse_date_value),
    )
}

fn day_count(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn substring_pattern(value: &Value) -> String {
    format!("%{}%", scalar_text(value))
}

/// `ilike` token form uses `*` wildcards in expression syntax.
fn like_token(value: &Value) -> String {
    format!("*{}*", scalar_text(value))
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn coerce_checkbox(value: &Value) -> Value {
    match value {
        Value::Bool(b) => Value::Bool(*b),
        Value::String(s) => Value::Bool(s.eq_ignore_ascii_case("true")),
        Value::Number(n) => Value::Bool(n.as_f64().is_some_and(|f| f != 0.0)),
        _ => Value::Bool(false),
    }
}

fn skip_untranslatable<Q>(query: Q, config: &FilterConfig) -> Q {
    warn!(
        field = %config.field,
        operator = %config.operator,
        "filter condition could not be translated; skipping as a no-op"
    );
    query
}

#[cfg(test)]
#[path = "eval_tests.rs"]
mod tests;
