use chrono::NaiveDate;
use serde_json::json;

use super::*;
use crate::filter::convert::filter_configs_to_tree;
use crate::query::QueryBuilder;
use crate::schema::FieldMeta;

/// Test double that records every builder call in order.
#[derive(Debug, Default, Clone)]
struct RecordingQuery {
    calls: Vec<String>,
}

impl RecordingQuery {
    fn push(mut self, call: String) -> Self {
        self.calls.push(call);
        self
    }
}

impl QueryBuilder for RecordingQuery {
    fn select(self, columns: &str) -> Self {
        self.push(format!("select({columns})"))
    }
    fn eq(self, column: &str, value: &serde_json::Value) -> Self {
        self.push(format!("eq({column},{value})"))
    }
    fn neq(self, column: &str, value: &serde_json::Value) -> Self {
        self.push(format!("neq({column},{value})"))
    }
    fn gt(self, column: &str, value: &serde_json::Value) -> Self {
        self.push(format!("gt({column},{value})"))
    }
    fn gte(self, column: &str, value: &serde_json::Value) -> Self {
        self.push(format!("gte({column},{value})"))
    }
    fn lt(self, column: &str, value: &serde_json::Value) -> Self {
        self.push(format!("lt({column},{value})"))
    }
    fn lte(self, column: &str, value: &serde_json::Value) -> Self {
        self.push(format!("lte({column},{value})"))
    }
    fn ilike(self, column: &str, pattern: &str) -> Self {
        self.push(format!("ilike({column},{pattern})"))
    }
    fn contains(self, column: &str, value: &serde_json::Value) -> Self {
        self.push(format!("contains({column},{value})"))
    }
    fn is_null(self, column: &str) -> Self {
        self.push(format!("is_null({column})"))
    }
    fn not(self, column: &str, operator: &str, value: &serde_json::Value) -> Self {
        self.push(format!("not({column},{operator},{value})"))
    }
    fn or(self, expression: &str) -> Self {
        self.push(format!("or({expression})"))
    }
    fn order(self, column: &str, ascending: bool) -> Self {
        self.push(format!("order({column},{ascending})"))
    }
    fn range(self, from: usize, to: usize) -> Self {
        self.push(format!("range({from},{to})"))
    }
    fn limit(self, count: usize) -> Self {
        self.push(format!("limit({count})"))
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn apply(tree: &FilterTree, fields: &[FieldMeta]) -> Vec<String> {
    apply_filter_tree(RecordingQuery::default(), tree, fields, today()).calls
}

fn leaf(field: &str, operator: Operator, value: serde_json::Value) -> FilterTree {
    FilterTree::leaf(FilterConfig::new(field, operator, value))
}

#[test]
fn test_and_group_chains_sequential_calls() {
    let tree = filter_configs_to_tree(
        &[
            FilterConfig::new("status", Operator::Equal, json!("done")),
            FilterConfig::new("amount", Operator::GreaterThan, json!(10)),
        ],
        ConditionType::And,
    );
    assert_eq!(
        apply(&tree, &[]),
        vec!["eq(status,\"done\")", "gt(amount,10)"]
    );
}

#[test]
fn test_or_group_collapses_to_one_disjunction() {
    let tree = filter_configs_to_tree(
        &[
            FilterConfig::new("status", Operator::Equal, json!("done")),
            FilterConfig::new("status", Operator::Equal, json!("archived")),
        ],
        ConditionType::Or,
    );
    assert_eq!(
        apply(&tree, &[]),
        vec!["or(status.eq.done,status.eq.archived)"]
    );
}

#[test]
fn test_nested_and_inside_or() {
    let tree = FilterTree::group(
        ConditionType::Or,
        vec![
            leaf("status", Operator::Equal, json!("done")),
            FilterTree::group(
                ConditionType::And,
                vec![
                    leaf("stage", Operator::Equal, json!("won")),
                    leaf("amount", Operator::GreaterThan, json!(100)),
                ],
            ),
        ],
    );
    assert_eq!(
        apply(&tree, &[]),
        vec!["or(status.eq.done,and(stage.eq.won,amount.gt.100))"]
    );
}

#[test]
fn test_empty_group_emits_nothing() {
    assert!(apply(&FilterTree::empty(), &[]).is_empty());
    let empty_or = FilterTree::group(ConditionType::Or, vec![]);
    assert!(apply(&empty_or, &[]).is_empty());
}

#[test]
fn test_contains_and_not_contains() {
    let calls = apply(&leaf("title", Operator::Contains, json!("urgent")), &[]);
    assert_eq!(calls, vec!["ilike(title,%urgent%)"]);

    let calls = apply(&leaf("title", Operator::NotContains, json!("spam")), &[]);
    assert_eq!(calls, vec!["not(title,ilike,\"%spam%\")"]);
}

#[test]
fn test_is_empty_covers_null_and_empty_string() {
    let calls = apply(&leaf("owner", Operator::IsEmpty, json!(null)), &[]);
    assert_eq!(calls, vec!["or(owner.is.null,owner.eq.\"\")"]);

    let calls = apply(&leaf("owner", Operator::IsNotEmpty, json!(null)), &[]);
    assert_eq!(calls, vec!["not(owner,is,null)", "neq(owner,\"\")"]);
}

#[test]
fn test_multi_select_equal_uses_containment() {
    let fields = vec![FieldMeta::new("tags", crate::schema::FieldType::MultiSelect)];
    let calls = apply(&leaf("tags", Operator::Equal, json!("hot")), &fields);
    assert_eq!(calls, vec!["contains(tags,\"hot\")"]);
}

#[test]
fn test_checkbox_equal_coerces_strings() {
    let fields = vec![FieldMeta::new(
        "archived",
        crate::schema::FieldType::Checkbox,
    )];
    let calls = apply(&leaf("archived", Operator::Equal, json!("true")), &fields);
    assert_eq!(calls, vec!["eq(archived,true)"]);
}

#[test]
fn test_unknown_field_falls_back_to_naive_equality() {
    let calls = apply(&leaf("mystery", Operator::Equal, json!("x")), &[]);
    assert_eq!(calls, vec!["eq(mystery,\"x\")"]);
}

#[test]
fn test_date_equal_becomes_day_window() {
    let calls = apply(&leaf("due", Operator::DateEqual, json!("2024-06-20")), &[]);
    assert_eq!(
        calls,
        vec!["gte(due,\"2024-06-20\")", "lt(due,\"2024-06-21\")"]
    );
}

#[test]
fn test_date_boundaries() {
    let calls = apply(&leaf("due", Operator::DateBefore, json!("2024-06-20")), &[]);
    assert_eq!(calls, vec!["lt(due,\"2024-06-20\")"]);

    let calls = apply(&leaf("due", Operator::DateAfter, json!("2024-06-20")), &[]);
    assert_eq!(calls, vec!["gte(due,\"2024-06-21\")"]);

    let calls = apply(
        &leaf("due", Operator::DateOnOrBefore, json!("2024-06-20")),
        &[],
    );
    assert_eq!(calls, vec!["lt(due,\"2024-06-21\")"]);

    let calls = apply(
        &leaf("due", Operator::DateOnOrAfter, json!("2024-06-20")),
        &[],
    );
    assert_eq!(calls, vec!["gte(due,\"2024-06-20\")"]);
}

#[test]
fn test_date_range_object_form() {
    let calls = apply(
        &leaf(
            "due",
            Operator::DateRange,
            json!({"start": "2024-06-18", "end": "2024-06-22"}),
        ),
        &[],
    );
    assert_eq!(
        calls,
        vec!["gte(due,\"2024-06-18\")", "lt(due,\"2024-06-23\")"]
    );
}

#[test]
fn test_date_today_and_next_days_anchor_on_today() {
    let calls = apply(&leaf("due", Operator::DateToday, json!(null)), &[]);
    assert_eq!(
        calls,
        vec!["gte(due,\"2024-06-15\")", "lt(due,\"2024-06-16\")"]
    );

    let calls = apply(&leaf("due", Operator::DateNextDays, json!(7)), &[]);
    assert_eq!(
        calls,
        vec!["gte(due,\"2024-06-15\")", "lt(due,\"2024-06-23\")"]
    );
}

#[test]
fn test_untranslatable_date_condition_is_skipped() {
    let calls = apply(&leaf("due", Operator::DateEqual, json!("garbage")), &[]);
    assert!(calls.is_empty());

    let calls = apply(&leaf("due", Operator::DateNextDays, json!("soon")), &[]);
    assert!(calls.is_empty());
}

#[test]
fn test_date_condition_inside_or_expression() {
    let tree = FilterTree::group(
        ConditionType::Or,
        vec![
            leaf("due", Operator::DateToday, json!(null)),
            leaf("status", Operator::Equal, json!("done")),
        ],
    );
    assert_eq!(
        apply(&tree, &[]),
        vec!["or(and(due.gte.2024-06-15,due.lt.2024-06-16),status.eq.done)"]
    );
}

#[test]
fn test_or_group_with_only_untranslatable_children_is_no_op() {
    let tree = FilterTree::group(
        ConditionType::Or,
        vec![
            leaf("due", Operator::DateEqual, json!("garbage")),
            leaf("start", Operator::DateNextDays, json!("soon")),
        ],
    );
    assert!(apply(&tree, &[]).is_empty());
}

#[test]
fn test_single_child_or_group_unwraps_in_expression() {
    let tree = FilterTree::group(
        ConditionType::Or,
        vec![FilterTree::group(
            ConditionType::Or,
            vec![leaf("status", Operator::Equal, json!("done"))],
        )],
    );
    assert_eq!(apply(&tree, &[]), vec!["or(status.eq.done)"]);
}
