//! Canonical filter model: leaf conditions, the recursive AND/OR tree, and
//! the persisted `view_filters` / `view_filter_groups` row shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed operator enumeration for filter conditions.
///
/// Persisted rows store the operator as a plain string; unknown strings are
/// tolerated there (the condition degrades to a no-op) rather than rejected,
/// so legacy data never breaks a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equal,
    NotEqual,
    Contains,
    NotContains,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    IsEmpty,
    IsNotEmpty,
    DateEqual,
    DateBefore,
    DateAfter,
    DateOnOrBefore,
    DateOnOrAfter,
    DateRange,
    DateToday,
    DateNextDays,
}

impl Operator {
    /// Parse the persisted string form. Returns `None` for unknown operators
    /// so callers can degrade the condition instead of failing the view.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "equal" => Some(Operator::Equal),
            "not_equal" => Some(Operator::NotEqual),
            "contains" => Some(Operator::Contains),
            "not_contains" => Some(Operator::NotContains),
            "greater_than" => Some(Operator::GreaterThan),
            "greater_than_or_equal" => Some(Operator::GreaterThanOrEqual),
            "less_than" => Some(Operator::LessThan),
            "less_than_or_equal" => Some(Operator::LessThanOrEqual),
            "is_empty" => Some(Operator::IsEmpty),
            "is_not_empty" => Some(Operator::IsNotEmpty),
            "date_equal" => Some(Operator::DateEqual),
            "date_before" => Some(Operator::DateBefore),
            "date_after" => Some(Operator::DateAfter),
            "date_on_or_before" => Some(Operator::DateOnOrBefore),
            "date_on_or_after" => Some(Operator::DateOnOrAfter),
            "date_range" => Some(Operator::DateRange),
            "date_today" => Some(Operator::DateToday),
            "date_next_days" => Some(Operator::DateNextDays),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equal => "equal",
            Operator::NotEqual => "not_equal",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::GreaterThan => "greater_than",
            Operator::GreaterThanOrEqual => "greater_than_or_equal",
            Operator::LessThan => "less_than",
            Operator::LessThanOrEqual => "less_than_or_equal",
            Operator::IsEmpty => "is_empty",
            Operator::IsNotEmpty => "is_not_empty",
            Operator::DateEqual => "date_equal",
            Operator::DateBefore => "date_before",
            Operator::DateAfter => "date_after",
            Operator::DateOnOrBefore => "date_on_or_before",
            Operator::DateOnOrAfter => "date_on_or_after",
            Operator::DateRange => "date_range",
            Operator::DateToday => "date_today",
            Operator::DateNextDays => "date_next_days",
        }
    }

    /// Operators that compare against a calendar day (or day window).
    #[must_use]
    pub fn is_date_operator(self) -> bool {
        matches!(
            self,
            Operator::DateEqual
                | Operator::DateBefore
                | Operator::DateAfter
                | Operator::DateOnOrBefore
                | Operator::DateOnOrAfter
                | Operator::DateRange
                | Operator::DateToday
                | Operator::DateNextDays
        )
    }

    /// Operators that take no comparison value.
    #[must_use]
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            Operator::IsEmpty | Operator::IsNotEmpty | Operator::DateToday
        )
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the children of a filter group combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConditionType {
    And,
    Or,
}

impl ConditionType {
    /// Parse the persisted `'AND' | 'OR'` string, defaulting unknown values
    /// to AND (the conservative combination).
    #[must_use]
    pub fn parse_or_and(s: &str) -> Self {
        if s.eq_ignore_ascii_case("or") {
            ConditionType::Or
        } else {
            ConditionType::And
        }
    }
}

/// A single flat filter condition.
///
/// This is both the leaf of [`FilterTree`] and the element of the legacy
/// flat list shape; an array of these is implicitly AND-combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub field: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: Value,
    /// Second operand for range-style operators only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<Value>,
}

impl FilterConfig {
    #[must_use]
    pub fn new(field: impl Into<String>, operator: Operator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
            value2: None,
        }
    }

    #[must_use]
    pub fn with_value2(mut self, value2: Value) -> Self {
        self.value2 = Some(value2);
        self
    }
}

/// Canonical recursive filter representation.
///
/// An empty group (directly or after pruning empty children) means "no
/// filtering": it must evaluate to pass-through, never to exclude-everything.
/// Trees are never mutated in place; every transformation builds a new tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterTree {
    Group {
        condition_type: ConditionType,
        children: Vec<FilterTree>,
    },
    Leaf(FilterConfig),
}

impl FilterTree {
    /// The pass-through tree.
    #[must_use]
    pub fn empty() -> Self {
        FilterTree::Group {
            condition_type: ConditionType::And,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn leaf(config: FilterConfig) -> Self {
        FilterTree::Leaf(config)
    }

    #[must_use]
    pub fn group(condition_type: ConditionType, children: Vec<FilterTree>) -> Self {
        FilterTree::Group {
            condition_type,
            children,
        }
    }

    /// True when the tree applies no filtering at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            FilterTree::Leaf(_) => false,
            FilterTree::Group { children, .. } => children.iter().all(FilterTree::is_empty),
        }
    }

    /// All leaves, depth-first.
    #[must_use]
    pub fn leaves(&self) -> Vec<&FilterConfig> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a FilterConfig>) {
        match self {
            FilterTree::Leaf(config) => out.push(config),
            FilterTree::Group { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// Whether any group in the tree combines with OR.
    #[must_use]
    pub fn has_or_semantics(&self) -> bool {
        match self {
            FilterTree::Leaf(_) => false,
            FilterTree::Group {
                condition_type,
                children,
            } => {
                (*condition_type == ConditionType::Or && children.len() > 1)
                    || children.iter().any(FilterTree::has_or_semantics)
            }
        }
    }
}

impl Default for FilterTree {
    fn default() -> Self {
        FilterTree::empty()
    }
}

/// A persisted filter group row (`view_filter_groups`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewFilterGroup {
    pub id: String,
    pub view_id: String,
    pub condition_type: ConditionType,
    pub order_index: i32,
}

/// A persisted filter row (`view_filters`).
///
/// `filter_group_id = None` marks the filter as ungrouped: it is
/// AND-combined with all groups at the top level. The operator stays a plain
/// string here so unknown legacy values survive loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewFilter {
    pub id: String,
    pub view_id: String,
    pub field_name: String,
    pub operator: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub filter_group_id: Option<String>,
    pub order_index: i32,
}
