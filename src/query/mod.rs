//! Abstract query-builder interface the filter engine targets.
//!
//! The backing data store is consumed through this trait (PostgREST-style
//! builder: chained predicate calls plus a single disjunction expression for
//! OR composition). The engine only translates filters onto it; it never
//! executes queries itself.

use serde_json::Value;

/// Chainable query builder, matching the surface of the consumed data-store
/// client. Every call returns the builder so predicates compose by chaining;
/// sequential calls combine as AND.
pub trait QueryBuilder: Sized {
    /// Restrict the selected columns (comma-separated projection).
    #[must_use]
    fn select(self, columns: &str) -> Self;

    #[must_use]
    fn eq(self, column: &str, value: &Value) -> Self;

    #[must_use]
    fn neq(self, column: &str, value: &Value) -> Self;

    #[must_use]
    fn gt(self, column: &str, value: &Value) -> Self;

    #[must_use]
    fn gte(self, column: &str, value: &Value) -> Self;

    #[must_use]
    fn lt(self, column: &str, value: &Value) -> Self;

    #[must_use]
    fn lte(self, column: &str, value: &Value) -> Self;

    /// Case-insensitive pattern match, `%` wildcards.
    #[must_use]
    fn ilike(self, column: &str, pattern: &str) -> Self;

    /// Array-containment predicate for multi-value cells.
    #[must_use]
    fn contains(self, column: &str, value: &Value) -> Self;

    /// `IS NULL` test.
    #[must_use]
    fn is_null(self, column: &str) -> Self;

    /// Negate an arbitrary operator (`.not(column, "ilike", pattern)` style).
    #[must_use]
    fn not(self, column: &str, operator: &str, value: &Value) -> Self;

    /// Disjunction over an expression list (`"a.eq.1,b.ilike.*x*"`); the one
    /// OR-composition primitive the interface offers.
    #[must_use]
    fn or(self, expression: &str) -> Self;

    #[must_use]
    fn order(self, column: &str, ascending: bool) -> Self;

    /// Inclusive row range.
    #[must_use]
    fn range(self, from: usize, to: usize) -> Self;

    #[must_use]
    fn limit(self, count: usize) -> Self;
}

/// Render a JSON scalar as a disjunction-expression operand, quoting values
/// that would collide with the expression syntax.
#[must_use]
pub fn format_operand(value: &Value) -> String {
    let text = match value {
        Value::Null => return "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.contains([',', '(', ')', '.', '"', ' ']) {
        format!("\"{}\"", text.replace('"', "\\\""))
    } else {
        text
    }
}
