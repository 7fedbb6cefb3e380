//! Field metadata: declared types, select choices, and per-type operator sets.

use serde::{Deserialize, Serialize};

use crate::filter::model::Operator;

/// Declared type of a table field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    LongText,
    Number,
    Date,
    Checkbox,
    SingleSelect,
    MultiSelect,
    Url,
    Email,
    Formula,
    Lookup,
}

impl FieldType {
    /// Computed fields derive their value from other fields and are never
    /// writable directly.
    #[must_use]
    pub fn is_computed(self) -> bool {
        matches!(self, FieldType::Formula | FieldType::Lookup)
    }

    /// Select-like fields store one of (or several of) a configured choice list.
    #[must_use]
    pub fn is_select(self) -> bool {
        matches!(self, FieldType::SingleSelect | FieldType::MultiSelect)
    }

    #[must_use]
    pub fn is_date(self) -> bool {
        matches!(self, FieldType::Date)
    }

    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, FieldType::Number)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FieldType::Text => "text",
            FieldType::LongText => "long_text",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Checkbox => "checkbox",
            FieldType::SingleSelect => "single_select",
            FieldType::MultiSelect => "multi_select",
            FieldType::Url => "url",
            FieldType::Email => "email",
            FieldType::Formula => "formula",
            FieldType::Lookup => "lookup",
        };
        write!(f, "{s}")
    }
}

/// Type-specific field options (currently only select choices).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOptions {
    /// Ordered choice list for select fields. The order here is the field's
    /// "natural" sort order, not lexical order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

/// Metadata for a single field, as persisted in `table_fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub options: FieldOptions,
}

impl FieldMeta {
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: None,
            table_id: None,
            name: name.into(),
            field_type,
            options: FieldOptions::default(),
        }
    }

    /// Attach select choices (the order given is the natural sort order).
    #[must_use]
    pub fn with_choices(mut self, choices: &[&str]) -> Self {
        self.options.choices = choices.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Position of a value in this field's choice list, if any.
    #[must_use]
    pub fn choice_index(&self, value: &str) -> Option<usize> {
        self.options.choices.iter().position(|c| c == value)
    }
}

/// Look up a field's metadata by name.
#[must_use]
pub fn find_field<'a>(fields: &'a [FieldMeta], name: &str) -> Option<&'a FieldMeta> {
    fields.iter().find(|f| f.name == name)
}

/// The operator set appropriate for a field's declared type.
///
/// Violations are tolerated at evaluation time (an incompatible operator
/// degrades to a no-op filter), so this exists for UI option lists and for
/// warning on suspect persisted rows, never for rejection.
#[must_use]
pub fn operators_for(field_type: FieldType) -> &'static [Operator] {
    match field_type {
        FieldType::Text | FieldType::LongText | FieldType::Url | FieldType::Email => &[
            Operator::Equal,
            Operator::NotEqual,
            Operator::Contains,
            Operator::NotContains,
            Operator::IsEmpty,
            Operator::IsNotEmpty,
        ],
        FieldType::Number => &[
            Operator::Equal,
            Operator::NotEqual,
            Operator::GreaterThan,
            Operator::GreaterThanOrEqual,
            Operator::LessThan,
            Operator::LessThanOrEqual,
            Operator::IsEmpty,
            Operator::IsNotEmpty,
        ],
        FieldType::Date => &[
            Operator::DateEqual,
            Operator::DateBefore,
            Operator::DateAfter,
            Operator::DateOnOrBefore,
            Operator::DateOnOrAfter,
            Operator::DateRange,
            Operator::DateToday,
            Operator::DateNextDays,
            Operator::IsEmpty,
            Operator::IsNotEmpty,
        ],
        FieldType::Checkbox => &[Operator::Equal, Operator::NotEqual],
        FieldType::SingleSelect | FieldType::MultiSelect => &[
            Operator::Equal,
            Operator::NotEqual,
            Operator::IsEmpty,
            Operator::IsNotEmpty,
        ],
        // Computed fields render whatever their source type produces; allow
        // the text set so legacy filters keep evaluating.
        FieldType::Formula | FieldType::Lookup => &[
            Operator::Equal,
            Operator::NotEqual,
            Operator::Contains,
            Operator::NotContains,
            Operator::IsEmpty,
            Operator::IsNotEmpty,
        ],
    }
}

/// Whether an operator is drawn from the type-appropriate set for a field.
#[must_use]
pub fn operator_is_compatible(operator: Operator, field_type: FieldType) -> bool {
    operators_for(field_type).contains(&operator)
}
