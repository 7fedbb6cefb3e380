//! Table and field metadata consumed by the filter and sort engines.

pub mod field;
pub mod table;

pub use field::{
    find_field, operator_is_compatible, operators_for, FieldMeta, FieldOptions, FieldType,
};
pub use table::{TableMeta, TableRow};
