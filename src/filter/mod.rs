//! Filter resolution: canonical model, converters, evaluation, precedence
//! merging, and the page-scoped broadcast registry.

pub mod broadcast;
pub mod convert;
pub mod eval;
pub mod matches;
pub mod merge;
pub mod model;

pub use broadcast::{
    AllMarker, BroadcastTarget, FilterBlockState, FilterBlockUpdate, FilterBroadcast,
};
pub use convert::{
    and_filter_trees, db_filters_to_tree, filter_configs_to_tree, filter_tree_to_configs,
    tree_to_db_filters, view_filter_to_config,
};
pub use eval::apply_filter_tree;
pub use matches::{current_day, is_empty_value, parse_date_value, row_matches_leaf, row_matches_tree};
pub use merge::{
    derive_default_values_from_filters, merge_filters, merge_view_defaults_with_quick_filters,
};
pub use model::{ConditionType, FilterConfig, FilterTree, Operator, ViewFilter, ViewFilterGroup};
