// Allow panic/unwrap/expect in tests (denied globally via Cargo.toml lints)
#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        clippy::arithmetic_side_effects,
        clippy::indexing_slicing
    )
)]

pub mod filter;
pub mod logging;
pub mod page;
pub mod permission;
pub mod query;
pub mod schema;
pub mod store;
pub mod user_config;
pub mod view;

// Re-export commonly used types
pub use filter::{
    and_filter_trees, db_filters_to_tree, derive_default_values_from_filters,
    filter_configs_to_tree, filter_tree_to_configs, merge_filters,
    merge_view_defaults_with_quick_filters, row_matches_tree, apply_filter_tree,
    BroadcastTarget, ConditionType, FilterBlockState, FilterBlockUpdate, FilterBroadcast,
    FilterConfig, FilterTree, Operator, ViewFilter, ViewFilterGroup,
};
pub use page::{
    default_block_config, effective_block_sizing, normalize_block_config, validate_block_config,
    Block, BlockPosition, BlockSizing, BlockType, LayoutError, Page, PlacedPosition,
    ValidationReport,
};
pub use permission::{
    can_create_record, can_delete_record, can_edit_records, can_open_record,
    page_can_create_record, page_can_delete_record, BlockMode, BlockPermissions, PermissionLevel,
    RecordActionPermissions, Role,
};
pub use query::QueryBuilder;
pub use schema::{FieldMeta, FieldOptions, FieldType, TableMeta, TableRow};
pub use store::{
    list_rows_with_recovery, MemoryStore, RowQuery, StoreError, TableStore,
    MISSING_RELATION_CODES,
};
pub use user_config::{load_user_config, UserConfig, UserConfigError};
pub use view::{
    load_view_filter_tree, load_view_rows, save_view_filter_tree,
    should_use_client_side_sorting, sort_rows, GridViewSettings, QuickFilterSession,
    SortDirection, View, ViewData, ViewDataRequest, ViewField, ViewKind, ViewSort,
};
