//! Views over tables: persisted row shapes, filter persistence, sorting,
//! and the block-facing data loader.

pub mod data;
pub mod filters;
pub mod quick;
pub mod sort;
pub mod types;

pub use data::{load_view_rows, ViewData, ViewDataRequest};
pub use filters::{load_view_filter_rows, load_view_filter_tree, save_view_filter_tree};
pub use quick::QuickFilterSession;
pub use sort::{compare_field_values, should_use_client_side_sorting, sort_rows};
pub use types::{GridViewSettings, SortDirection, View, ViewField, ViewKind, ViewSort};
