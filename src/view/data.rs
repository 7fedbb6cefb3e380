//! Row loading for view-rendering blocks.
//!
//! Combines the three filter sources under their precedence rules, decides
//! between server-side and client-side sorting, and runs the store call with
//! explicit cancellation so a slow fetch cannot race a navigation. Failures
//! are local to the requesting block: the error is returned to that block's
//! caller and never blocks other blocks' independent loads.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::filter::{
    and_filter_trees, filter_configs_to_tree, ConditionType, FilterConfig, FilterTree,
};
use crate::schema::{FieldMeta, TableRow};
use crate::store::{list_rows_with_recovery, RowQuery, StoreError, TableStore};
use crate::user_config::DEFAULT_FETCH_PAGE_SIZE;

use super::sort::{should_use_client_side_sorting, sort_rows};
use super::types::ViewSort;

/// Everything a block needs resolved before its rows can load.
#[derive(Debug, Clone)]
pub struct ViewDataRequest {
    pub table: String,
    pub fields: Vec<FieldMeta>,
    /// The block's configured base filters (never overridable).
    pub base_filter: FilterTree,
    /// Union of broadcast filters aimed at this block.
    pub broadcast_filter: FilterTree,
    /// Transient narrowing from search/quick-filter UI state.
    pub transient_filters: Vec<FilterConfig>,
    pub sorts: Vec<ViewSort>,
    pub offset: usize,
    pub limit: usize,
    /// Fetch ceiling for the client-side sorting fallback.
    pub fetch_page_size: usize,
}

impl ViewDataRequest {
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: Vec::new(),
            base_filter: FilterTree::empty(),
            broadcast_filter: FilterTree::empty(),
            transient_filters: Vec::new(),
            sorts: Vec::new(),
            offset: 0,
            limit: 100,
            fetch_page_size: DEFAULT_FETCH_PAGE_SIZE,
        }
    }

    /// The effective filter: base AND broadcast AND transient. Every source
    /// narrows; none replaces another.
    #[must_use]
    pub fn effective_filter(&self) -> FilterTree {
        and_filter_trees(vec![
            self.base_filter.clone(),
            self.broadcast_filter.clone(),
            filter_configs_to_tree(&self.transient_filters, ConditionType::And),
        ])
    }
}

/// A loaded page of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewData {
    pub rows: Vec<TableRow>,
    /// Whether sorting ran application-side over a larger fetch.
    pub client_sorted: bool,
}

/// Load one block's page of rows.
///
/// When a sort targets a select field the backend cannot order correctly,
/// a larger page is fetched unsorted and ordered here; otherwise sorting and
/// paging are pushed down to the store.
///
/// # Errors
///
/// Returns [`StoreError::Cancelled`] when `cancel` fires first, or the
/// underlying store error (after the one missing-relation recovery).
pub async fn load_view_rows(
    store: &dyn TableStore,
    request: &ViewDataRequest,
    cancel: &CancellationToken,
) -> Result<ViewData, StoreError> {
    let filter = request.effective_filter();
    let client_sorted = should_use_client_side_sorting(&request.sorts, &request.fields);

    let query = if client_sorted {
        debug!(
            table = %request.table,
            "sort requires choice ordering; falling back to client-side sorting"
        );
        RowQuery::filtered(filter).with_limit(request.fetch_page_size)
    } else {
        RowQuery::filtered(filter)
            .with_sorts(request.sorts.clone())
            .with_offset(request.offset)
            .with_limit(request.limit)
    };

    // Checked before the fetch so an already-cancelled token never queries.
    let mut rows = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(StoreError::Cancelled),
        result = list_rows_with_recovery(store, &request.table, &query) => result?,
    };

    if client_sorted {
        sort_rows(&mut rows, &request.sorts, &request.fields);
        rows = rows
            .into_iter()
            .skip(request.offset)
            .take(request.limit)
            .collect();
    }

    Ok(ViewData { rows, client_sorted })
}
