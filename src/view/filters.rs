//! Loading and saving a view's filter rows.
//!
//! A view owns its filter groups and filters: they are written together,
//! reloaded together, and never cached independently of each other. A
//! malformed persisted row is skipped with a warning instead of failing the
//! view, because this data is user-editable and must never crash rendering.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::warn;

use crate::filter::{
    db_filters_to_tree, filter_configs_to_tree, tree_to_db_filters, ConditionType, FilterConfig,
    FilterTree, Operator, ViewFilter, ViewFilterGroup,
};
use crate::store::{list_rows_with_recovery, RowQuery, StoreError, TableStore};
use crate::schema::TableRow;

const FILTERS_TABLE: &str = "view_filters";
const GROUPS_TABLE: &str = "view_filter_groups";

/// Load a view's filter rows and group rows together.
///
/// # Errors
///
/// Returns [`StoreError`] when either listing fails (after the one
/// missing-relation recovery attempt).
pub async fn load_view_filter_rows(
    store: &dyn TableStore,
    view_id: &str,
) -> Result<(Vec<ViewFilter>, Vec<ViewFilterGroup>), StoreError> {
    let query = by_view_query(view_id);
    let (filter_rows, group_rows) = futures::try_join!(
        list_rows_with_recovery(store, FILTERS_TABLE, &query),
        list_rows_with_recovery(store, GROUPS_TABLE, &query),
    )?;
    Ok((decode_rows(&filter_rows), decode_rows(&group_rows)))
}

/// Load a view's filters as the canonical tree.
///
/// # Errors
///
/// Returns [`StoreError`] when the underlying listings fail.
pub async fn load_view_filter_tree(
    store: &dyn TableStore,
    view_id: &str,
) -> Result<FilterTree, StoreError> {
    let (filters, groups) = load_view_filter_rows(store, view_id).await?;
    Ok(db_filters_to_tree(&filters, &groups))
}

/// Replace a view's persisted filters with the given tree.
///
/// Existing rows are removed and the new rows written in one pass so filters
/// and groups stay consistent with each other.
///
/// # Errors
///
/// Returns [`StoreError`] when any delete or insert fails.
pub async fn save_view_filter_tree(
    store: &dyn TableStore,
    view_id: &str,
    tree: &FilterTree,
) -> Result<(), StoreError> {
    let (existing_filters, existing_groups) = load_view_filter_rows(store, view_id).await?;
    for filter in &existing_filters {
        store.delete_row(FILTERS_TABLE, &filter.id).await?;
    }
    for group in &existing_groups {
        store.delete_row(GROUPS_TABLE, &group.id).await?;
    }

    let (filters, groups) = tree_to_db_filters(tree, view_id);
    for group in &groups {
        store.insert_row(GROUPS_TABLE, to_data(group)?).await?;
    }
    for filter in &filters {
        store.insert_row(FILTERS_TABLE, to_data(filter)?).await?;
    }
    Ok(())
}

fn by_view_query(view_id: &str) -> RowQuery {
    RowQuery::filtered(filter_configs_to_tree(
        &[FilterConfig::new("view_id", Operator::Equal, json!(view_id))],
        ConditionType::And,
    ))
}

/// Decode generic rows into a typed row shape, skipping malformed ones.
fn decode_rows<T: DeserializeOwned>(rows: &[TableRow]) -> Vec<T> {
    rows.iter()
        .filter_map(|row| {
            let mut object = row.data.clone();
            object
                .entry("id".to_string())
                .or_insert_with(|| json!(row.id));
            match serde_json::from_value(Value::Object(object)) {
                Ok(decoded) => Some(decoded),
                Err(err) => {
                    warn!(row_id = %row.id, error = %err, "skipping malformed persisted row");
                    None
                }
            }
        })
        .collect()
}

fn to_data<T: serde::Serialize>(row: &T) -> Result<serde_json::Map<String, Value>, StoreError> {
    match serde_json::to_value(row)? {
        Value::Object(object) => Ok(object),
        other => Err(StoreError::MalformedRow(format!(
            "expected object row, got {other}"
        ))),
    }
}
