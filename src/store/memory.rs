//! In-memory [`TableStore`] implementation.
//!
//! Backs the integration tests and doubles as the reference semantics for
//! predicate translation: whatever the real backend is expected to return
//! for a filter tree, this store computes with the same row-matching code
//! the client-side fallback uses.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::filter::matches::{current_day, row_matches_tree};
use crate::schema::{FieldMeta, TableRow};
use crate::view::sort::sort_rows;

use super::{RowQuery, StoreError, TableStore};

/// In-memory store keyed by table name.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<TableRow>>>,
    fields: RwLock<HashMap<String, Vec<FieldMeta>>>,
    /// Fixed "today" for the relative date operators; `None` uses the clock.
    today: Option<NaiveDate>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the relative-date anchor (for deterministic tests).
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Register field metadata for a table, enabling type-aware filtering
    /// and sorting.
    pub fn set_table_fields(&self, table: &str, fields: Vec<FieldMeta>) {
        write_lock(&self.fields).insert(table.to_string(), fields);
    }

    /// Create a table and seed it with rows.
    pub fn seed(&self, table: &str, rows: Vec<TableRow>) {
        write_lock(&self.tables).insert(table.to_string(), rows);
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(current_day)
    }

    fn table_fields(&self, table: &str) -> Vec<FieldMeta> {
        read_lock(&self.fields).get(table).cloned().unwrap_or_default()
    }

    fn missing_relation(table: &str) -> StoreError {
        StoreError::query("42P01", format!("relation \"{table}\" does not exist"))
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn list_rows(&self, table: &str, query: &RowQuery) -> Result<Vec<TableRow>, StoreError> {
        let fields = self.table_fields(table);
        let today = self.today();

        let tables = read_lock(&self.tables);
        let Some(rows) = tables.get(table) else {
            return Err(Self::missing_relation(table));
        };

        let mut selected: Vec<TableRow> = rows
            .iter()
            .filter(|row| row_matches_tree(&row.data, &query.filter, &fields, today))
            .cloned()
            .collect();
        drop(tables);

        sort_rows(&mut selected, &query.sorts, &fields);

        let offset = query.offset.unwrap_or(0);
        let mut page: Vec<TableRow> = selected.into_iter().skip(offset).collect();
        if let Some(limit) = query.limit {
            page.truncate(limit);
        }

        if let Some(columns) = &query.columns {
            for row in &mut page {
                row.data.retain(|key, _| columns.iter().any(|c| c == key));
            }
        }
        Ok(page)
    }

    async fn insert_row(
        &self,
        table: &str,
        data: Map<String, Value>,
    ) -> Result<TableRow, StoreError> {
        let mut tables = write_lock(&self.tables);
        let Some(rows) = tables.get_mut(table) else {
            return Err(Self::missing_relation(table));
        };
        // Honor a caller-provided id column, generate one otherwise.
        let id = data
            .get("id")
            .and_then(Value::as_str)
            .map_or_else(|| Uuid::new_v4().to_string(), ToString::to_string);
        let row = TableRow::new(id, data);
        rows.push(row.clone());
        Ok(row)
    }

    async fn update_row(
        &self,
        table: &str,
        row_id: &str,
        patch: Map<String, Value>,
    ) -> Result<TableRow, StoreError> {
        let mut tables = write_lock(&self.tables);
        let Some(rows) = tables.get_mut(table) else {
            return Err(Self::missing_relation(table));
        };
        let Some(row) = rows.iter_mut().find(|r| r.id == row_id) else {
            return Err(StoreError::RowNotFound(row_id.to_string()));
        };
        for (key, value) in patch {
            row.data.insert(key, value);
        }
        Ok(row.clone())
    }

    async fn delete_row(&self, table: &str, row_id: &str) -> Result<(), StoreError> {
        let mut tables = write_lock(&self.tables);
        let Some(rows) = tables.get_mut(table) else {
            return Err(Self::missing_relation(table));
        };
        let before = rows.len();
        rows.retain(|r| r.id != row_id);
        if rows.len() == before {
            return Err(StoreError::RowNotFound(row_id.to_string()));
        }
        Ok(())
    }

    async fn create_table(&self, table: &str) -> Result<(), StoreError> {
        write_lock(&self.tables)
            .entry(table.to_string())
            .or_default();
        Ok(())
    }
}

fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{filter_configs_to_tree, ConditionType, FilterConfig, Operator};
    use crate::schema::FieldType;
    use crate::view::types::{SortDirection, ViewSort};
    use serde_json::json;

    fn task(id: &str, status: &str, amount: i64) -> TableRow {
        let mut data = Map::new();
        data.insert("status".to_string(), json!(status));
        data.insert("amount".to_string(), json!(amount));
        TableRow::new(id, data)
    }

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.seed(
            "tasks",
            vec![
                task("r1", "open", 5),
                task("r2", "done", 20),
                task("r3", "done", 7),
            ],
        );
        store.set_table_fields(
            "tasks",
            vec![
                FieldMeta::new("status", FieldType::SingleSelect)
                    .with_choices(&["open", "done"]),
                FieldMeta::new("amount", FieldType::Number),
            ],
        );
        store
    }

    #[tokio::test]
    async fn test_filtered_listing() {
        let store = seeded();
        let tree = filter_configs_to_tree(
            &[FilterConfig::new("status", Operator::Equal, json!("done"))],
            ConditionType::And,
        );
        let rows = store
            .list_rows("tasks", &RowQuery::filtered(tree))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_sorted_and_paged_listing() {
        let store = seeded();
        let query = RowQuery::default()
            .with_sorts(vec![ViewSort::new("amount", SortDirection::Desc)])
            .with_limit(2);
        let rows = store.list_rows("tasks", &query).await.unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r2", "r3"]);
    }

    #[tokio::test]
    async fn test_column_projection() {
        let store = seeded();
        let query = RowQuery {
            columns: Some(vec!["status".to_string()]),
            ..RowQuery::default()
        };
        let rows = store.list_rows("tasks", &query).await.unwrap();
        let first = rows.first().unwrap();
        assert!(first.data.contains_key("status"));
        assert!(!first.data.contains_key("amount"));
    }

    #[tokio::test]
    async fn test_crud_roundtrip() {
        let store = seeded();
        let mut data = Map::new();
        data.insert("status".to_string(), json!("open"));
        let inserted = store.insert_row("tasks", data).await.unwrap();
        assert!(!inserted.id.is_empty());

        let mut patch = Map::new();
        patch.insert("status".to_string(), json!("done"));
        let updated = store.update_row("tasks", &inserted.id, patch).await.unwrap();
        assert_eq!(updated.value("status"), &json!("done"));

        store.delete_row("tasks", &inserted.id).await.unwrap();
        let missing = store.delete_row("tasks", &inserted.id).await;
        assert!(matches!(missing, Err(StoreError::RowNotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_table_is_missing_relation() {
        let store = MemoryStore::new();
        let err = store
            .list_rows("ghosts", &RowQuery::default())
            .await
            .unwrap_err();
        assert!(err.is_missing_relation());
    }
}
