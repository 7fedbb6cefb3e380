//! Data-store abstraction.
//!
//! The real backing store lives outside this crate and is consumed through
//! [`TableStore`]; the in-memory implementation here is the reference
//! semantics for filter translation and what the tests run against. Failed
//! calls are terminal per attempt; the only automatic recovery anywhere is
//! the single create-and-retry for a missing relation.

pub mod error;
pub mod memory;

pub use error::{StoreError, MISSING_RELATION_CODES};
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::filter::FilterTree;
use crate::schema::TableRow;
use crate::view::types::ViewSort;

/// A declarative row query: projection, filter tree, sorts, and paging.
#[derive(Debug, Clone, Default)]
pub struct RowQuery {
    /// Columns (field names) to project; `None` selects everything.
    pub columns: Option<Vec<String>>,
    pub filter: FilterTree,
    pub sorts: Vec<ViewSort>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl RowQuery {
    #[must_use]
    pub fn filtered(filter: FilterTree) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_sorts(mut self, sorts: Vec<ViewSort>) -> Self {
        self.sorts = sorts;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// The store surface the resolution engine needs: generic row CRUD plus
/// table creation for the missing-relation recovery path.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Execute a row query against a table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on backend failure; a missing relation carries
    /// one of [`MISSING_RELATION_CODES`].
    async fn list_rows(&self, table: &str, query: &RowQuery) -> Result<Vec<TableRow>, StoreError>;

    /// Insert one row and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on backend failure.
    async fn insert_row(&self, table: &str, data: Map<String, Value>)
        -> Result<TableRow, StoreError>;

    /// Patch one row's data by id and return the updated row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RowNotFound`] when the id does not exist.
    async fn update_row(
        &self,
        table: &str,
        row_id: &str,
        patch: Map<String, Value>,
    ) -> Result<TableRow, StoreError>;

    /// Delete one row by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RowNotFound`] when the id does not exist.
    async fn delete_row(&self, table: &str, row_id: &str) -> Result<(), StoreError>;

    /// Create an empty table (the missing-relation recovery action).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on backend failure.
    async fn create_table(&self, table: &str) -> Result<(), StoreError>;
}

/// List rows, attempting the one sanctioned recovery: when the relation is
/// missing, create it and retry exactly once. Every other failure is
/// terminal for this attempt.
///
/// # Errors
///
/// Propagates the underlying [`StoreError`] when recovery does not apply or
/// the retry fails too.
pub async fn list_rows_with_recovery(
    store: &dyn TableStore,
    table: &str,
    query: &RowQuery,
) -> Result<Vec<TableRow>, StoreError> {
    match store.list_rows(table, query).await {
        Ok(rows) => Ok(rows),
        Err(err) if err.is_missing_relation() => {
            warn!(table = %table, error = %err, "table does not exist, attempting to create it");
            store.create_table(table).await?;
            info!(table = %table, "table created; retrying query");
            store.list_rows(table, query).await
        }
        Err(err) => Err(err),
    }
}
