//! Per-view quick-filter session state.
//!
//! Quick filters are transient UI state: they live for the session, are
//! keyed by view, and never touch persistence. Resolution against the view's
//! builder-defined defaults is the override merge: a user's quick filter
//! replaces the default for its field rather than narrowing it.

use std::collections::HashMap;

use crate::filter::{merge_view_defaults_with_quick_filters, FilterConfig};

/// Session-scoped quick filters, keyed by view id.
#[derive(Debug, Clone, Default)]
pub struct QuickFilterSession {
    by_view: HashMap<String, Vec<FilterConfig>>,
}

impl QuickFilterSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a view's quick filters. An empty list clears the entry.
    pub fn set(&mut self, view_id: &str, filters: Vec<FilterConfig>) {
        if filters.is_empty() {
            self.by_view.remove(view_id);
        } else {
            self.by_view.insert(view_id.to_string(), filters);
        }
    }

    /// Drop a view's quick filters (e.g. the "clear filters" action).
    pub fn clear(&mut self, view_id: &str) {
        self.by_view.remove(view_id);
    }

    /// The raw quick filters for a view, if any.
    #[must_use]
    pub fn get(&self, view_id: &str) -> &[FilterConfig] {
        self.by_view.get(view_id).map_or(&[], Vec::as_slice)
    }

    /// Resolve a view's effective flat filters: defaults overridden per-field
    /// by whatever the user set this session.
    #[must_use]
    pub fn resolve(&self, view_id: &str, defaults: &[FilterConfig]) -> Vec<FilterConfig> {
        merge_view_defaults_with_quick_filters(defaults, self.get(view_id))
    }
}
