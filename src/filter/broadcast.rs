//! Page-scoped broadcast registry for filter-emitting blocks.
//!
//! Several filter blocks on one page each publish a filter payload and a
//! target list; consuming blocks pull the union of everything aimed at them.
//! Every update is gated by a signature over the full payload so a re-render
//! publishing identical state causes no transition at all. That gate is what
//! keeps a filter block and its consumers from feeding each other an endless
//! update loop. The registry lives as long as its page and is dropped with it.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use tokio::sync::watch;
use tracing::debug;

use super::convert::{and_filter_trees, filter_configs_to_tree};
use super::model::{ConditionType, FilterConfig, FilterTree};

/// Which blocks an emitter aims its filters at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BroadcastTarget {
    /// Every block on the page, gated by table compatibility.
    All(AllMarker),
    /// An explicit block-id list, no table gating.
    Blocks(Vec<String>),
}

/// Serialized form of the `'all'` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllMarker {
    All,
}

impl BroadcastTarget {
    #[must_use]
    pub fn all() -> Self {
        BroadcastTarget::All(AllMarker::All)
    }

    #[must_use]
    pub fn blocks(ids: &[&str]) -> Self {
        BroadcastTarget::Blocks(ids.iter().map(|id| (*id).to_string()).collect())
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, BroadcastTarget::All(_))
    }
}

/// One emitter's published state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterBlockState {
    pub block_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub filters: Vec<FilterConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_tree: Option<FilterTree>,
    pub target_blocks: BroadcastTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    /// Stable digest of the payload, used to suppress redundant updates.
    pub signature: String,
}

impl FilterBlockState {
    /// The emitter's canonical tree (explicit tree when published, otherwise
    /// the flat list AND-wrapped).
    #[must_use]
    pub fn tree(&self) -> FilterTree {
        match &self.filter_tree {
            Some(tree) => tree.clone(),
            None => filter_configs_to_tree(&self.filters, ConditionType::And),
        }
    }

    /// Whether this emitter's filters apply to a consuming block.
    ///
    /// `'all'` targeting is additionally gated by table compatibility: when
    /// both sides declare a table id they must match; a missing id on either
    /// side skips the check.
    #[must_use]
    pub fn targets(&self, block_id: &str, block_table_id: Option<&str>) -> bool {
        match &self.target_blocks {
            BroadcastTarget::All(_) => match (&self.table_id, block_table_id) {
                (Some(emitter_table), Some(consumer_table)) => emitter_table == consumer_table,
                _ => true,
            },
            BroadcastTarget::Blocks(ids) => ids.iter().any(|id| id == block_id),
        }
    }
}

/// Payload for [`FilterBroadcast::update_filter_block`].
#[derive(Debug, Clone, Default)]
pub struct FilterBlockUpdate {
    pub filters: Vec<FilterConfig>,
    pub target_blocks: Option<BroadcastTarget>,
    pub title: Option<String>,
    pub filter_tree: Option<FilterTree>,
    pub table_id: Option<String>,
}

/// The page-scoped registry.
///
/// All state lives behind one mutex; change notification is a monotonically
/// increasing generation published through a watch channel so consumers can
/// re-pull lazily instead of receiving pushed payloads.
#[derive(Debug)]
pub struct FilterBroadcast {
    // Registration order is meaningful: flat resolution is last-wins.
    states: Mutex<Vec<FilterBlockState>>,
    generation: watch::Sender<u64>,
}

impl FilterBroadcast {
    #[must_use]
    pub fn new() -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            states: Mutex::new(Vec::new()),
            generation,
        }
    }

    /// Publish an emitter's current filter state.
    ///
    /// Returns `true` when the registry changed. A payload identical to the
    /// stored one (same signature) is a no-op: no state transition, no
    /// notification.
    pub fn update_filter_block(&self, block_id: &str, update: FilterBlockUpdate) -> bool {
        let target_blocks = update.target_blocks.unwrap_or_else(BroadcastTarget::all);
        let signature = compute_signature(
            block_id,
            &update.filters,
            &target_blocks,
            update.title.as_deref(),
            update.filter_tree.as_ref(),
            update.table_id.as_deref(),
        );

        let mut states = lock_states(&self.states);
        let position = states.iter().position(|s| s.block_id == block_id);
        if let Some(index) = position {
            if states.get(index).is_some_and(|s| s.signature == signature) {
                debug!(block_id = %block_id, "filter block update unchanged; skipping");
                return false;
            }
        }

        let state = FilterBlockState {
            block_id: block_id.to_string(),
            title: update.title,
            filters: update.filters,
            filter_tree: update.filter_tree,
            target_blocks,
            table_id: update.table_id,
            signature,
        };
        match position {
            // A re-registration keeps its slot so flat resolution order stays
            // stable across updates.
            Some(index) => {
                if let Some(slot) = states.get_mut(index) {
                    *slot = state;
                }
            }
            None => states.push(state),
        }
        drop(states);
        self.bump();
        true
    }

    /// Remove an emitter (its block unmounted). Returns `true` if present.
    pub fn remove_filter_block(&self, block_id: &str) -> bool {
        let mut states = lock_states(&self.states);
        let before = states.len();
        states.retain(|s| s.block_id != block_id);
        let removed = states.len() != before;
        drop(states);
        if removed {
            self.bump();
        }
        removed
    }

    /// Flat filters aimed at a block, last-registered-wins per field.
    #[must_use]
    pub fn filters_for_block(
        &self,
        block_id: &str,
        block_table_id: Option<&str>,
    ) -> Vec<FilterConfig> {
        let states = lock_states(&self.states);
        let mut merged: Vec<FilterConfig> = Vec::new();
        let mut by_field: HashMap<String, usize> = HashMap::new();
        for state in states.iter().filter(|s| s.targets(block_id, block_table_id)) {
            for filter in &state.filters {
                match by_field.get(&filter.field) {
                    Some(&index) => {
                        if let Some(slot) = merged.get_mut(index) {
                            *slot = filter.clone();
                        }
                    }
                    None => {
                        by_field.insert(filter.field.clone(), merged.len());
                        merged.push(filter.clone());
                    }
                }
            }
        }
        merged
    }

    /// Canonical tree aimed at a block: all qualifying emitters' trees
    /// AND-combined. Unlike the flat form there is no per-field override
    /// here; every emitter narrows.
    #[must_use]
    pub fn filter_tree_for_block(
        &self,
        block_id: &str,
        block_table_id: Option<&str>,
    ) -> FilterTree {
        let states = lock_states(&self.states);
        let trees: Vec<FilterTree> = states
            .iter()
            .filter(|s| s.targets(block_id, block_table_id))
            .map(FilterBlockState::tree)
            .collect();
        drop(states);
        and_filter_trees(trees)
    }

    /// Snapshot of one emitter's state.
    #[must_use]
    pub fn block_state(&self, block_id: &str) -> Option<FilterBlockState> {
        lock_states(&self.states)
            .iter()
            .find(|s| s.block_id == block_id)
            .cloned()
    }

    /// Number of registered emitters.
    #[must_use]
    pub fn len(&self) -> usize {
        lock_states(&self.states).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock_states(&self.states).is_empty()
    }

    /// Current change generation; bumps once per real state transition.
    #[must_use]
    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    /// Subscribe to change notifications (the watch value is the generation).
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    fn bump(&self) {
        self.generation
            .send_modify(|generation| *generation = generation.wrapping_add(1));
    }
}

impl Default for FilterBroadcast {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_states(states: &Mutex<Vec<FilterBlockState>>) -> std::sync::MutexGuard<'_, Vec<FilterBlockState>> {
    match states.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Stable SHA-256 digest over the full update payload.
fn compute_signature(
    block_id: &str,
    filters: &[FilterConfig],
    target_blocks: &BroadcastTarget,
    title: Option<&str>,
    filter_tree: Option<&FilterTree>,
    table_id: Option<&str>,
) -> String {
    let payload = json!({
        "block_id": block_id,
        "filters": filters,
        "target_blocks": target_blocks,
        "title": title,
        "filter_tree": filter_tree,
        "table_id": table_id,
    });
    let serialized = payload.to_string();
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    hex::encode(hasher.finalize())
}
