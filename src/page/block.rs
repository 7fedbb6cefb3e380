//! Interface-page blocks: type discriminator, layout sizing invariant, and
//! grid-position integrity.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::error;

/// Block type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Grid,
    Chart,
    Kpi,
    Form,
    Filter,
    Record,
    Text,
    Field,
    Action,
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BlockType::Grid => "grid",
            BlockType::Chart => "chart",
            BlockType::Kpi => "kpi",
            BlockType::Form => "form",
            BlockType::Filter => "filter",
            BlockType::Record => "record",
            BlockType::Text => "text",
            BlockType::Field => "field",
            BlockType::Action => "action",
        };
        write!(f, "{s}")
    }
}

/// How a block wants to size itself inside the page layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockSizing {
    /// Stretch to the layout cell.
    Fill,
    /// Size to intrinsic content.
    Content,
}

/// Block types allowed to keep a `fill` sizing request. Currently none; the
/// list exists so a future layout-container type can opt in.
const FILL_ALLOWED: &[BlockType] = &[];

/// Types whose `fill` request indicates a caller bug rather than a legacy
/// config quirk.
const FILL_HARD_BLOCKED: &[BlockType] = &[BlockType::Text, BlockType::Field];

/// Collapse a sizing request to what the layout actually supports.
///
/// Everything collapses to `content` unless the type is allow-listed.
/// `text` and `field` asking for `fill` is a development-time error: it is
/// logged and corrected rather than allowed to misrender.
#[must_use]
pub fn effective_block_sizing(block_type: BlockType, requested: BlockSizing) -> BlockSizing {
    if requested == BlockSizing::Content {
        return BlockSizing::Content;
    }
    if FILL_ALLOWED.contains(&block_type) {
        return BlockSizing::Fill;
    }
    if FILL_HARD_BLOCKED.contains(&block_type) {
        error!(
            block_type = %block_type,
            "block type must never use fill sizing; forcing content"
        );
    }
    BlockSizing::Content
}

/// Corrupted layout state is the one inconsistency this crate treats as
/// fatal: partial nulls mean a data-integrity bug that silent recovery would
/// only mask.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Block {block_id} has a partially null grid position")]
    PartialPosition { block_id: String },
}

/// Persisted grid coordinates. All-null means the block has not been placed
/// yet, which is valid; a mix of null and non-null is corrupt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockPosition {
    #[serde(default)]
    pub x: Option<i64>,
    #[serde(default)]
    pub y: Option<i64>,
    #[serde(default)]
    pub w: Option<i64>,
    #[serde(default)]
    pub h: Option<i64>,
}

/// A fully resolved grid placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedPosition {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl BlockPosition {
    /// Resolve to a placement, `None` for an unplaced block.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::PartialPosition`] when some but not all
    /// coordinates are set.
    pub fn resolve(&self, block_id: &str) -> Result<Option<PlacedPosition>, LayoutError> {
        match (self.x, self.y, self.w, self.h) {
            (Some(x), Some(y), Some(w), Some(h)) => Ok(Some(PlacedPosition { x, y, w, h })),
            (None, None, None, None) => Ok(None),
            _ => Err(LayoutError::PartialPosition {
                block_id: block_id.to_string(),
            }),
        }
    }
}

/// A persisted interface-page block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub page_id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(default)]
    pub config: Value,
    #[serde(flatten)]
    pub position: BlockPosition,
    #[serde(default)]
    pub order_index: i32,
}

impl Block {
    /// Resolve this block's grid placement.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::PartialPosition`] for corrupt coordinates.
    pub fn placement(&self) -> Result<Option<PlacedPosition>, LayoutError> {
        self.position.resolve(&self.id)
    }
}
