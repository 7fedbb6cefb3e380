//! Interface pages: block rows, config validation, sizing, and the page-level
//! permission configuration.

pub mod block;
pub mod config;

pub use block::{
    effective_block_sizing, Block, BlockPosition, BlockSizing, BlockType, LayoutError,
    PlacedPosition,
};
pub use config::{
    default_block_config, normalize_block_config, validate_block_config, ValidationReport,
};

use serde::{Deserialize, Serialize};

use crate::permission::RecordActionPermissions;

/// A persisted interface page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub name: String,
    /// Page-level record-action permissions; blocks may only restrict these.
    #[serde(default)]
    pub permissions: RecordActionPermissions,
}
