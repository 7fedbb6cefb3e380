//! Layered record-action authorization.
//!
//! Page-level permissions decide what a role may do at all; block-level
//! permissions may only restrict further, never loosen. Denials are plain
//! `false` returns (the cascade is a set of pure predicates, not an error
//! path) and calling UI code checks them before exposing an action.

use serde::{Deserialize, Serialize};

/// Resolved user role. `None` means unauthenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

impl Role {
    #[must_use]
    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

/// Who a page-level record action is open to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    /// Admins only.
    Admin,
    /// Admins and non-admin members alike.
    Both,
}

fn default_create_level() -> PermissionLevel {
    PermissionLevel::Both
}

fn default_delete_level() -> PermissionLevel {
    PermissionLevel::Admin
}

/// Page-level record-action configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordActionPermissions {
    #[serde(default = "default_create_level")]
    pub create: PermissionLevel,
    #[serde(default = "default_delete_level")]
    pub delete: PermissionLevel,
}

impl Default for RecordActionPermissions {
    fn default() -> Self {
        Self {
            create: default_create_level(),
            delete: default_delete_level(),
        }
    }
}

/// Whether a block renders read-only or editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockMode {
    View,
    Edit,
}

fn default_block_mode() -> BlockMode {
    BlockMode::Edit
}

fn default_true() -> bool {
    true
}

/// Block-level permission overrides.
///
/// `mode` is the master switch: a `view`-mode block denies every create and
/// delete operation regardless of the individual flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockPermissions {
    #[serde(default = "default_block_mode")]
    pub mode: BlockMode,
    #[serde(default = "default_true")]
    pub allow_inline_create: bool,
    #[serde(default = "default_true")]
    pub allow_inline_delete: bool,
    #[serde(default = "default_true")]
    pub allow_open_record: bool,
}

impl Default for BlockPermissions {
    fn default() -> Self {
        Self {
            mode: BlockMode::Edit,
            allow_inline_create: true,
            allow_inline_delete: true,
            allow_open_record: true,
        }
    }
}

/// Page-level create check: admin always passes, an unauthenticated caller
/// never does, and everyone else needs the action opened to `both`.
#[must_use]
pub fn page_can_create_record(role: Option<Role>, permissions: &RecordActionPermissions) -> bool {
    role_passes(role, permissions.create)
}

/// Page-level delete check; same resolution as create.
#[must_use]
pub fn page_can_delete_record(role: Option<Role>, permissions: &RecordActionPermissions) -> bool {
    role_passes(role, permissions.delete)
}

fn role_passes(role: Option<Role>, level: PermissionLevel) -> bool {
    match role {
        None => false,
        Some(Role::Admin) => true,
        Some(_) => level == PermissionLevel::Both,
    }
}

/// Cascaded create check.
///
/// The page decides first; a block context can then still deny (view mode or
/// inline create switched off) but can never re-allow what the page denied.
/// Without a block context this is exactly the page-level check, so pages
/// predating block permissions behave unchanged.
#[must_use]
pub fn can_create_record(
    role: Option<Role>,
    permissions: &RecordActionPermissions,
    block: Option<&BlockPermissions>,
) -> bool {
    if !page_can_create_record(role, permissions) {
        return false;
    }
    block.is_none_or(|b| b.mode == BlockMode::Edit && b.allow_inline_create)
}

/// Cascaded delete check; mirrors [`can_create_record`] with the inline
/// delete flag.
#[must_use]
pub fn can_delete_record(
    role: Option<Role>,
    permissions: &RecordActionPermissions,
    block: Option<&BlockPermissions>,
) -> bool {
    if !page_can_delete_record(role, permissions) {
        return false;
    }
    block.is_none_or(|b| b.mode == BlockMode::Edit && b.allow_inline_delete)
}

/// Block-only edit check; defaults to allowed when no block context exists.
#[must_use]
pub fn can_edit_records(block: Option<&BlockPermissions>) -> bool {
    block.is_none_or(|b| b.mode == BlockMode::Edit)
}

/// Block-only open-record check; defaults to allowed when no block context
/// exists.
#[must_use]
pub fn can_open_record(block: Option<&BlockPermissions>) -> bool {
    block.is_none_or(|b| b.allow_open_record)
}
