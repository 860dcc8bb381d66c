use std::fmt::{Display, Formatter};
use std::str::FromStr;

use async_trait::async_trait;
use rolegrid_core::{AppError, AppResult};
use rolegrid_domain::{
    PermissionRecord, ScreenCatalog, UserGroupHeader, UserGroupKey, UserGroupSummary,
};
use serde::{Deserialize, Serialize};

/// Whether an editing session creates a new user group or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorMode {
    /// Add a new user group; saved with `AddUserGroup`.
    Create,
    /// Edit an existing user group; saved with `UpdateUserGroup`.
    Edit,
}

impl EditorMode {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Edit => "edit",
        }
    }
}

impl FromStr for EditorMode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "create" => Ok(Self::Create),
            "edit" => Ok(Self::Edit),
            _ => Err(AppError::Validation(format!(
                "mode must be either 'create' or 'edit', got '{value}'"
            ))),
        }
    }
}

impl Display for EditorMode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Saved state of a user group as returned by `GetUserGroup`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserGroupSnapshot {
    /// Role metadata, absent when the group has never been saved.
    pub header: Option<UserGroupHeader>,
    /// Saved permission rows.
    pub details: Vec<PermissionRecord>,
}

/// Single atomic save request: one header row plus one detail row per grid entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveUserGroupRequest {
    /// Role-level metadata.
    pub header: UserGroupHeader,
    /// Permission rows for every child screen in the grid.
    pub details: Vec<PermissionRecord>,
}

/// Gateway port for the remote user group backend.
#[async_trait]
pub trait UserGroupGateway: Send + Sync {
    /// Fetches the two-level screen hierarchy (`GetScreenGroup`).
    async fn fetch_screen_catalog(&self, key: &UserGroupKey) -> AppResult<ScreenCatalog>;

    /// Fetches saved header and permission rows (`GetUserGroup`).
    async fn fetch_user_group(&self, key: &UserGroupKey) -> AppResult<UserGroupSnapshot>;

    /// Creates a user group with its permission rows (`AddUserGroup`).
    async fn add_user_group(&self, request: SaveUserGroupRequest) -> AppResult<()>;

    /// Replaces a user group's header and permission rows (`UpdateUserGroup`).
    async fn update_user_group(&self, request: SaveUserGroupRequest) -> AppResult<()>;

    /// Deletes a user group (`DeleteUserGroup`).
    async fn delete_user_group(&self, key: &UserGroupKey) -> AppResult<()>;

    /// Lists user groups for the directory table (`GETLookupData`).
    async fn list_user_groups(&self) -> AppResult<Vec<UserGroupSummary>>;
}
