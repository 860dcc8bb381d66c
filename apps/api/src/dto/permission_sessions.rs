use serde::{Deserialize, Serialize};
use ts_rs::TS;

mod conversions;

/// Incoming payload for opening a permission editing session.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/open-permission-session-request.ts"
)]
pub struct OpenPermissionSessionRequest {
    pub user_group_id: String,
    pub company_id: String,
    /// Either `create` or `edit`.
    pub mode: String,
}

/// Incoming payload for flipping one permission flag.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/toggle-permission-request.ts"
)]
pub struct TogglePermissionRequest {
    pub screen_id: String,
    /// One of `read`, `write`, `delete`.
    pub permission: String,
}

/// Incoming payload for saving the grid.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/save-permission-session-request.ts"
)]
pub struct SavePermissionSessionRequest {
    pub user_group_id: String,
    pub company_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub user_group_type: String,
}

/// Saved role metadata of an edited user group.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/user-group-header-response.ts"
)]
pub struct UserGroupHeaderResponse {
    pub description: String,
    pub user_group_type: Option<String>,
    pub create_by: Option<String>,
    pub create_date: Option<String>,
    pub modify_by: Option<String>,
    pub modify_date: Option<String>,
}

/// One child screen row with its current grid flags.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/child-screen-response.ts"
)]
pub struct ChildScreenResponse {
    pub screen_id: String,
    pub screen_name: String,
    pub read: bool,
    pub write: bool,
    pub delete: bool,
}

/// One collapsible parent screen group.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/screen-group-response.ts"
)]
pub struct ScreenGroupResponse {
    pub screen_id: String,
    pub screen_name: String,
    pub parent_name: String,
    pub expanded: bool,
    pub screens: Vec<ChildScreenResponse>,
}

/// API representation of a permission editing session.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-session-response.ts"
)]
pub struct PermissionSessionResponse {
    pub session_id: String,
    pub user_group_id: String,
    pub company_id: String,
    pub mode: String,
    /// One of `loading`, `load_failed`, `ready`, `saving`, `saved`.
    pub phase: String,
    pub last_error: Option<String>,
    pub header: Option<UserGroupHeaderResponse>,
    pub groups: Vec<ScreenGroupResponse>,
}
