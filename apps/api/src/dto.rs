mod common;
mod permission_sessions;
mod user_groups;

pub use common::HealthResponse;
pub use permission_sessions::{
    OpenPermissionSessionRequest, PermissionSessionResponse, SavePermissionSessionRequest,
    TogglePermissionRequest,
};
pub use user_groups::{UserGroupListQuery, UserGroupResponse};
