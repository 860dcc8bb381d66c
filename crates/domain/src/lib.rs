//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod merge;
mod permission;
mod screen;
mod user_group;

pub use merge::{merge_permissions, orphaned_records};
pub use permission::{PermissionFlags, PermissionKind, PermissionRecord};
pub use screen::{ChildScreen, ScreenCatalog, ScreenId, ScreenNode};
pub use user_group::{
    AuditStamp, CompanyId, UserGroupHeader, UserGroupId, UserGroupKey, UserGroupSummary,
    UserGroupType,
};
