//! Application services and ports.

#![forbid(unsafe_code)]

mod backend_call;
mod catalog_loader;
mod editor_session;
mod grid_edit_state;
mod group_expansion_state;
mod permission_editor_service;
mod save_orchestrator;
mod session_registry;
mod user_group_directory_service;
mod user_group_ports;

#[cfg(test)]
mod test_gateway;

pub use catalog_loader::{LoadedCatalog, ScreenCatalogLoader};
pub use editor_session::{
    EditorSession, LoadOutcome, SaveOutcome, SessionId, SessionPhase, SessionTicket,
};
pub use grid_edit_state::GridEditState;
pub use group_expansion_state::GroupExpansionState;
pub use permission_editor_service::PermissionEditorService;
pub use save_orchestrator::{SaveContext, SaveHeaderInput, SaveOrchestrator, build_save_request};
pub use session_registry::SessionRegistry;
pub use user_group_directory_service::UserGroupDirectoryService;
pub use user_group_ports::{EditorMode, SaveUserGroupRequest, UserGroupGateway, UserGroupSnapshot};
