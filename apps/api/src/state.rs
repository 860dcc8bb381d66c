use rolegrid_application::{PermissionEditorService, UserGroupDirectoryService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub permission_editor_service: PermissionEditorService,
    pub user_group_directory_service: UserGroupDirectoryService,
}
