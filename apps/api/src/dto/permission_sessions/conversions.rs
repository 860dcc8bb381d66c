use rolegrid_application::EditorSession;
use rolegrid_domain::UserGroupHeader;

use super::{
    ChildScreenResponse, PermissionSessionResponse, ScreenGroupResponse, UserGroupHeaderResponse,
};

impl From<&UserGroupHeader> for UserGroupHeaderResponse {
    fn from(value: &UserGroupHeader) -> Self {
        let audit = value.audit();
        Self {
            description: value.description().to_owned(),
            user_group_type: value.user_group_type().map(ToOwned::to_owned),
            create_by: audit.create_by.clone(),
            create_date: audit.create_date.clone(),
            modify_by: audit.modify_by.clone(),
            modify_date: audit.modify_date.clone(),
        }
    }
}

impl From<&EditorSession> for PermissionSessionResponse {
    fn from(value: &EditorSession) -> Self {
        let grid = value.grid();
        let groups = value
            .catalog()
            .parents()
            .iter()
            .map(|parent| ScreenGroupResponse {
                screen_id: parent.screen_id().as_str().to_owned(),
                screen_name: parent.screen_name().to_owned(),
                parent_name: parent.parent_name().to_owned(),
                expanded: value.expansion().is_expanded(parent.screen_id()),
                screens: parent
                    .children()
                    .iter()
                    .map(|child| {
                        let flags = grid
                            .flags(child.screen_id())
                            .unwrap_or_else(|| child.flags());
                        ChildScreenResponse {
                            screen_id: child.screen_id().as_str().to_owned(),
                            screen_name: child.screen_name().to_owned(),
                            read: flags.read,
                            write: flags.write,
                            delete: flags.delete,
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            session_id: value.id().to_string(),
            user_group_id: value.key().user_group_id().as_str().to_owned(),
            company_id: value.key().company_id().as_str().to_owned(),
            mode: value.mode().as_str().to_owned(),
            phase: value.phase().as_str().to_owned(),
            last_error: value.last_error().map(ToOwned::to_owned),
            header: value.header().map(UserGroupHeaderResponse::from),
            groups,
        }
    }
}

impl From<EditorSession> for PermissionSessionResponse {
    fn from(value: EditorSession) -> Self {
        Self::from(&value)
    }
}
