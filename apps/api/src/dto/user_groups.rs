use rolegrid_domain::UserGroupSummary;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Query string of the user group list.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/user-group-list-query.ts"
)]
pub struct UserGroupListQuery {
    pub search: Option<String>,
}

/// API representation of one roles-table row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/user-group-response.ts"
)]
pub struct UserGroupResponse {
    pub user_group_id: String,
    pub company_id: String,
    pub description: String,
    pub status: Option<String>,
}

impl From<UserGroupSummary> for UserGroupResponse {
    fn from(value: UserGroupSummary) -> Self {
        Self {
            user_group_id: value.key().user_group_id().as_str().to_owned(),
            company_id: value.key().company_id().as_str().to_owned(),
            description: value.description().to_owned(),
            status: value.status().map(ToOwned::to_owned),
        }
    }
}
