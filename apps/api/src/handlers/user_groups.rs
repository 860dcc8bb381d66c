use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;

use rolegrid_core::ActorIdentity;
use rolegrid_domain::UserGroupKey;

use crate::dto::{UserGroupListQuery, UserGroupResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_user_groups_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Query(query): Query<UserGroupListQuery>,
) -> ApiResult<Json<Vec<UserGroupResponse>>> {
    let user_groups = state
        .user_group_directory_service
        .list_user_groups(&actor, query.search.as_deref())
        .await?
        .into_iter()
        .map(UserGroupResponse::from)
        .collect();

    Ok(Json(user_groups))
}

pub async fn delete_user_group_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path((company_id, user_group_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let key = UserGroupKey::parse(user_group_id, company_id)?;
    state
        .user_group_directory_service
        .delete_user_group(&actor, &key)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
