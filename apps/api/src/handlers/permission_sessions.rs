use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use rolegrid_application::{EditorMode, SaveHeaderInput, SessionId};
use rolegrid_core::ActorIdentity;
use rolegrid_domain::{PermissionKind, ScreenId, UserGroupKey};

use crate::dto::{
    OpenPermissionSessionRequest, PermissionSessionResponse, SavePermissionSessionRequest,
    TogglePermissionRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn open_permission_session_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Json(payload): Json<OpenPermissionSessionRequest>,
) -> ApiResult<(StatusCode, Json<PermissionSessionResponse>)> {
    let key = UserGroupKey::parse(payload.user_group_id, payload.company_id)?;
    let mode = EditorMode::from_str(payload.mode.as_str())?;

    let session = state
        .permission_editor_service
        .open_session(&actor, key, mode)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PermissionSessionResponse::from(session)),
    ))
}

pub async fn get_permission_session_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<PermissionSessionResponse>> {
    let session = state
        .permission_editor_service
        .session(&actor, SessionId::parse(session_id.as_str())?)
        .await?;

    Ok(Json(PermissionSessionResponse::from(session)))
}

pub async fn close_permission_session_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(session_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .permission_editor_service
        .close_session(&actor, SessionId::parse(session_id.as_str())?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn reload_permission_session_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<PermissionSessionResponse>> {
    let session = state
        .permission_editor_service
        .reload_session(&actor, SessionId::parse(session_id.as_str())?)
        .await?;

    Ok(Json(PermissionSessionResponse::from(session)))
}

pub async fn toggle_permission_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(session_id): Path<String>,
    Json(payload): Json<TogglePermissionRequest>,
) -> ApiResult<Json<PermissionSessionResponse>> {
    let session_id = SessionId::parse(session_id.as_str())?;
    let screen_id = ScreenId::new(payload.screen_id)?;
    let kind = PermissionKind::from_transport(payload.permission.as_str())?;

    let session = state
        .permission_editor_service
        .toggle_permission(&actor, session_id, &screen_id, kind)
        .await?;

    Ok(Json(PermissionSessionResponse::from(session)))
}

pub async fn toggle_group_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path((session_id, screen_id)): Path<(String, String)>,
) -> ApiResult<Json<PermissionSessionResponse>> {
    let session_id = SessionId::parse(session_id.as_str())?;
    let screen_id = ScreenId::new(screen_id)?;

    let session = state
        .permission_editor_service
        .toggle_group(&actor, session_id, &screen_id)
        .await?;

    Ok(Json(PermissionSessionResponse::from(session)))
}

pub async fn save_permission_session_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(session_id): Path<String>,
    Json(payload): Json<SavePermissionSessionRequest>,
) -> ApiResult<Json<PermissionSessionResponse>> {
    let session = state
        .permission_editor_service
        .save_session(
            &actor,
            SessionId::parse(session_id.as_str())?,
            SaveHeaderInput {
                user_group_id: payload.user_group_id,
                company_id: payload.company_id,
                description: payload.description,
                user_group_type: payload.user_group_type,
            },
        )
        .await?;

    Ok(Json(PermissionSessionResponse::from(session)))
}

pub async fn cancel_permission_session_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<PermissionSessionResponse>> {
    let session = state
        .permission_editor_service
        .cancel_session(&actor, SessionId::parse(session_id.as_str())?)
        .await?;

    Ok(Json(PermissionSessionResponse::from(session)))
}
