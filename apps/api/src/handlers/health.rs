use axum::Json;
use axum::extract::State;

use crate::dto::HealthResponse;
use crate::state::AppState;

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let open_sessions = state
        .permission_editor_service
        .open_session_count()
        .await;

    Json(HealthResponse {
        status: "ok",
        open_sessions: u32::try_from(open_sessions).unwrap_or(u32::MAX),
    })
}
