use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{delete, get, post};
use rolegrid_core::AppError;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, permission_sessions, user_groups};
use crate::middleware;
use crate::state::AppState;

mod cors;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route(
            "/api/user-groups",
            get(user_groups::list_user_groups_handler),
        )
        .route(
            "/api/user-groups/{company_id}/{user_group_id}",
            delete(user_groups::delete_user_group_handler),
        )
        .route(
            "/api/permission-sessions",
            post(permission_sessions::open_permission_session_handler),
        )
        .route(
            "/api/permission-sessions/{session_id}",
            get(permission_sessions::get_permission_session_handler)
                .delete(permission_sessions::close_permission_session_handler),
        )
        .route(
            "/api/permission-sessions/{session_id}/reload",
            post(permission_sessions::reload_permission_session_handler),
        )
        .route(
            "/api/permission-sessions/{session_id}/permissions/toggle",
            post(permission_sessions::toggle_permission_handler),
        )
        .route(
            "/api/permission-sessions/{session_id}/groups/{screen_id}/toggle",
            post(permission_sessions::toggle_group_handler),
        )
        .route(
            "/api/permission-sessions/{session_id}/save",
            post(permission_sessions::save_permission_session_handler),
        )
        .route(
            "/api/permission-sessions/{session_id}/cancel",
            post(permission_sessions::cancel_permission_session_handler),
        )
        .route_layer(from_fn(middleware::require_actor));

    Ok(Router::new()
        .route("/health", get(health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
