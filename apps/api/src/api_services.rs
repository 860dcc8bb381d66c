use std::sync::Arc;

use rolegrid_application::{PermissionEditorService, UserGroupDirectoryService, UserGroupGateway};
use rolegrid_core::AppError;
use rolegrid_infrastructure::HttpUserGroupGateway;
use tracing::info;

use crate::api_config::{ApiConfig, BackendConfig};
use crate::dev_seed;
use crate::state::AppState;

pub async fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let gateway = build_gateway(config).await?;

    Ok(AppState {
        permission_editor_service: PermissionEditorService::new(
            gateway.clone(),
            config.backend_timeout,
        )
        .with_session_idle_ttl(config.session_idle_ttl),
        user_group_directory_service: UserGroupDirectoryService::new(
            gateway,
            config.backend_timeout,
        ),
    })
}

async fn build_gateway(config: &ApiConfig) -> Result<Arc<dyn UserGroupGateway>, AppError> {
    match &config.backend {
        BackendConfig::Http {
            base_url,
            api_token,
        } => {
            let http_client = reqwest::Client::builder()
                .timeout(config.backend_timeout)
                .build()
                .map_err(|error| {
                    AppError::Internal(format!("failed to build backend HTTP client: {error}"))
                })?;
            info!(base_url = %base_url, "using HTTP user group backend");
            Ok(Arc::new(HttpUserGroupGateway::new(
                http_client,
                base_url.clone(),
                api_token.clone(),
            )))
        }
        BackendConfig::Memory => {
            info!("using in-memory user group backend");
            Ok(Arc::new(dev_seed::seeded_gateway().await?))
        }
    }
}
