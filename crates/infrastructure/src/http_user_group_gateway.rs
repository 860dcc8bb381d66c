use async_trait::async_trait;
use rolegrid_application::{SaveUserGroupRequest, UserGroupGateway, UserGroupSnapshot};
use rolegrid_core::{AppError, AppResult};
use rolegrid_domain::{ScreenCatalog, UserGroupKey, UserGroupSummary};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

mod wire;

use wire::{Envelope, KeyRequest, LookupRequest, SaveRequest};

/// HTTP implementation of the user group backend port.
pub struct HttpUserGroupGateway {
    http_client: reqwest::Client,
    base_url: Url,
    api_token: Option<String>,
}

impl HttpUserGroupGateway {
    /// Creates a gateway posting to endpoints below `base_url`.
    #[must_use]
    pub fn new(http_client: reqwest::Client, mut base_url: Url, api_token: Option<String>) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(path.as_str());
        }

        Self {
            http_client,
            base_url,
            api_token: api_token.filter(|token| !token.trim().is_empty()),
        }
    }

    fn endpoint(&self, operation: &str) -> AppResult<Url> {
        self.base_url.join(operation).map_err(|error| {
            AppError::Internal(format!("invalid backend endpoint for {operation}: {error}"))
        })
    }

    async fn post_enveloped<T: Serialize>(&self, operation: &str, inner: &T) -> AppResult<Value> {
        let envelope = Envelope::wrap(operation, inner)?;
        self.post(operation, &envelope).await
    }

    async fn post<B: Serialize>(&self, operation: &str, body: &B) -> AppResult<Value> {
        let url = self.endpoint(operation)?;
        let mut builder = self.http_client.post(url).json(body);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|error| {
            warn!(operation, error = %error, "backend request failed");
            AppError::Internal(format!("{operation} transport error: {error}"))
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AppError::Unauthorized(format!(
                "backend rejected {operation} credentials"
            )));
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<response body unavailable>".to_owned());
        if !status.is_success() {
            warn!(operation, status = %status, "backend returned an error status");
            return Err(AppError::Internal(format!(
                "{operation} failed with status {status}: {body}"
            )));
        }

        debug!(operation, status = %status, bytes = body.len(), "backend call completed");
        wire::unwrap_body(operation, body.as_str())
    }

    async fn save(&self, operation: &str, request: &SaveUserGroupRequest) -> AppResult<()> {
        let payload = self
            .post_enveloped(operation, &SaveRequest::new(request))
            .await?;
        wire::ensure_accepted(operation, &payload)
    }
}

#[async_trait]
impl UserGroupGateway for HttpUserGroupGateway {
    async fn fetch_screen_catalog(&self, key: &UserGroupKey) -> AppResult<ScreenCatalog> {
        let payload = self
            .post_enveloped("GetScreenGroup", &KeyRequest::new(key))
            .await?;
        wire::decode_screen_catalog(payload)
    }

    async fn fetch_user_group(&self, key: &UserGroupKey) -> AppResult<UserGroupSnapshot> {
        let payload = self
            .post_enveloped("GetUserGroup", &KeyRequest::new(key))
            .await?;
        wire::ensure_accepted("GetUserGroup", &payload)?;
        wire::decode_user_group(key, payload)
    }

    async fn add_user_group(&self, request: SaveUserGroupRequest) -> AppResult<()> {
        self.save("AddUserGroup", &request).await
    }

    async fn update_user_group(&self, request: SaveUserGroupRequest) -> AppResult<()> {
        self.save("UpdateUserGroup", &request).await
    }

    async fn delete_user_group(&self, key: &UserGroupKey) -> AppResult<()> {
        let payload = self
            .post_enveloped("DeleteUserGroup", &KeyRequest::new(key))
            .await?;
        wire::ensure_accepted("DeleteUserGroup", &payload)
    }

    async fn list_user_groups(&self) -> AppResult<Vec<UserGroupSummary>> {
        let payload = self
            .post("GETLookupData", &LookupRequest::user_group_list())
            .await?;
        wire::decode_lookup(payload)
    }
}

#[cfg(test)]
mod tests;
