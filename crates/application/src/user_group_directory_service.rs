use std::sync::Arc;
use std::time::Duration;

use rolegrid_core::{ActorIdentity, AppResult};
use rolegrid_domain::{UserGroupKey, UserGroupSummary};
use tracing::info;

use crate::UserGroupGateway;
use crate::backend_call::with_timeout;

/// Lists and deletes user groups for the roles table.
#[derive(Clone)]
pub struct UserGroupDirectoryService {
    gateway: Arc<dyn UserGroupGateway>,
    timeout: Duration,
}

impl UserGroupDirectoryService {
    /// Creates a directory service bounded by `timeout` per call.
    #[must_use]
    pub fn new(gateway: Arc<dyn UserGroupGateway>, timeout: Duration) -> Self {
        Self { gateway, timeout }
    }

    /// Lists user groups, optionally filtered by id or description.
    pub async fn list_user_groups(
        &self,
        actor: &ActorIdentity,
        search: Option<&str>,
    ) -> AppResult<Vec<UserGroupSummary>> {
        let user_groups = with_timeout(
            self.timeout,
            "GETLookupData",
            self.gateway.list_user_groups(),
        )
        .await?;

        let term = search.unwrap_or_default();
        let matching: Vec<UserGroupSummary> = user_groups
            .into_iter()
            .filter(|user_group| user_group.matches_search(term))
            .collect();
        info!(
            subject = %actor.subject(),
            search = term,
            count = matching.len(),
            "listed user groups"
        );
        Ok(matching)
    }

    /// Deletes one user group.
    pub async fn delete_user_group(&self, actor: &ActorIdentity, key: &UserGroupKey) -> AppResult<()> {
        with_timeout(
            self.timeout,
            "DeleteUserGroup",
            self.gateway.delete_user_group(key),
        )
        .await?;

        info!(
            subject = %actor.subject(),
            user_group_id = %key.user_group_id(),
            company_id = %key.company_id(),
            "deleted user group"
        );
        Ok(())
    }
}
