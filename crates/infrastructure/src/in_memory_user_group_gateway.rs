use std::collections::BTreeMap;

use async_trait::async_trait;
use rolegrid_application::{SaveUserGroupRequest, UserGroupGateway, UserGroupSnapshot};
use rolegrid_core::{AppError, AppResult};
use rolegrid_domain::{PermissionRecord, ScreenCatalog, UserGroupHeader, UserGroupKey, UserGroupSummary};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredUserGroup {
    header: UserGroupHeader,
    details: Vec<PermissionRecord>,
}

/// In-memory user group backend for local development and tests.
///
/// Every user group shares one screen catalog. Unknown user groups read as an
/// empty snapshot, the same as an empty backend response.
#[derive(Debug, Default)]
pub struct InMemoryUserGroupGateway {
    catalog: RwLock<ScreenCatalog>,
    user_groups: RwLock<BTreeMap<UserGroupKey, StoredUserGroup>>,
}

impl InMemoryUserGroupGateway {
    /// Creates a backend serving `catalog` with no user groups.
    #[must_use]
    pub fn new(catalog: ScreenCatalog) -> Self {
        Self {
            catalog: RwLock::new(catalog),
            user_groups: RwLock::new(BTreeMap::new()),
        }
    }

    /// Stores or replaces one user group.
    pub async fn seed_user_group(&self, header: UserGroupHeader, details: Vec<PermissionRecord>) {
        self.user_groups
            .write()
            .await
            .insert(header.key().clone(), StoredUserGroup { header, details });
    }
}

fn missing(key: &UserGroupKey) -> AppError {
    AppError::NotFound(format!("user group '{key}' does not exist"))
}

#[async_trait]
impl UserGroupGateway for InMemoryUserGroupGateway {
    async fn fetch_screen_catalog(&self, _key: &UserGroupKey) -> AppResult<ScreenCatalog> {
        Ok(self.catalog.read().await.clone())
    }

    async fn fetch_user_group(&self, key: &UserGroupKey) -> AppResult<UserGroupSnapshot> {
        Ok(self
            .user_groups
            .read()
            .await
            .get(key)
            .map(|stored| UserGroupSnapshot {
                header: Some(stored.header.clone()),
                details: stored.details.clone(),
            })
            .unwrap_or_default())
    }

    async fn add_user_group(&self, request: SaveUserGroupRequest) -> AppResult<()> {
        let key = request.header.key().clone();
        let mut user_groups = self.user_groups.write().await;
        if user_groups.contains_key(&key) {
            return Err(AppError::Conflict(format!("user group '{key}' already exists")));
        }

        user_groups.insert(
            key,
            StoredUserGroup {
                header: request.header,
                details: request.details,
            },
        );
        Ok(())
    }

    async fn update_user_group(&self, request: SaveUserGroupRequest) -> AppResult<()> {
        let key = request.header.key().clone();
        let mut user_groups = self.user_groups.write().await;
        let stored = user_groups.get_mut(&key).ok_or_else(|| missing(&key))?;

        *stored = StoredUserGroup {
            header: request.header,
            details: request.details,
        };
        Ok(())
    }

    async fn delete_user_group(&self, key: &UserGroupKey) -> AppResult<()> {
        self.user_groups
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| missing(key))
    }

    async fn list_user_groups(&self) -> AppResult<Vec<UserGroupSummary>> {
        Ok(self
            .user_groups
            .read()
            .await
            .values()
            .map(|stored| {
                UserGroupSummary::new(
                    stored.header.key().clone(),
                    stored.header.description(),
                    Some("Active".to_owned()),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use rolegrid_application::{SaveUserGroupRequest, UserGroupGateway, UserGroupSnapshot};
    use rolegrid_core::AppError;
    use rolegrid_domain::{AuditStamp, ScreenCatalog, UserGroupHeader, UserGroupKey};

    use super::InMemoryUserGroupGateway;

    fn key(user_group_id: &str) -> UserGroupKey {
        match UserGroupKey::parse(user_group_id, "ACME") {
            Ok(key) => key,
            Err(error) => panic!("invalid key: {error}"),
        }
    }

    fn request(user_group_id: &str, description: &str) -> SaveUserGroupRequest {
        SaveUserGroupRequest {
            header: UserGroupHeader::new(
                key(user_group_id),
                description,
                Some("Admin".to_owned()),
                AuditStamp::default(),
            ),
            details: Vec::new(),
        }
    }

    #[tokio::test]
    async fn add_then_update_then_delete() {
        let gateway = InMemoryUserGroupGateway::new(ScreenCatalog::default());

        assert!(gateway.add_user_group(request("ADMIN", "Admins")).await.is_ok());
        assert!(matches!(
            gateway.add_user_group(request("ADMIN", "Again")).await,
            Err(AppError::Conflict(_))
        ));
        assert!(gateway.update_user_group(request("ADMIN", "Administrators")).await.is_ok());

        let snapshot = match gateway.fetch_user_group(&key("ADMIN")).await {
            Ok(snapshot) => snapshot,
            Err(error) => panic!("fetch failed: {error}"),
        };
        assert_eq!(
            snapshot.header.map(|header| header.description().to_owned()),
            Some("Administrators".to_owned())
        );

        assert!(gateway.delete_user_group(&key("ADMIN")).await.is_ok());
        assert!(matches!(
            gateway.delete_user_group(&key("ADMIN")).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn unknown_group_reads_as_an_empty_snapshot() {
        let gateway = InMemoryUserGroupGateway::new(ScreenCatalog::default());

        let snapshot = gateway.fetch_user_group(&key("GHOST")).await;

        assert_eq!(snapshot, Ok(UserGroupSnapshot::default()));
    }

    #[tokio::test]
    async fn updating_an_unknown_group_is_not_found() {
        let gateway = InMemoryUserGroupGateway::new(ScreenCatalog::default());

        let result = gateway.update_user_group(request("GHOST", "Nobody")).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn listing_is_ordered_by_key() {
        let gateway = InMemoryUserGroupGateway::new(ScreenCatalog::default());
        assert!(gateway.add_user_group(request("OPS", "Operations")).await.is_ok());
        assert!(gateway.add_user_group(request("ADMIN", "Admins")).await.is_ok());

        let listed = match gateway.list_user_groups().await {
            Ok(listed) => listed,
            Err(error) => panic!("list failed: {error}"),
        };

        let ids: Vec<&str> = listed
            .iter()
            .map(|summary| summary.key().user_group_id().as_str())
            .collect();
        assert_eq!(ids, vec!["ADMIN", "OPS"]);
    }
}
