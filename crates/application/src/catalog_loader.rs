use std::sync::Arc;
use std::time::Duration;

use rolegrid_core::AppResult;
use rolegrid_domain::{PermissionRecord, ScreenCatalog, UserGroupHeader, UserGroupKey};

use crate::backend_call::with_timeout;
use crate::{EditorMode, UserGroupGateway, UserGroupSnapshot};

/// Screen hierarchy and saved permissions fetched for one editing session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedCatalog {
    /// Screen hierarchy as returned by the backend, before merging.
    pub catalog: ScreenCatalog,
    /// Saved permission rows.
    pub records: Vec<PermissionRecord>,
    /// Saved role metadata, present only for existing user groups.
    pub header: Option<UserGroupHeader>,
}

/// Fetches the screen hierarchy and saved permissions for a user group.
#[derive(Clone)]
pub struct ScreenCatalogLoader {
    gateway: Arc<dyn UserGroupGateway>,
    timeout: Duration,
}

impl ScreenCatalogLoader {
    /// Creates a loader bounded by `timeout` for the whole load.
    #[must_use]
    pub fn new(gateway: Arc<dyn UserGroupGateway>, timeout: Duration) -> Self {
        Self { gateway, timeout }
    }

    /// Loads the catalog, and in edit mode the saved rows, concurrently.
    ///
    /// Either fetch failing fails the whole load.
    pub async fn load(&self, key: &UserGroupKey, mode: EditorMode) -> AppResult<LoadedCatalog> {
        with_timeout(self.timeout, "screen catalog load", async {
            match mode {
                EditorMode::Create => {
                    let catalog = self.gateway.fetch_screen_catalog(key).await?;
                    Ok(LoadedCatalog {
                        catalog,
                        records: Vec::new(),
                        header: None,
                    })
                }
                EditorMode::Edit => {
                    let (catalog, snapshot) = tokio::try_join!(
                        self.gateway.fetch_screen_catalog(key),
                        self.gateway.fetch_user_group(key)
                    )?;
                    let UserGroupSnapshot { header, details } = snapshot;
                    Ok(LoadedCatalog {
                        catalog,
                        records: details,
                        header,
                    })
                }
            }
        })
        .await
    }
}
