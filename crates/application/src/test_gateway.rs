use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use rolegrid_core::{AppError, AppResult};
use rolegrid_domain::{
    AuditStamp, ChildScreen, PermissionFlags, PermissionRecord, ScreenCatalog, ScreenId,
    ScreenNode, UserGroupHeader, UserGroupKey, UserGroupSummary,
};

use crate::{EditorMode, SaveUserGroupRequest, UserGroupGateway, UserGroupSnapshot};

pub(crate) fn screen_id(value: &str) -> ScreenId {
    match ScreenId::new(value) {
        Ok(screen_id) => screen_id,
        Err(error) => panic!("invalid test screen id '{value}': {error}"),
    }
}

pub(crate) fn admin_key() -> UserGroupKey {
    match UserGroupKey::parse("ADMIN", "ACME") {
        Ok(key) => key,
        Err(error) => panic!("invalid test key: {error}"),
    }
}

/// `P1 { C1, C2 }`, `P2 { C3 }`, every flag false.
pub(crate) fn sample_catalog() -> ScreenCatalog {
    let parent = |id: &str, name: &str, children: &[&str]| {
        let parent_id = screen_id(id);
        let children = children
            .iter()
            .map(|child| {
                ChildScreen::new(
                    screen_id(child),
                    format!("Screen {child}"),
                    parent_id.clone(),
                    PermissionFlags::default(),
                    AuditStamp::default(),
                )
            })
            .collect();
        match ScreenNode::new(parent_id, name, "Administration", children) {
            Ok(parent) => parent,
            Err(error) => panic!("parent rejected: {error}"),
        }
    };

    match ScreenCatalog::new(vec![
        parent("P1", "User Management", &["C1", "C2"]),
        parent("P2", "Simulation", &["C3"]),
    ]) {
        Ok(catalog) => catalog,
        Err(error) => panic!("catalog rejected: {error}"),
    }
}

pub(crate) fn saved_record(id: &str, flags: PermissionFlags) -> PermissionRecord {
    PermissionRecord::new(admin_key(), screen_id(id), flags, AuditStamp::default())
}

pub(crate) fn saved_header(create_by: &str, create_date: &str) -> UserGroupHeader {
    UserGroupHeader::new(
        admin_key(),
        "Administrators",
        Some("Admin".to_owned()),
        AuditStamp {
            create_by: Some(create_by.to_owned()),
            create_date: Some(create_date.to_owned()),
            modify_by: Some(create_by.to_owned()),
            modify_date: Some(create_date.to_owned()),
        },
    )
}

#[derive(Default)]
struct FakeState {
    catalog: ScreenCatalog,
    header: Option<UserGroupHeader>,
    records: Vec<PermissionRecord>,
    summaries: Vec<UserGroupSummary>,
    catalog_failure: Option<AppError>,
    user_group_failure: Option<AppError>,
    save_failures: VecDeque<AppError>,
    delay: Option<Duration>,
    user_group_fetches: usize,
    submitted: Vec<(EditorMode, SaveUserGroupRequest)>,
    deleted: Vec<UserGroupKey>,
}

/// Scriptable gateway double shared by the application tests.
#[derive(Default)]
pub(crate) struct FakeUserGroupGateway {
    state: Mutex<FakeState>,
}

impl FakeUserGroupGateway {
    pub(crate) fn with_catalog(catalog: ScreenCatalog) -> Self {
        Self {
            state: Mutex::new(FakeState {
                catalog,
                ..FakeState::default()
            }),
        }
    }

    pub(crate) async fn set_saved_records(&self, records: Vec<PermissionRecord>) {
        self.state.lock().await.records = records;
    }

    pub(crate) async fn set_saved_header(&self, header: UserGroupHeader) {
        self.state.lock().await.header = Some(header);
    }

    pub(crate) async fn set_summaries(&self, summaries: Vec<UserGroupSummary>) {
        self.state.lock().await.summaries = summaries;
    }

    pub(crate) async fn fail_catalog_fetch(&self, error: AppError) {
        self.state.lock().await.catalog_failure = Some(error);
    }

    pub(crate) async fn fail_user_group_fetch(&self, error: AppError) {
        self.state.lock().await.user_group_failure = Some(error);
    }

    pub(crate) async fn clear_fetch_failures(&self) {
        let mut state = self.state.lock().await;
        state.catalog_failure = None;
        state.user_group_failure = None;
    }

    pub(crate) async fn fail_next_save(&self, error: AppError) {
        self.state.lock().await.save_failures.push_back(error);
    }

    pub(crate) async fn delay_calls(&self, delay: Duration) {
        self.state.lock().await.delay = Some(delay);
    }

    pub(crate) async fn user_group_fetches(&self) -> usize {
        self.state.lock().await.user_group_fetches
    }

    pub(crate) async fn submitted(&self) -> Vec<(EditorMode, SaveUserGroupRequest)> {
        self.state.lock().await.submitted.clone()
    }

    pub(crate) async fn deleted(&self) -> Vec<UserGroupKey> {
        self.state.lock().await.deleted.clone()
    }

    async fn pause(&self) {
        let delay = self.state.lock().await.delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    async fn record_save(&self, mode: EditorMode, request: SaveUserGroupRequest) -> AppResult<()> {
        self.pause().await;
        let mut state = self.state.lock().await;
        if let Some(error) = state.save_failures.pop_front() {
            return Err(error);
        }
        state.submitted.push((mode, request));
        Ok(())
    }
}

#[async_trait]
impl UserGroupGateway for FakeUserGroupGateway {
    async fn fetch_screen_catalog(&self, _key: &UserGroupKey) -> AppResult<ScreenCatalog> {
        self.pause().await;
        let state = self.state.lock().await;
        match &state.catalog_failure {
            Some(error) => Err(error.clone()),
            None => Ok(state.catalog.clone()),
        }
    }

    async fn fetch_user_group(&self, _key: &UserGroupKey) -> AppResult<UserGroupSnapshot> {
        self.pause().await;
        let mut state = self.state.lock().await;
        state.user_group_fetches += 1;
        match &state.user_group_failure {
            Some(error) => Err(error.clone()),
            None => Ok(UserGroupSnapshot {
                header: state.header.clone(),
                details: state.records.clone(),
            }),
        }
    }

    async fn add_user_group(&self, request: SaveUserGroupRequest) -> AppResult<()> {
        self.record_save(EditorMode::Create, request).await
    }

    async fn update_user_group(&self, request: SaveUserGroupRequest) -> AppResult<()> {
        self.record_save(EditorMode::Edit, request).await
    }

    async fn delete_user_group(&self, key: &UserGroupKey) -> AppResult<()> {
        self.state.lock().await.deleted.push(key.clone());
        Ok(())
    }

    async fn list_user_groups(&self) -> AppResult<Vec<UserGroupSummary>> {
        Ok(self.state.lock().await.summaries.clone())
    }
}
