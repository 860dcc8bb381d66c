use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rolegrid_core::{ActorIdentity, AppError, AppResult, NonEmptyString};
use rolegrid_domain::{
    AuditStamp, PermissionRecord, ScreenCatalog, ScreenId, UserGroupHeader, UserGroupKey,
    UserGroupType,
};

use crate::backend_call::with_timeout;
use crate::{EditorMode, GridEditState, SaveUserGroupRequest, UserGroupGateway};

/// Role metadata entered on the save form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveHeaderInput {
    /// User group identifier.
    pub user_group_id: String,
    /// Company identifier.
    pub company_id: String,
    /// Role description; falls back to the saved one when blank in edit mode.
    pub description: String,
    /// Role type; falls back to the saved one when blank in edit mode.
    pub user_group_type: String,
}

/// Everything the payload builder reads from an editing session.
pub struct SaveContext<'a> {
    /// Create or edit.
    pub mode: EditorMode,
    /// Key the session was opened for.
    pub session_key: &'a UserGroupKey,
    /// Saved header of an existing user group.
    pub existing_header: Option<&'a UserGroupHeader>,
    /// Merged catalog, used for per-screen audit columns.
    pub catalog: &'a ScreenCatalog,
    /// Current grid flags.
    pub grid: &'a GridEditState,
}

/// Builds the single header+details save request for the current grid.
///
/// Editing keeps the original `CreateBy`/`CreateDate`; creating stamps the actor
/// and `now`. `ModifyBy`/`ModifyDate` are always the actor and `now`.
pub fn build_save_request(
    context: &SaveContext<'_>,
    input: &SaveHeaderInput,
    actor: &ActorIdentity,
    now: DateTime<Utc>,
) -> AppResult<SaveUserGroupRequest> {
    let key = UserGroupKey::parse(input.user_group_id.trim(), input.company_id.trim())?;
    if context.mode == EditorMode::Edit && &key != context.session_key {
        return Err(AppError::Validation(format!(
            "cannot save user group '{}' from a session opened for '{}'",
            key, context.session_key
        )));
    }

    let existing = match context.mode {
        EditorMode::Edit => context.existing_header,
        EditorMode::Create => None,
    };
    let description = non_blank_or(
        input.description.as_str(),
        existing.map(UserGroupHeader::description),
    );
    let description = NonEmptyString::for_field("description", description)?;
    let user_group_type = non_blank_or(
        input.user_group_type.as_str(),
        existing.and_then(UserGroupHeader::user_group_type),
    );
    let user_group_type = UserGroupType::from_str(
        NonEmptyString::for_field("user_group_type", user_group_type)?.as_str(),
    )?;

    let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let original = existing.map(UserGroupHeader::audit);
    let header_audit = AuditStamp {
        create_by: Some(
            original
                .and_then(|audit| audit.create_by.clone())
                .unwrap_or_else(|| actor.subject().to_owned()),
        ),
        create_date: Some(
            original
                .and_then(|audit| audit.create_date.clone())
                .unwrap_or_else(|| timestamp.clone()),
        ),
        modify_by: Some(actor.subject().to_owned()),
        modify_date: Some(timestamp.clone()),
    };

    let child_audits: HashMap<&ScreenId, &AuditStamp> = match context.mode {
        EditorMode::Edit => context
            .catalog
            .children()
            .map(|child| (child.screen_id(), child.audit()))
            .collect(),
        EditorMode::Create => HashMap::new(),
    };

    let details = context
        .grid
        .read_all()
        .iter()
        .map(|(screen_id, flags)| {
            let own = child_audits.get(screen_id);
            let audit = AuditStamp {
                create_by: own
                    .and_then(|audit| audit.create_by.clone())
                    .or_else(|| header_audit.create_by.clone()),
                create_date: own
                    .and_then(|audit| audit.create_date.clone())
                    .or_else(|| header_audit.create_date.clone()),
                modify_by: header_audit.modify_by.clone(),
                modify_date: header_audit.modify_date.clone(),
            };
            PermissionRecord::new(key.clone(), screen_id.clone(), *flags, audit)
        })
        .collect();

    Ok(SaveUserGroupRequest {
        header: UserGroupHeader::new(
            key,
            description.as_str(),
            Some(user_group_type.as_str().to_owned()),
            header_audit,
        ),
        details,
    })
}

fn non_blank_or<'a>(value: &'a str, fallback: Option<&'a str>) -> &'a str {
    if value.trim().is_empty() {
        fallback.unwrap_or(value)
    } else {
        value.trim()
    }
}

/// Submits save requests to the backend as one call.
#[derive(Clone)]
pub struct SaveOrchestrator {
    gateway: Arc<dyn UserGroupGateway>,
    timeout: Duration,
}

impl SaveOrchestrator {
    /// Creates an orchestrator bounded by `timeout` per submit.
    #[must_use]
    pub fn new(gateway: Arc<dyn UserGroupGateway>, timeout: Duration) -> Self {
        Self { gateway, timeout }
    }

    /// Submits `AddUserGroup` or `UpdateUserGroup` depending on the mode.
    pub async fn submit(&self, mode: EditorMode, request: SaveUserGroupRequest) -> AppResult<()> {
        match mode {
            EditorMode::Create => {
                with_timeout(self.timeout, "AddUserGroup", self.gateway.add_user_group(request))
                    .await
            }
            EditorMode::Edit => {
                with_timeout(
                    self.timeout,
                    "UpdateUserGroup",
                    self.gateway.update_user_group(request),
                )
                .await
            }
        }
    }
}
