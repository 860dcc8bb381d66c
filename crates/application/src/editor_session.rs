use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use rolegrid_core::{ActorIdentity, AppError, AppResult};
use rolegrid_domain::{
    PermissionFlags, PermissionKind, ScreenCatalog, ScreenId, UserGroupHeader, UserGroupKey,
    merge_permissions, orphaned_records,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::save_orchestrator::{SaveContext, SaveHeaderInput, build_save_request};
use crate::{EditorMode, GridEditState, GroupExpansionState, LoadedCatalog, SaveUserGroupRequest};

/// Identifier of one permission editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generates a fresh random session id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a session id from its path representation.
    pub fn parse(value: &str) -> AppResult<Self> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid session id '{value}': {error}")))
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, formatter)
    }
}

/// Lifecycle phase of an editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Catalog and saved rows are being fetched.
    Loading,
    /// The last load failed; the session can be reloaded.
    LoadFailed,
    /// The grid is editable.
    Ready,
    /// A save request is in flight.
    Saving,
    /// The grid was persisted; the session is closed for edits.
    Saved,
}

impl SessionPhase {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::LoadFailed => "load_failed",
            Self::Ready => "ready",
            Self::Saving => "saving",
            Self::Saved => "saved",
        }
    }
}

impl Display for SessionPhase {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Token tying an asynchronous load or save result to the request that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTicket(u64);

/// Result of applying a load result to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The grid is seeded; `orphaned` lists saved rows without a catalog screen.
    Ready {
        /// Screen ids of dropped saved rows.
        orphaned: Vec<ScreenId>,
    },
    /// The load failed and the session moved to `LoadFailed`.
    Failed,
    /// The result belongs to a superseded or cancelled request.
    Stale,
}

/// Result of applying a save result to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Persisted; the session is terminal.
    Saved,
    /// The save failed; the session is editable again with the error recorded.
    Failed,
    /// A cancelled save reached the backend anyway; the session now edits the
    /// stored user group.
    CommittedAfterCancel,
    /// The result belongs to a cancelled or superseded save and changes nothing.
    Stale,
}

const COMMITTED_AFTER_CANCEL: &str =
    "the cancelled save was stored by the backend; further saves update it";

/// One administrator's editing of one user group's permission grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSession {
    id: SessionId,
    owner: String,
    key: UserGroupKey,
    mode: EditorMode,
    phase: SessionPhase,
    catalog: ScreenCatalog,
    header: Option<UserGroupHeader>,
    grid: GridEditState,
    expansion: GroupExpansionState,
    last_error: Option<String>,
    generation: u64,
    in_flight: Option<SessionTicket>,
    saving_header: Option<UserGroupHeader>,
    cancelled_save: Option<(SessionTicket, UserGroupHeader)>,
}

impl EditorSession {
    /// Starts a session in `Loading` and returns the ticket of its first load.
    #[must_use]
    pub fn new(key: UserGroupKey, mode: EditorMode, owner: &ActorIdentity) -> (Self, SessionTicket) {
        let mut session = Self {
            id: SessionId::generate(),
            owner: owner.subject().to_owned(),
            key,
            mode,
            phase: SessionPhase::Loading,
            catalog: ScreenCatalog::default(),
            header: None,
            grid: GridEditState::new(),
            expansion: GroupExpansionState::new(),
            last_error: None,
            generation: 0,
            in_flight: None,
            saving_header: None,
            cancelled_save: None,
        };
        let ticket = session.issue_ticket();
        (session, ticket)
    }

    /// Returns the session id.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the subject that opened the session.
    #[must_use]
    pub fn owner(&self) -> &str {
        self.owner.as_str()
    }

    /// Returns the edited user group.
    #[must_use]
    pub fn key(&self) -> &UserGroupKey {
        &self.key
    }

    /// Returns create or edit.
    #[must_use]
    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Returns the lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Returns the merged catalog of the last successful load.
    #[must_use]
    pub fn catalog(&self) -> &ScreenCatalog {
        &self.catalog
    }

    /// Returns the saved header of the last successful load.
    #[must_use]
    pub fn header(&self) -> Option<&UserGroupHeader> {
        self.header.as_ref()
    }

    /// Returns the editable grid.
    #[must_use]
    pub fn grid(&self) -> &GridEditState {
        &self.grid
    }

    /// Returns the group expansion flags.
    #[must_use]
    pub fn expansion(&self) -> &GroupExpansionState {
        &self.expansion
    }

    /// Returns the message of the last failed load or save.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Rejects actors other than the session owner.
    pub fn ensure_owner(&self, actor: &ActorIdentity) -> AppResult<()> {
        if actor.subject() == self.owner {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "session '{}' belongs to another user",
            self.id
        )))
    }

    /// Moves a failed or ready session back to `Loading` for a manual retry.
    ///
    /// Expansion flags survive; the grid is reseeded once the load completes.
    pub fn restart_load(&mut self) -> AppResult<SessionTicket> {
        match self.phase {
            SessionPhase::LoadFailed | SessionPhase::Ready => {
                self.phase = SessionPhase::Loading;
                self.last_error = None;
                Ok(self.issue_ticket())
            }
            phase => Err(self.wrong_phase("reload", phase)),
        }
    }

    /// Applies fetched data: merges, registers groups, seeds the grid.
    pub fn complete_load(&mut self, ticket: SessionTicket, loaded: LoadedCatalog) -> LoadOutcome {
        if !self.is_current(ticket, SessionPhase::Loading) {
            return LoadOutcome::Stale;
        }

        let LoadedCatalog {
            catalog,
            records,
            header,
        } = loaded;
        let orphaned = orphaned_records(&catalog, &records);
        let merged = merge_permissions(&catalog, &records);
        self.expansion.observe(&merged);
        self.grid.seed(&merged);
        self.catalog = merged;
        self.header = header;
        self.phase = SessionPhase::Ready;
        self.last_error = None;
        self.in_flight = None;
        LoadOutcome::Ready { orphaned }
    }

    /// Records a failed load.
    pub fn fail_load(&mut self, ticket: SessionTicket, error: &AppError) -> LoadOutcome {
        if !self.is_current(ticket, SessionPhase::Loading) {
            return LoadOutcome::Stale;
        }

        self.phase = SessionPhase::LoadFailed;
        self.last_error = Some(error.to_string());
        self.in_flight = None;
        LoadOutcome::Failed
    }

    /// Flips one permission flag of one child screen.
    pub fn toggle_permission(
        &mut self,
        screen_id: &ScreenId,
        kind: PermissionKind,
    ) -> AppResult<PermissionFlags> {
        self.require_ready("toggle permissions")?;
        self.grid.toggle(screen_id, kind)
    }

    /// Collapses or expands one parent group and returns its new state.
    pub fn toggle_group(&mut self, screen_id: &ScreenId) -> AppResult<bool> {
        self.require_ready("toggle groups")?;
        let known = self
            .catalog
            .parents()
            .iter()
            .any(|parent| parent.screen_id() == screen_id);
        if !known {
            return Err(AppError::Validation(format!(
                "screen group '{screen_id}' is not part of the loaded catalog"
            )));
        }

        Ok(self.expansion.toggle_group(screen_id))
    }

    /// Builds the save request and moves to `Saving`.
    ///
    /// A session that is already saving rejects the call, so at most one save
    /// is in flight per session.
    pub fn begin_save(
        &mut self,
        input: &SaveHeaderInput,
        actor: &ActorIdentity,
        now: DateTime<Utc>,
    ) -> AppResult<(SessionTicket, SaveUserGroupRequest)> {
        if self.phase == SessionPhase::Saving {
            return Err(AppError::Conflict(format!(
                "session '{}' already has a save in progress",
                self.id
            )));
        }
        self.require_ready("save")?;

        let request = build_save_request(
            &SaveContext {
                mode: self.mode,
                session_key: &self.key,
                existing_header: self.header.as_ref(),
                catalog: &self.catalog,
                grid: &self.grid,
            },
            input,
            actor,
            now,
        )?;

        self.phase = SessionPhase::Saving;
        self.last_error = None;
        self.saving_header = Some(request.header.clone());
        Ok((self.issue_ticket(), request))
    }

    /// Applies the backend's answer to a save.
    ///
    /// Failures keep every grid edit and return to `Ready`. A successful result
    /// for a cancelled save is still recorded, see [`SaveOutcome::CommittedAfterCancel`].
    pub fn complete_save(&mut self, ticket: SessionTicket, result: AppResult<()>) -> SaveOutcome {
        if !self.is_current(ticket, SessionPhase::Saving) {
            return self.settle_cancelled_save(ticket, result);
        }

        self.in_flight = None;
        self.saving_header = None;
        match result {
            Ok(()) => {
                self.phase = SessionPhase::Saved;
                self.last_error = None;
                SaveOutcome::Saved
            }
            Err(error) => {
                self.phase = SessionPhase::Ready;
                self.last_error = Some(error.to_string());
                SaveOutcome::Failed
            }
        }
    }

    /// Abandons the in-flight load or save; its late result is ignored.
    pub fn cancel(&mut self) -> AppResult<()> {
        match self.phase {
            SessionPhase::Saving => {
                self.phase = SessionPhase::Ready;
                self.last_error = Some("save cancelled".to_owned());
                self.cancelled_save = self.in_flight.zip(self.saving_header.take());
            }
            SessionPhase::Loading => {
                self.phase = SessionPhase::LoadFailed;
                self.last_error = Some("load cancelled".to_owned());
            }
            phase => return Err(self.wrong_phase("cancel", phase)),
        }

        self.in_flight = None;
        Ok(())
    }

    /// Applies the late result of a cancelled save.
    ///
    /// The backend cannot be told to drop a submitted save, so a success means
    /// the user group now exists with the submitted header. Create sessions
    /// switch to edit mode so the next save updates instead of re-adding.
    fn settle_cancelled_save(&mut self, ticket: SessionTicket, result: AppResult<()>) -> SaveOutcome {
        match self.cancelled_save.take() {
            Some((cancelled, header)) if cancelled == ticket => {
                if result.is_err() || self.phase == SessionPhase::Saved {
                    return SaveOutcome::Stale;
                }

                self.mode = EditorMode::Edit;
                self.header = Some(header);
                self.last_error = Some(COMMITTED_AFTER_CANCEL.to_owned());
                SaveOutcome::CommittedAfterCancel
            }
            other => {
                self.cancelled_save = other;
                SaveOutcome::Stale
            }
        }
    }

    fn issue_ticket(&mut self) -> SessionTicket {
        self.generation += 1;
        let ticket = SessionTicket(self.generation);
        self.in_flight = Some(ticket);
        ticket
    }

    fn is_current(&self, ticket: SessionTicket, phase: SessionPhase) -> bool {
        self.phase == phase && self.in_flight == Some(ticket)
    }

    fn require_ready(&self, operation: &str) -> AppResult<()> {
        match self.phase {
            SessionPhase::Ready => Ok(()),
            phase => Err(self.wrong_phase(operation, phase)),
        }
    }

    fn wrong_phase(&self, operation: &str, phase: SessionPhase) -> AppError {
        AppError::Conflict(format!(
            "cannot {operation} while session '{}' is {phase}",
            self.id
        ))
    }
}
