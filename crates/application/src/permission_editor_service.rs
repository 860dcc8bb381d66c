use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rolegrid_core::{ActorIdentity, AppResult};
use rolegrid_domain::{PermissionKind, ScreenId, UserGroupKey};
use tracing::{info, warn};

use crate::{
    EditorMode, EditorSession, LoadOutcome, LoadedCatalog, SaveHeaderInput, SaveOrchestrator,
    SaveOutcome, ScreenCatalogLoader, SessionId, SessionRegistry, SessionTicket,
    UserGroupGateway,
};

/// Application service driving permission editing sessions.
#[derive(Clone)]
pub struct PermissionEditorService {
    loader: ScreenCatalogLoader,
    orchestrator: SaveOrchestrator,
    registry: SessionRegistry,
}

impl PermissionEditorService {
    /// Creates a service over one gateway; every backend call is bounded by `timeout`.
    #[must_use]
    pub fn new(gateway: Arc<dyn UserGroupGateway>, timeout: Duration) -> Self {
        Self {
            loader: ScreenCatalogLoader::new(gateway.clone(), timeout),
            orchestrator: SaveOrchestrator::new(gateway, timeout),
            registry: SessionRegistry::new(),
        }
    }

    /// Expires sessions untouched for longer than `idle_ttl`.
    #[must_use]
    pub fn with_session_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.registry = SessionRegistry::with_idle_ttl(idle_ttl);
        self
    }

    /// Opens a session and runs its first load.
    ///
    /// A failed load still yields the session, in `LoadFailed`.
    pub async fn open_session(
        &self,
        actor: &ActorIdentity,
        key: UserGroupKey,
        mode: EditorMode,
    ) -> AppResult<EditorSession> {
        let (session, ticket) = EditorSession::new(key.clone(), mode, actor);
        let session_id = session.id();
        info!(
            session_id = %session_id,
            user_group_id = %key.user_group_id(),
            company_id = %key.company_id(),
            mode = %mode,
            subject = %actor.subject(),
            "opening permission editor session"
        );
        self.registry.insert(session).await;

        self.run_load(session_id, ticket, &key, mode).await
    }

    /// Refetches catalog and saved rows, keeping group expansion.
    pub async fn reload_session(
        &self,
        actor: &ActorIdentity,
        session_id: SessionId,
    ) -> AppResult<EditorSession> {
        let (ticket, key, mode) = self
            .registry
            .update(session_id, |session| {
                session.ensure_owner(actor)?;
                let ticket = session.restart_load()?;
                Ok((ticket, session.key().clone(), session.mode()))
            })
            .await?;

        self.run_load(session_id, ticket, &key, mode).await
    }

    /// Returns a snapshot of one session.
    pub async fn session(
        &self,
        actor: &ActorIdentity,
        session_id: SessionId,
    ) -> AppResult<EditorSession> {
        let session = self.registry.get(session_id).await?;
        session.ensure_owner(actor)?;
        Ok(session)
    }

    /// Flips one permission flag.
    pub async fn toggle_permission(
        &self,
        actor: &ActorIdentity,
        session_id: SessionId,
        screen_id: &ScreenId,
        kind: PermissionKind,
    ) -> AppResult<EditorSession> {
        self.registry
            .update(session_id, |session| {
                session.ensure_owner(actor)?;
                session.toggle_permission(screen_id, kind)?;
                Ok(session.clone())
            })
            .await
    }

    /// Collapses or expands one parent group.
    pub async fn toggle_group(
        &self,
        actor: &ActorIdentity,
        session_id: SessionId,
        screen_id: &ScreenId,
    ) -> AppResult<EditorSession> {
        self.registry
            .update(session_id, |session| {
                session.ensure_owner(actor)?;
                session.toggle_group(screen_id)?;
                Ok(session.clone())
            })
            .await
    }

    /// Persists the grid in one backend call.
    ///
    /// Backend failures are recorded on the returned session instead of being
    /// returned as errors; validation and phase errors are returned. A saved
    /// session is discarded from the registry.
    pub async fn save_session(
        &self,
        actor: &ActorIdentity,
        session_id: SessionId,
        input: SaveHeaderInput,
    ) -> AppResult<EditorSession> {
        let (ticket, mode, request) = self
            .registry
            .update(session_id, |session| {
                session.ensure_owner(actor)?;
                let (ticket, request) = session.begin_save(&input, actor, Utc::now())?;
                Ok((ticket, session.mode(), request))
            })
            .await?;
        let detail_count = request.details.len();

        let result = self.orchestrator.submit(mode, request).await;
        let error = result.as_ref().err().map(ToString::to_string);

        let (outcome, session) = self
            .registry
            .update(session_id, |session| {
                let outcome = session.complete_save(ticket, result);
                Ok((outcome, session.clone()))
            })
            .await?;

        match outcome {
            SaveOutcome::Saved => info!(
                session_id = %session_id,
                mode = %mode,
                detail_count,
                "saved user group permissions"
            ),
            SaveOutcome::Failed => warn!(
                session_id = %session_id,
                mode = %mode,
                error = error.as_deref().unwrap_or_default(),
                "saving user group permissions failed"
            ),
            SaveOutcome::CommittedAfterCancel => warn!(
                session_id = %session_id,
                user_group_id = %session.key().user_group_id(),
                company_id = %session.key().company_id(),
                "cancelled save was stored by the backend"
            ),
            SaveOutcome::Stale => info!(
                session_id = %session_id,
                "ignoring result of a cancelled save"
            ),
        }

        if outcome == SaveOutcome::Saved {
            // The returned snapshot is the last view of a saved session.
            self.registry.remove(session_id).await.ok();
        }

        Ok(session)
    }

    /// Abandons the in-flight load or save of a session.
    pub async fn cancel_session(
        &self,
        actor: &ActorIdentity,
        session_id: SessionId,
    ) -> AppResult<EditorSession> {
        let session = self
            .registry
            .update(session_id, |session| {
                session.ensure_owner(actor)?;
                session.cancel()?;
                Ok(session.clone())
            })
            .await?;
        info!(session_id = %session_id, phase = %session.phase(), "cancelled session request");
        Ok(session)
    }

    /// Discards a session.
    pub async fn close_session(&self, actor: &ActorIdentity, session_id: SessionId) -> AppResult<()> {
        self.registry
            .update(session_id, |session| session.ensure_owner(actor))
            .await?;
        self.registry.remove(session_id).await?;
        info!(session_id = %session_id, "closed permission editor session");
        Ok(())
    }

    /// Returns the number of open sessions.
    pub async fn open_session_count(&self) -> usize {
        self.registry.session_count().await
    }

    async fn run_load(
        &self,
        session_id: SessionId,
        ticket: SessionTicket,
        key: &UserGroupKey,
        mode: EditorMode,
    ) -> AppResult<EditorSession> {
        let result: AppResult<LoadedCatalog> = self.loader.load(key, mode).await;

        let (outcome, session) = self
            .registry
            .update(session_id, |session| {
                let outcome = match result {
                    Ok(loaded) => session.complete_load(ticket, loaded),
                    Err(error) => {
                        warn!(
                            session_id = %session_id,
                            user_group_id = %key.user_group_id(),
                            company_id = %key.company_id(),
                            error = %error,
                            "loading permission catalog failed"
                        );
                        session.fail_load(ticket, &error)
                    }
                };
                Ok((outcome, session.clone()))
            })
            .await?;

        match outcome {
            LoadOutcome::Ready { orphaned } => {
                if !orphaned.is_empty() {
                    let orphaned: Vec<&str> = orphaned.iter().map(ScreenId::as_str).collect();
                    warn!(
                        session_id = %session_id,
                        user_group_id = %key.user_group_id(),
                        company_id = %key.company_id(),
                        orphaned = ?orphaned,
                        "dropped saved permissions for screens missing from the catalog"
                    );
                }
                info!(
                    session_id = %session_id,
                    screens = session.grid().len(),
                    "permission catalog loaded"
                );
            }
            LoadOutcome::Failed => {}
            LoadOutcome::Stale => info!(
                session_id = %session_id,
                "ignoring result of a superseded load"
            ),
        }

        Ok(session)
    }
}
