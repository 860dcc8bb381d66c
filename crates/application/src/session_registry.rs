use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rolegrid_core::{AppError, AppResult};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::info;

use crate::{EditorSession, SessionId};

/// Idle time after which an untouched session is expired.
const DEFAULT_SESSION_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

struct RegisteredSession {
    session: EditorSession,
    last_touched: Instant,
}

/// In-process store of open editing sessions.
///
/// Closures passed to [`SessionRegistry::update`] run under the write lock and
/// must not perform I/O. Sessions idle for longer than the TTL are swept when
/// a new session is inserted.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, RegisteredSession>>>,
    idle_ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_idle_ttl(DEFAULT_SESSION_IDLE_TTL)
    }
}

impl SessionRegistry {
    /// Creates an empty registry with the default idle TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry expiring sessions idle for longer than `idle_ttl`.
    #[must_use]
    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    /// Registers a session under its id after sweeping idle sessions.
    pub async fn insert(&self, session: EditorSession) {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, registered| now.duration_since(registered.last_touched) < self.idle_ttl);
        let expired = before - sessions.len();
        if expired > 0 {
            info!(expired, "expired idle permission editor sessions");
        }

        sessions.insert(
            session.id(),
            RegisteredSession {
                session,
                last_touched: now,
            },
        );
    }

    /// Returns a snapshot of one session.
    pub async fn get(&self, session_id: SessionId) -> AppResult<EditorSession> {
        let mut sessions = self.sessions.write().await;
        let registered = touch(&mut sessions, session_id)?;
        Ok(registered.session.clone())
    }

    /// Mutates one session in place.
    pub async fn update<T, F>(&self, session_id: SessionId, mutate: F) -> AppResult<T>
    where
        F: FnOnce(&mut EditorSession) -> AppResult<T>,
    {
        let mut sessions = self.sessions.write().await;
        let registered = touch(&mut sessions, session_id)?;
        mutate(&mut registered.session)
    }

    /// Drops one session.
    pub async fn remove(&self, session_id: SessionId) -> AppResult<EditorSession> {
        self.sessions
            .write()
            .await
            .remove(&session_id)
            .map(|registered| registered.session)
            .ok_or_else(|| not_found(session_id))
    }

    /// Returns the number of open sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn touch(
    sessions: &mut HashMap<SessionId, RegisteredSession>,
    session_id: SessionId,
) -> AppResult<&mut RegisteredSession> {
    let registered = sessions
        .get_mut(&session_id)
        .ok_or_else(|| not_found(session_id))?;
    registered.last_touched = Instant::now();
    Ok(registered)
}

fn not_found(session_id: SessionId) -> AppError {
    AppError::NotFound(format!("permission session '{session_id}' does not exist"))
}
