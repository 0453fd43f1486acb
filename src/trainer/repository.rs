use std::collections::HashMap;
use std::sync::Mutex;

use super::domain::SessionId;
use super::session::TrainingSession;

/// Storage abstraction so the service module can be exercised in isolation.
/// Sessions are never persisted across process restarts; implementations are
/// expected to be in-memory.
pub trait SessionRepository: Send + Sync {
    fn insert(&self, session: TrainingSession) -> Result<(), SessionStoreError>;
    fn update(&self, session: TrainingSession) -> Result<(), SessionStoreError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<TrainingSession>, SessionStoreError>;
    fn remove(&self, id: &SessionId) -> Result<(), SessionStoreError>;
}

/// Error enumeration for session store failures.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Default store: a mutex-guarded map, discarded at process exit.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<SessionId, TrainingSession>>,
}

impl MemorySessionStore {
    fn guard(&self) -> Result<std::sync::MutexGuard<'_, HashMap<SessionId, TrainingSession>>, SessionStoreError> {
        self.sessions
            .lock()
            .map_err(|_| SessionStoreError::Unavailable("session mutex poisoned".to_string()))
    }
}

impl SessionRepository for MemorySessionStore {
    fn insert(&self, session: TrainingSession) -> Result<(), SessionStoreError> {
        let mut sessions = self.guard()?;
        if sessions.contains_key(session.session_id()) {
            return Err(SessionStoreError::Conflict);
        }
        sessions.insert(session.session_id().clone(), session);
        Ok(())
    }

    fn update(&self, session: TrainingSession) -> Result<(), SessionStoreError> {
        let mut sessions = self.guard()?;
        if !sessions.contains_key(session.session_id()) {
            return Err(SessionStoreError::NotFound);
        }
        sessions.insert(session.session_id().clone(), session);
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<TrainingSession>, SessionStoreError> {
        let sessions = self.guard()?;
        Ok(sessions.get(id).cloned())
    }

    fn remove(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        let mut sessions = self.guard()?;
        sessions.remove(id);
        Ok(())
    }
}
