//! In-memory store for appeal sessions

use crate::appeal::error::{AppealError, AppealResult};
use crate::appeal::session::AppealSession;
use dashmap::DashMap;
use std::sync::Arc;

/// Store for appeal sessions, keyed by session id.
///
/// Sessions are never persisted; a process restart drops them and stale
/// buttons resolve to a "no longer available" notice at dispatch time.
#[derive(Clone, Default)]
pub struct AppealStore {
    sessions: Arc<DashMap<String, AppealSession>>,
}

impl AppealStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// Add a session
    pub fn add(&self, session: AppealSession) {
        self.sessions.insert(session.id.clone(), session);
    }

    /// Get a snapshot of a session by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<AppealSession> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    /// Record the appellant's text for a session
    ///
    /// # Errors
    /// Propagates state-machine errors; `NotFound` for unknown ids.
    pub fn submit(&self, id: &str, text: impl Into<String>) -> AppealResult<AppealSession> {
        let mut entry = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| AppealError::NotFound(id.to_string()))?;
        entry.submit(text)?;
        Ok(entry.value().clone())
    }

    /// Approve a session on behalf of `actor`
    ///
    /// # Errors
    /// Propagates state-machine and authorization errors; `NotFound` for
    /// unknown ids.
    pub fn approve(&self, id: &str, actor: u64) -> AppealResult<AppealSession> {
        let mut entry = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| AppealError::NotFound(id.to_string()))?;
        entry.approve_by(actor)?;
        Ok(entry.value().clone())
    }

    /// Deny a session on behalf of `actor`
    ///
    /// # Errors
    /// Propagates state-machine and authorization errors; `NotFound` for
    /// unknown ids.
    pub fn deny(&self, id: &str, actor: u64) -> AppealResult<AppealSession> {
        let mut entry = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| AppealError::NotFound(id.to_string()))?;
        entry.deny_by(actor)?;
        Ok(entry.value().clone())
    }

    /// Number of tracked sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
