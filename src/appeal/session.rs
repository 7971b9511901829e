//! Appeal session record and state machine
//!
//! A session is created when a moderation notice carries an appeal offer and
//! walks through Offered -> Submitted -> Approved | Denied. Transitions are
//! guarded; authorization failures never mutate state.

use crate::appeal::error::{AppealError, AppealResult, MAX_APPEAL_TEXT};
use crate::notify::ModerationActionKind;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

/// Lifecycle states of an appeal session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppealState {
    /// The appeal button has been offered but not pressed
    Offered,
    /// The appellant submitted text and the moderator was notified
    Submitted,
    /// The moderator approved; reversible actions have been reversed
    Approved,
    /// The moderator denied
    Denied,
}

impl std::fmt::Display for AppealState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Offered => write!(f, "Offered"),
            Self::Submitted => write!(f, "Submitted"),
            Self::Approved => write!(f, "Approved"),
            Self::Denied => write!(f, "Denied"),
        }
    }
}

/// One appeal, from offer to resolution
#[derive(Debug, Clone)]
pub struct AppealSession {
    /// Unique ID of this session, embedded in component custom ids
    pub id: String,
    /// Guild where the original action happened
    pub guild_id: u64,
    /// User the action was taken against
    pub target_user_id: u64,
    /// The only identity allowed to approve or deny
    pub moderator_id: Option<u64>,
    /// Kind of the original action, used to decide reversibility
    pub action: ModerationActionKind,
    /// Current state
    pub state: AppealState,
    /// Text submitted by the appellant
    pub appeal_text: Option<String>,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When the session was approved or denied
    pub resolved_at: Option<DateTime<Utc>>,
}

impl AppealSession {
    /// Create a new session in the Offered state
    #[must_use]
    pub fn new(
        guild_id: u64,
        target_user_id: u64,
        moderator_id: Option<u64>,
        action: ModerationActionKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            guild_id,
            target_user_id,
            moderator_id,
            action,
            state: AppealState::Offered,
            appeal_text: None,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    /// Record the appellant's text, transitioning to Submitted
    ///
    /// # Errors
    /// Returns an error if the session is not Offered, the text exceeds the
    /// length cap, or no moderator is attached to route the appeal to.
    pub fn submit(&mut self, text: impl Into<String>) -> AppealResult<()> {
        if self.state != AppealState::Offered {
            return Err(AppealError::InvalidStateTransition);
        }
        if self.moderator_id.is_none() {
            return Err(AppealError::ModeratorUnresolvable);
        }

        let text = text.into();
        if text.chars().count() > MAX_APPEAL_TEXT {
            return Err(AppealError::TextTooLong(text.chars().count()));
        }

        self.appeal_text = Some(text);
        self.state = AppealState::Submitted;

        info!(
            target: crate::APPEAL_TARGET,
            session_id = %self.id,
            user_id = %self.target_user_id,
            guild_id = %self.guild_id,
            "Appeal submitted"
        );

        Ok(())
    }

    /// Approve the appeal, transitioning to Approved
    ///
    /// # Errors
    /// Returns `NotAuthorized` for anyone but the designated moderator and
    /// `InvalidStateTransition` if the session is not Submitted. Neither
    /// mutates the session.
    pub fn approve_by(&mut self, actor: u64) -> AppealResult<()> {
        self.authorize(actor)?;
        if self.state != AppealState::Submitted {
            return Err(AppealError::InvalidStateTransition);
        }

        self.state = AppealState::Approved;
        self.resolved_at = Some(Utc::now());

        info!(
            target: crate::APPEAL_TARGET,
            session_id = %self.id,
            user_id = %self.target_user_id,
            action = %self.action,
            "Appeal approved"
        );

        Ok(())
    }

    /// Deny the appeal, transitioning to Denied
    ///
    /// # Errors
    /// Same guards as [`AppealSession::approve_by`].
    pub fn deny_by(&mut self, actor: u64) -> AppealResult<()> {
        self.authorize(actor)?;
        if self.state != AppealState::Submitted {
            return Err(AppealError::InvalidStateTransition);
        }

        self.state = AppealState::Denied;
        self.resolved_at = Some(Utc::now());

        info!(
            target: crate::APPEAL_TARGET,
            session_id = %self.id,
            user_id = %self.target_user_id,
            action = %self.action,
            "Appeal denied"
        );

        Ok(())
    }

    fn authorize(&self, actor: u64) -> AppealResult<()> {
        if self.moderator_id == Some(actor) {
            Ok(())
        } else {
            Err(AppealError::NotAuthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOD: u64 = 111;
    const STRANGER: u64 = 222;

    fn session() -> AppealSession {
        AppealSession::new(1, 42, Some(MOD), ModerationActionKind::Timeout)
    }

    #[test]
    fn test_full_approval_path() {
        let mut s = session();
        assert_eq!(s.state, AppealState::Offered);

        s.submit("Please reconsider").unwrap();
        assert_eq!(s.state, AppealState::Submitted);
        assert_eq!(s.appeal_text.as_deref(), Some("Please reconsider"));

        s.approve_by(MOD).unwrap();
        assert_eq!(s.state, AppealState::Approved);
        assert!(s.resolved_at.is_some());
    }

    #[test]
    fn test_denial_path() {
        let mut s = session();
        s.submit("Please reconsider").unwrap();
        s.deny_by(MOD).unwrap();
        assert_eq!(s.state, AppealState::Denied);
    }

    #[test]
    fn test_non_moderator_cannot_resolve() {
        let mut s = session();
        s.submit("Please reconsider").unwrap();

        assert!(matches!(s.approve_by(STRANGER), Err(AppealError::NotAuthorized)));
        assert!(matches!(s.deny_by(STRANGER), Err(AppealError::NotAuthorized)));
        // State untouched
        assert_eq!(s.state, AppealState::Submitted);
        assert!(s.resolved_at.is_none());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut s = session();
        s.submit("Please reconsider").unwrap();
        s.approve_by(MOD).unwrap();

        // Further presses have no effect
        assert!(matches!(s.approve_by(MOD), Err(AppealError::InvalidStateTransition)));
        assert!(matches!(s.deny_by(MOD), Err(AppealError::InvalidStateTransition)));
        assert_eq!(s.state, AppealState::Approved);
    }

    #[test]
    fn test_cannot_resolve_before_submission() {
        let mut s = session();
        assert!(matches!(s.approve_by(MOD), Err(AppealError::InvalidStateTransition)));
        assert_eq!(s.state, AppealState::Offered);
    }

    #[test]
    fn test_cannot_submit_twice() {
        let mut s = session();
        s.submit("first").unwrap();
        assert!(matches!(s.submit("second"), Err(AppealError::InvalidStateTransition)));
        assert_eq!(s.appeal_text.as_deref(), Some("first"));
    }

    #[test]
    fn test_submit_rejects_oversized_text() {
        let mut s = session();
        let text = "x".repeat(1001);
        assert!(matches!(s.submit(text), Err(AppealError::TextTooLong(1001))));
        assert_eq!(s.state, AppealState::Offered);
    }

    #[test]
    fn test_submit_requires_moderator() {
        let mut s = AppealSession::new(1, 42, None, ModerationActionKind::Timeout);
        assert!(matches!(
            s.submit("Please reconsider"),
            Err(AppealError::ModeratorUnresolvable)
        ));
        assert_eq!(s.state, AppealState::Offered);
    }
}
