//! Error types for the appeal workflow

use poise::serenity_prelude as serenity;
use thiserror::Error;

/// Maximum length of the free-text appeal body
pub(crate) const MAX_APPEAL_TEXT: usize = 1000;

/// Errors that can occur while driving an appeal session
#[derive(Debug, Error)]
pub enum AppealError {
    /// The acting user is not the designated moderator
    #[error("Only the designated moderator may act on this appeal")]
    NotAuthorized,

    /// The session is not in a state that permits the requested transition
    #[error("Invalid appeal state transition")]
    InvalidStateTransition,

    /// No session with the given id (typically lost to a restart)
    #[error("Appeal session not found: {0}")]
    NotFound(String),

    /// Appeal text exceeded the allowed length
    #[error("Appeal text is too long: {0} characters (max {MAX_APPEAL_TEXT})")]
    TextTooLong(usize),

    /// The original moderator could not be resolved for routing
    #[error("The original moderator could not be resolved")]
    ModeratorUnresolvable,

    /// Discord API error
    #[error("Discord API error: {0}")]
    DiscordApi(#[from] Box<serenity::Error>),
}

impl From<serenity::Error> for AppealError {
    fn from(error: serenity::Error) -> Self {
        Self::DiscordApi(Box::new(error))
    }
}

/// Result type for appeal operations
pub type AppealResult<T> = Result<T, AppealError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = AppealError::NotFound("abc".to_string());
        assert_eq!(error.to_string(), "Appeal session not found: abc");

        let error = AppealError::TextTooLong(1200);
        assert!(error.to_string().contains("1200"));
        assert!(error.to_string().contains("1000"));
    }
}
