//! Appeal workflow for moderation-action notices
//!
//! A moderation DM can carry a "Request Appeal" button. The flow is driven by
//! a small state machine per session (offered, submitted, resolved) and a
//! flat set of named interaction handlers dispatched by custom id, with all
//! context carried in the session record rather than in nested closures.
//! Sessions live in memory only; a restart silently drops pending appeals.

mod error;
mod handler;
mod interaction;
mod session;
mod store;

pub use error::{AppealError, AppealResult};
pub use handler::{dispatch_component, dispatch_modal};
pub use interaction::AppealInteraction;
pub use session::{AppealSession, AppealState};
pub use store::AppealStore;

/// The interactive affordance attached to a moderation DM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppealOffer {
    /// Component custom id that routes back to the owning session
    pub custom_id: String,
}

impl AppealOffer {
    /// Build the offer for a session
    #[must_use]
    pub fn for_session(session_id: &str) -> Self {
        Self {
            custom_id: AppealInteraction::Request {
                session_id: session_id.to_string(),
            }
            .custom_id(),
        }
    }
}
