//! Custom-id scheme for appeal components
//!
//! Every interactive affordance carries its session id in the component
//! custom id, so handlers are flat functions dispatched by identifier with
//! no state captured in closures.

const REQUEST_PREFIX: &str = "appeal_request:";
const SUBMIT_PREFIX: &str = "appeal_submit:";
const APPROVE_PREFIX: &str = "appeal_approve:";
const DENY_PREFIX: &str = "appeal_deny:";

/// A parsed appeal interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppealInteraction {
    /// The appellant pressed "Request Appeal"
    Request { session_id: String },
    /// The appellant submitted the appeal modal
    Submit { session_id: String },
    /// The moderator pressed "Approve Appeal"
    Approve { session_id: String },
    /// The moderator pressed "Deny Appeal"
    Deny { session_id: String },
}

impl AppealInteraction {
    /// Parse a component custom id; `None` when it is not an appeal id
    #[must_use]
    pub fn parse(custom_id: &str) -> Option<Self> {
        if let Some(id) = custom_id.strip_prefix(REQUEST_PREFIX) {
            Some(Self::Request {
                session_id: id.to_string(),
            })
        } else if let Some(id) = custom_id.strip_prefix(SUBMIT_PREFIX) {
            Some(Self::Submit {
                session_id: id.to_string(),
            })
        } else if let Some(id) = custom_id.strip_prefix(APPROVE_PREFIX) {
            Some(Self::Approve {
                session_id: id.to_string(),
            })
        } else if let Some(id) = custom_id.strip_prefix(DENY_PREFIX) {
            Some(Self::Deny {
                session_id: id.to_string(),
            })
        } else {
            None
        }
    }

    /// Render the custom id for this interaction
    #[must_use]
    pub fn custom_id(&self) -> String {
        match self {
            Self::Request { session_id } => format!("{REQUEST_PREFIX}{session_id}"),
            Self::Submit { session_id } => format!("{SUBMIT_PREFIX}{session_id}"),
            Self::Approve { session_id } => format!("{APPROVE_PREFIX}{session_id}"),
            Self::Deny { session_id } => format!("{DENY_PREFIX}{session_id}"),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_id_round_trip() {
        let variants = [
            AppealInteraction::Request {
                session_id: "abc-123".to_string(),
            },
            AppealInteraction::Submit {
                session_id: "abc-123".to_string(),
            },
            AppealInteraction::Approve {
                session_id: "abc-123".to_string(),
            },
            AppealInteraction::Deny {
                session_id: "abc-123".to_string(),
            },
        ];

        for variant in variants {
            let parsed = AppealInteraction::parse(&variant.custom_id()).unwrap();
            assert_eq!(parsed, variant);
        }
    }

    #[test]
    fn test_foreign_custom_ids_are_ignored() {
        assert!(AppealInteraction::parse("other_button:42").is_none());
        assert!(AppealInteraction::parse("appeal").is_none());
        assert!(AppealInteraction::parse("").is_none());
    }
}
