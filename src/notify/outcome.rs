//! Delivery outcome taxonomy
//!
//! Every send resolves to one of these values; failures never cross the
//! composer boundary as errors.

use std::fmt;

/// Result of attempting to deliver a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The message was handed to the platform successfully
    Delivered,
    /// The per-recipient cooldown rejected the send
    Suppressed,
    /// The recipient has DM notifications disabled in their preferences
    OptedOut,
    /// The recipient's privacy settings or a block rejected the DM
    Blocked,
    /// Any other delivery or lookup failure
    Failed,
}

impl DeliveryOutcome {
    #[must_use]
    pub const fn is_delivered(self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivered => write!(f, "delivered"),
            Self::Suppressed => write!(f, "suppressed"),
            Self::OptedOut => write!(f, "opted_out"),
            Self::Blocked => write!(f, "blocked"),
            Self::Failed => write!(f, "failed"),
        }
    }
}
