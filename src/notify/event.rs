//! Notification event types
//!
//! This module defines the semantic events that can be turned into a direct
//! message, along with the fixed per-action attribute table and the duration
//! formatting shared by the composer.

use crate::notify::profile::UserProfile;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of moderation action being reported to the target user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModerationActionKind {
    /// Server ban
    Ban,
    /// Server kick
    Kick,
    /// Text channel timeout
    Timeout,
    /// Text mute
    Mute,
    /// Text unmute
    Unmute,
    /// Voice mute
    VoiceMute,
    /// Voice unmute
    VoiceUnmute,
    /// Voice deafen
    VoiceDeafen,
    /// Voice undeafen
    VoiceUndeafen,
    /// Formal warning
    Warning,
    /// Anything the table doesn't know about
    Other,
}

/// Fixed presentation attributes for a moderation action kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionAttributes {
    /// Emoji prefix used in the title and description
    pub emoji: &'static str,
    /// Accent colour for the rich content block
    pub colour: u32,
    /// Title verb phrase, completed with the guild name
    pub title_verb: &'static str,
}

impl ModerationActionKind {
    /// Look up the presentation attributes for this action kind.
    ///
    /// The match is exhaustive so adding a new kind without presentation
    /// attributes fails to compile.
    #[must_use]
    pub const fn attributes(self) -> ActionAttributes {
        match self {
            Self::Ban => ActionAttributes {
                emoji: "🔨",
                colour: 0xFF0000,
                title_verb: "Banned from",
            },
            Self::Kick => ActionAttributes {
                emoji: "👢",
                colour: 0xFFA500,
                title_verb: "Kicked from",
            },
            Self::Timeout => ActionAttributes {
                emoji: "⏰",
                colour: 0xFFFF00,
                title_verb: "Timed out in",
            },
            Self::Mute => ActionAttributes {
                emoji: "🔇",
                colour: 0xFFA500,
                title_verb: "Muted in",
            },
            Self::Unmute => ActionAttributes {
                emoji: "🔊",
                colour: 0x00FF00,
                title_verb: "Unmuted in",
            },
            Self::VoiceMute => ActionAttributes {
                emoji: "🎤❌",
                colour: 0xFFA500,
                title_verb: "Voice muted in",
            },
            Self::VoiceUnmute => ActionAttributes {
                emoji: "🎤✅",
                colour: 0x00FF00,
                title_verb: "Voice unmuted in",
            },
            Self::VoiceDeafen => ActionAttributes {
                emoji: "🔇❌",
                colour: 0xFFA500,
                title_verb: "Voice deafened in",
            },
            Self::VoiceUndeafen => ActionAttributes {
                emoji: "🔇✅",
                colour: 0x00FF00,
                title_verb: "Voice undeafened in",
            },
            Self::Warning => ActionAttributes {
                emoji: "⚠️",
                colour: 0xFFFF00,
                title_verb: "Warned in",
            },
            Self::Other => ActionAttributes {
                emoji: "📝",
                colour: 0x7289DA,
                title_verb: "Moderation action in",
            },
        }
    }

    /// Whether a duration makes sense for this action kind
    #[must_use]
    pub const fn is_timed(self) -> bool {
        matches!(self, Self::Timeout | Self::Ban | Self::Mute)
    }

    /// Whether an approved appeal can mechanically undo this action.
    ///
    /// Ban and kick have already removed the member and cannot be undone
    /// through the appeal path.
    #[must_use]
    pub const fn is_reversible(self) -> bool {
        matches!(self, Self::Timeout | Self::VoiceMute | Self::VoiceDeafen)
    }
}

impl fmt::Display for ModerationActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ban => write!(f, "Ban"),
            Self::Kick => write!(f, "Kick"),
            Self::Timeout => write!(f, "Timeout"),
            Self::Mute => write!(f, "Mute"),
            Self::Unmute => write!(f, "Unmute"),
            Self::VoiceMute => write!(f, "Voice Mute"),
            Self::VoiceUnmute => write!(f, "Voice Unmute"),
            Self::VoiceDeafen => write!(f, "Voice Deafen"),
            Self::VoiceUndeafen => write!(f, "Voice Undeafen"),
            Self::Warning => write!(f, "Warning"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// Subtype of a warning notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Message removed for inappropriate language
    CurseWord,
    /// Repeated or flooding messages
    Spam,
    /// Excessive user/role mentions
    MassMentions,
    /// Any other reason
    Other,
}

/// Details of a moderation action to be reported via DM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationNotice {
    pub kind: ModerationActionKind,
    /// Reason given by the moderator, rendered as "No reason provided" when absent
    pub reason: Option<String>,
    /// Duration in seconds for timed actions
    pub duration_secs: Option<u64>,
    /// Display name of the acting moderator
    pub moderator_name: Option<String>,
    /// Name of the guild where the action occurred
    pub guild_name: String,
    /// Member count of the guild, when known
    pub guild_member_count: Option<u64>,
}

impl ModerationNotice {
    /// Create a notice with only the required fields set
    #[must_use]
    pub fn new(kind: ModerationActionKind, guild_name: impl Into<String>) -> Self {
        Self {
            kind,
            reason: None,
            duration_secs: None,
            moderator_name: None,
            guild_name: guild_name.into(),
            guild_member_count: None,
        }
    }
}

/// A semantic event that can be composed into a direct message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NotificationEvent {
    /// Greeting for a user who just joined a guild
    Welcome { guild_name: String },
    /// Warning issued by the moderation system
    Warning {
        kind: WarningKind,
        details: String,
        /// Total warnings for this user, including this one
        count: u32,
        guild_name: String,
    },
    /// Notice of a moderation action taken against the recipient
    ModerationAction(ModerationNotice),
    /// The recipient's own profile, or a fallback when none exists
    ProfileSummary {
        user_id: u64,
        profile: Option<UserProfile>,
    },
}

/// Format a duration in seconds as a human-readable string.
///
/// Uses the largest unit that fits at least once, with integer division and
/// no rounding: 90 seconds is "1 minute", 7199 seconds is "1 hour".
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    fn unit(value: u64, name: &str) -> String {
        if value == 1 {
            format!("1 {name}")
        } else {
            format!("{value} {name}s")
        }
    }

    if seconds < 60 {
        unit(seconds, "second")
    } else if seconds < 3600 {
        unit(seconds / 60, "minute")
    } else if seconds < 86400 {
        unit(seconds / 3600, "hour")
    } else {
        unit(seconds / 86400, "day")
    }
}
