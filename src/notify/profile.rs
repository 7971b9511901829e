//! User profile document model
//!
//! The profile itself lives in external storage; these types only describe
//! the document shape the composer renders, with defaults for every field
//! the store may omit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics block of a user profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileStats {
    #[serde(default)]
    pub messages_sent: u64,
    #[serde(default)]
    pub commands_used: u64,
    #[serde(default)]
    pub warnings_received: u64,
}

/// A badge earned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Badge {
    /// Emoji or short icon string; rendered as 🏆 when absent
    pub icon: Option<String>,
    pub name: String,
}

/// Per-user notification preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Whether the user accepts DM notifications at all
    #[serde(default = "default_true")]
    pub dm_notifications: bool,
    /// Preferred theme; falls back to the configured default
    pub theme: Option<String>,
    /// Preferred language code; falls back to the configured default
    pub language: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dm_notifications: true,
            theme: None,
            language: None,
        }
    }
}

/// A user profile as stored by the external profile store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stats: ProfileStats,
    #[serde(default)]
    pub badges: Vec<Badge>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub avatar_url: Option<String>,
}
