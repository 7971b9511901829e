//! Notification composer
//!
//! Maps a semantic event plus configuration into a plain-text fallback and an
//! optional rich content block. Templates are deterministic; all variation
//! comes from the event fields.

use crate::data::NotifierConfig;
use crate::notify::content::RichContent;
use crate::notify::event::{
    ModerationActionKind, ModerationNotice, NotificationEvent, WarningKind, format_duration,
};
use crate::notify::profile::UserProfile;
use chrono::{Duration, Utc};
use std::fmt::Write as _;

/// Accent colour for welcome messages
const WELCOME_COLOUR: u32 = 0x3498DB;
/// Accent colour for warnings
const WARNING_COLOUR: u32 = 0xE74C3C;
/// Accent colour for profile summaries
const PROFILE_COLOUR: u32 = 0x9B59B6;

/// Build the plain-text fallback and rich content for an event.
///
/// The profile summary is the only event that can come back without rich
/// content: a user with no stored profile gets a short plain-text reply.
#[must_use]
pub fn compose(event: &NotificationEvent, config: &NotifierConfig) -> (String, Option<RichContent>) {
    match event {
        NotificationEvent::Welcome { guild_name } => compose_welcome(guild_name, config),
        NotificationEvent::Warning {
            kind,
            details,
            count,
            guild_name,
        } => compose_warning(*kind, details, *count, guild_name),
        NotificationEvent::ModerationAction(notice) => compose_moderation(notice),
        NotificationEvent::ProfileSummary { user_id, profile } => {
            compose_profile(*user_id, profile.as_ref(), config)
        }
    }
}

/// Consequence text for a given warning count
#[must_use]
pub fn warning_consequence(count: u32) -> &'static str {
    if count >= 6 {
        "Role demotion and extended timeout"
    } else if count >= 3 {
        "Temporary timeout"
    } else if count >= 2 {
        "Brief timeout"
    } else {
        "None for first warning"
    }
}

fn compose_welcome(guild_name: &str, config: &NotifierConfig) -> (String, Option<RichContent>) {
    let prefix = &config.command_prefix;

    let rich = RichContent::new(
        format!("Welcome to {guild_name}! 👋"),
        "Thank you for joining our server! Here's some information to help you get started.",
        WELCOME_COLOUR,
    )
    .field(
        "Server Rules",
        "Please make sure to read the server rules to ensure a positive experience for everyone.",
        false,
    )
    .field(
        "Bot Commands",
        format!("Use `{prefix}help` to see available commands."),
        false,
    )
    .field(
        "User Profile",
        format!("You can check your profile with `{prefix}profile`."),
        false,
    )
    .footer("If you have any questions, feel free to ask a moderator!");

    (
        format!("Welcome to **{guild_name}**! We're glad to have you with us."),
        Some(rich),
    )
}

fn compose_warning(
    kind: WarningKind,
    details: &str,
    count: u32,
    guild_name: &str,
) -> (String, Option<RichContent>) {
    let description = match kind {
        WarningKind::CurseWord => format!(
            "Your message was removed for containing inappropriate language in **{guild_name}**."
        ),
        WarningKind::Spam => format!("You've been warned for spamming in **{guild_name}**."),
        WarningKind::MassMentions => {
            format!("You've been warned for excessive mentions in **{guild_name}**.")
        }
        WarningKind::Other => format!("You've received a warning in **{guild_name}**."),
    };

    let rich = RichContent::new("⚠️ Server Warning", description, WARNING_COLOUR)
        .field("Details", details, false)
        .field("Warning Count", format!("This is warning #{count}"), true)
        .field("Consequence", warning_consequence(count), true)
        .footer("Please review the server rules to avoid further warnings.");

    (
        "You've received a warning in the server.".to_string(),
        Some(rich),
    )
}

fn compose_moderation(notice: &ModerationNotice) -> (String, Option<RichContent>) {
    let attrs = notice.kind.attributes();
    let guild_name = &notice.guild_name;
    let duration = notice.duration_secs.filter(|_| notice.kind.is_timed());

    let description = if notice.kind == ModerationActionKind::Other {
        format!("A moderation action has been taken against you in **{guild_name}**.")
    } else {
        let phrase = attrs.title_verb.to_lowercase();
        let mut desc = format!("You have been {phrase} **{guild_name}**");
        if let Some(secs) = duration {
            let _ = write!(desc, " for **{}**", format_duration(secs));
        }
        desc.push('.');
        desc
    };

    let mut rich = RichContent::new(
        format!("{} {} {}", attrs.emoji, attrs.title_verb, guild_name),
        description,
        attrs.colour,
    )
    .field(
        "📝 Reason",
        notice.reason.clone().unwrap_or_else(|| "No reason provided".to_string()),
        false,
    );

    if let Some(moderator) = &notice.moderator_name {
        rich = rich.field("👤 Moderator", moderator.clone(), true);
    }

    if let Some(secs) = duration {
        let ends_at = Utc::now() + Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX));
        rich = rich.field(
            "⏳ Duration",
            format!("{}, ends <t:{}:R>", format_duration(secs), ends_at.timestamp()),
            true,
        );
    }

    if let Some(members) = notice.guild_member_count {
        rich = rich.field("🏠 Server Info", format!("Members: {members}"), true);
    }

    rich = rich
        .footer("If you believe this was a mistake, use the Appeal button below")
        .timestamp(Utc::now());

    (
        format!("A moderation action has been taken against you in {guild_name}."),
        Some(rich),
    )
}

fn compose_profile(
    user_id: u64,
    profile: Option<&UserProfile>,
    config: &NotifierConfig,
) -> (String, Option<RichContent>) {
    let Some(profile) = profile else {
        return ("You don't have a profile yet.".to_string(), None);
    };

    let mut rich = RichContent::new(
        "🧩 Your Profile",
        profile.bio.clone().unwrap_or_else(|| "No bio set".to_string()),
        PROFILE_COLOUR,
    )
    .field(
        "Username",
        profile.username.clone().unwrap_or_else(|| "Unknown".to_string()),
        true,
    );

    if let Some(created_at) = profile.created_at {
        rich = rich.field("Profile Created", created_at.format("%b %d, %Y").to_string(), true);
    }

    rich = rich.field(
        "Statistics",
        format!(
            "Messages: {}\nCommands: {}\nWarnings: {}",
            profile.stats.messages_sent, profile.stats.commands_used, profile.stats.warnings_received
        ),
        false,
    );

    if !profile.badges.is_empty() {
        let badge_text = profile
            .badges
            .iter()
            .map(|b| format!("{} {}", b.icon.as_deref().unwrap_or("🏆"), b.name))
            .collect::<Vec<_>>()
            .join("\n");
        rich = rich.field("Badges", badge_text, false);
    }

    let theme = profile
        .preferences
        .theme
        .as_deref()
        .unwrap_or(&config.default_theme);
    let language = profile
        .preferences
        .language
        .as_deref()
        .unwrap_or(&config.default_language);
    rich = rich.field(
        "Preferences",
        format!(
            "DM Notifications: {}\nTheme: {}\nLanguage: {}",
            if profile.preferences.dm_notifications {
                "Enabled"
            } else {
                "Disabled"
            },
            capitalise(theme),
            language.to_uppercase()
        ),
        false,
    );

    if let Some(avatar_url) = &profile.avatar_url {
        rich = rich.thumbnail(avatar_url.clone());
    }

    rich = rich.footer(format!("User ID: {user_id}"));

    ("Here's your profile information!".to_string(), Some(rich))
}

/// Uppercase the first character only
fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
