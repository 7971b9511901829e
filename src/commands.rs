use crate::notify::{DeliveryOutcome, ModerationActionKind, ModerationNotice, WarningKind};
use crate::{Context, Error};
use poise::command;
use poise::serenity_prelude as serenity;

/// Warning subtype, as offered to moderators in the slash command picker
#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum WarningChoice {
    #[name = "Inappropriate language"]
    Language,
    #[name = "Spam"]
    Spam,
    #[name = "Mass mentions"]
    MassMentions,
    #[name = "Other"]
    Other,
}

impl From<WarningChoice> for WarningKind {
    fn from(choice: WarningChoice) -> Self {
        match choice {
            WarningChoice::Language => Self::CurseWord,
            WarningChoice::Spam => Self::Spam,
            WarningChoice::MassMentions => Self::MassMentions,
            WarningChoice::Other => Self::Other,
        }
    }
}

/// One-line summary of a delivery outcome, for the moderator's reply
fn outcome_line(outcome: DeliveryOutcome) -> &'static str {
    match outcome {
        DeliveryOutcome::Delivered => "They have been notified by DM.",
        DeliveryOutcome::Suppressed => "The DM was suppressed by the notification cooldown.",
        DeliveryOutcome::OptedOut => "They have opted out of DM notifications.",
        DeliveryOutcome::Blocked => "Their DMs are closed, so they could not be notified.",
        DeliveryOutcome::Failed => "The notification DM could not be delivered.",
    }
}

/// Send yourself your profile summary via DM
///
/// This command is used to review your own profile card and preferences.
#[command(prefix_command, slash_command)]
pub async fn profile(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let Some(notifier) = &data.notifier else {
        ctx.say("Notifications are not available right now.").await?;
        return Ok(());
    };

    let outcome = notifier.send_profile_summary(ctx.author().id.get()).await;
    let reply = match outcome {
        DeliveryOutcome::Delivered => "Check your DMs!",
        _ => outcome_line(outcome),
    };

    ctx.send(poise::CreateReply::default().content(reply).ephemeral(true))
        .await?;
    Ok(())
}

/// Warn a user and notify them via DM
///
/// This command is used by moderators to issue a warning to a misbehaving user.
#[command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MODERATE_MEMBERS"
)]
pub async fn warn(
    ctx: Context<'_>,
    #[description = "User to warn"] user: serenity::User,
    #[description = "What the warning is for"] kind: WarningChoice,
    #[description = "Details shown to the user"] details: Option<String>,
) -> Result<(), Error> {
    let data = ctx.data();
    let Some(notifier) = &data.notifier else {
        ctx.say("Notifications are not available right now.").await?;
        return Ok(());
    };

    // guild_only guarantees a guild id here
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };
    let guild_name = guild_id
        .name(ctx.serenity_context())
        .unwrap_or_else(|| "the server".to_string());

    let count = data.bump_warning_count(user.id.get(), guild_id.get());
    let details = details.unwrap_or_else(|| "No details provided".to_string());

    let outcome = notifier
        .send_warning(user.id.get(), kind.into(), &details, count, &guild_name)
        .await;

    ctx.say(format!(
        "Warning #{count} recorded for {}. {}",
        user.name,
        outcome_line(outcome)
    ))
    .await?;
    Ok(())
}

/// Time out a user and notify them via DM
///
/// This command is used by moderators to time out a user, with an appeal
/// button attached to the notification.
#[command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MODERATE_MEMBERS"
)]
pub async fn timeout(
    ctx: Context<'_>,
    #[description = "User to time out"] user: serenity::User,
    #[description = "Timeout length in minutes"] minutes: u64,
    #[description = "Reason shown to the user"] reason: Option<String>,
) -> Result<(), Error> {
    let data = ctx.data();
    let Some(notifier) = &data.notifier else {
        ctx.say("Notifications are not available right now.").await?;
        return Ok(());
    };

    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };
    let (guild_name, member_count) = {
        match ctx.guild() {
            Some(guild) => (guild.name.clone(), Some(guild.member_count)),
            None => ("the server".to_string(), None),
        }
    };

    let duration_secs = minutes * 60;
    let timeout_until = chrono::Utc::now() + chrono::Duration::seconds(duration_secs as i64);

    let mut member = guild_id.member(ctx.serenity_context(), user.id).await?;
    member
        .disable_communication_until_datetime(ctx.serenity_context(), timeout_until.into())
        .await?;

    let notice = ModerationNotice {
        kind: ModerationActionKind::Timeout,
        reason: reason.clone(),
        duration_secs: Some(duration_secs),
        moderator_name: Some(ctx.author().name.clone()),
        guild_name,
        guild_member_count: member_count,
    };

    let outcome = notifier
        .send_moderation_notice(
            user.id.get(),
            guild_id.get(),
            notice,
            Some(ctx.author().id.get()),
        )
        .await;

    ctx.say(format!(
        "Timed out {} for {} minute{}. {}",
        user.name,
        minutes,
        if minutes == 1 { "" } else { "s" },
        outcome_line(outcome)
    ))
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test that the profile command is properly defined
    #[test]
    fn test_profile_command_definition() {
        let cmd = profile();
        assert_eq!(cmd.name, "profile");
        assert!(
            cmd.description
                .unwrap_or_default()
                .contains("profile summary")
        );
        assert!(!cmd.guild_only);
    }

    #[test]
    fn test_warn_command_definition() {
        let cmd = warn();
        assert_eq!(cmd.name, "warn");
        assert!(cmd.guild_only);
        assert_eq!(cmd.parameters.len(), 3);
        assert_eq!(cmd.parameters[0].name, "user");
    }

    #[test]
    fn test_timeout_command_definition() {
        let cmd = timeout();
        assert_eq!(cmd.name, "timeout");
        assert!(cmd.guild_only);
        assert_eq!(cmd.parameters.len(), 3);
    }

    // This test verifies that the commands can be registered as slash commands
    #[test]
    fn test_commands_create_as_slash_commands() {
        assert!(profile().create_as_slash_command().is_some());
        assert!(warn().create_as_slash_command().is_some());
        assert!(timeout().create_as_slash_command().is_some());
    }

    #[test]
    fn test_warning_choice_maps_to_kind() {
        assert_eq!(WarningKind::from(WarningChoice::Language), WarningKind::CurseWord);
        assert_eq!(WarningKind::from(WarningChoice::Spam), WarningKind::Spam);
        assert_eq!(
            WarningKind::from(WarningChoice::MassMentions),
            WarningKind::MassMentions
        );
        assert_eq!(WarningKind::from(WarningChoice::Other), WarningKind::Other);
    }

    #[test]
    fn test_outcome_lines_are_distinct() {
        let outcomes = [
            DeliveryOutcome::Delivered,
            DeliveryOutcome::Suppressed,
            DeliveryOutcome::OptedOut,
            DeliveryOutcome::Blocked,
            DeliveryOutcome::Failed,
        ];
        for a in outcomes {
            for b in outcomes {
                if a != b {
                    assert_ne!(outcome_line(a), outcome_line(b));
                }
            }
        }
    }
}
