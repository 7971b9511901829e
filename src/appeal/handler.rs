//! Interaction handlers for the appeal workflow
//!
//! One named handler per affordance, dispatched by parsed custom id. All
//! context (moderator id, action kind, target) travels in the session
//! record, never in closures.

use crate::appeal::error::{AppealError, MAX_APPEAL_TEXT};
use crate::appeal::interaction::AppealInteraction;
use crate::appeal::session::{AppealSession, AppealState};
use crate::data::Data;
use crate::notify::ModerationActionKind;
use crate::{APPEAL_TARGET, Error};
use poise::serenity_prelude as serenity;
use serenity::builder::{
    CreateActionRow, CreateButton, CreateEmbed, CreateInputText, CreateInteractionResponse,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage, CreateMessage,
    CreateModal, EditMember,
};
use serenity::{
    ActionRowComponent, ButtonStyle, ComponentInteraction, GuildId, Http, InputTextStyle,
    ModalInteraction, UserId,
};
use tracing::{error, info, warn};

/// Custom id of the free-text input inside the appeal modal
const APPEAL_TEXT_INPUT: &str = "appeal_text";

/// Which way the moderator resolved an appeal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Approve,
    Deny,
}

/// Route a component (button) interaction to the right appeal handler.
///
/// Custom ids that don't belong to the appeal workflow are ignored so other
/// component owners can run after this dispatcher.
pub async fn dispatch_component(
    ctx: &serenity::Context,
    data: &Data,
    component: &ComponentInteraction,
) -> Result<(), Error> {
    match AppealInteraction::parse(&component.data.custom_id) {
        Some(AppealInteraction::Request { session_id }) => {
            handle_request(ctx, data, component, &session_id).await
        }
        Some(AppealInteraction::Approve { session_id }) => {
            handle_resolution(ctx, data, component, &session_id, Resolution::Approve).await
        }
        Some(AppealInteraction::Deny { session_id }) => {
            handle_resolution(ctx, data, component, &session_id, Resolution::Deny).await
        }
        Some(AppealInteraction::Submit { .. }) | None => Ok(()),
    }
}

/// Route a modal submission to the appeal submission handler
pub async fn dispatch_modal(
    ctx: &serenity::Context,
    data: &Data,
    modal: &ModalInteraction,
) -> Result<(), Error> {
    match AppealInteraction::parse(&modal.data.custom_id) {
        Some(AppealInteraction::Submit { session_id }) => {
            handle_submission(ctx, data, modal, &session_id).await
        }
        _ => Ok(()),
    }
}

/// "Request Appeal" pressed: open the free-text modal
async fn handle_request(
    ctx: &serenity::Context,
    data: &Data,
    component: &ComponentInteraction,
    session_id: &str,
) -> Result<(), Error> {
    let Some(session) = data.appeals.get(session_id) else {
        return ephemeral(ctx, component, "This appeal is no longer available.").await;
    };
    if session.state != AppealState::Offered {
        return ephemeral(ctx, component, "You have already submitted this appeal.").await;
    }

    let input = CreateInputText::new(
        InputTextStyle::Paragraph,
        "Why should this action be reversed?",
        APPEAL_TEXT_INPUT,
    )
    .max_length(u16::try_from(MAX_APPEAL_TEXT).unwrap_or(u16::MAX))
    .required(true);

    let modal = CreateModal::new(
        AppealInteraction::Submit {
            session_id: session_id.to_string(),
        }
        .custom_id(),
        "Submit Appeal",
    )
    .components(vec![CreateActionRow::InputText(input)]);

    component
        .create_response(&ctx.http, CreateInteractionResponse::Modal(modal))
        .await?;
    Ok(())
}

/// Modal submitted: forward the appeal to the designated moderator
async fn handle_submission(
    ctx: &serenity::Context,
    data: &Data,
    modal: &ModalInteraction,
    session_id: &str,
) -> Result<(), Error> {
    let Some(session) = data.appeals.get(session_id) else {
        return ephemeral_modal(ctx, modal, "This appeal is no longer available.").await;
    };

    let Some(text) = extract_appeal_text(modal) else {
        return ephemeral_modal(ctx, modal, "Your appeal text could not be read.").await;
    };

    let Some(moderator_id) = session.moderator_id else {
        warn!(
            target: APPEAL_TARGET,
            session_id = %session_id,
            "Appeal submitted but no moderator is attached"
        );
        return ephemeral_modal(
            ctx,
            modal,
            "This appeal cannot be routed to a moderator. Please contact the server staff directly.",
        )
        .await;
    };

    // Notify the moderator first; the session only moves to Submitted once
    // the appeal message is actually on its way.
    let embed = CreateEmbed::new()
        .title("Moderation Appeal")
        .description(format!(
            "Appeal from <@{}> regarding a {} action",
            session.target_user_id, session.action
        ))
        .colour(serenity::Colour::new(0xFFA500))
        .field("Appeal Text", text.clone(), false);

    let message = CreateMessage::new()
        .embed(embed)
        .components(vec![resolution_row(session_id, false)]);

    let sent = async {
        UserId::new(moderator_id)
            .create_dm_channel(&ctx.http)
            .await?
            .send_message(&ctx.http, message)
            .await
    }
    .await;

    if let Err(e) = sent {
        error!(
            target: APPEAL_TARGET,
            session_id = %session_id,
            moderator_id = %moderator_id,
            error = %e,
            "Failed to deliver appeal to moderator"
        );
        return ephemeral_modal(ctx, modal, "Error submitting appeal. Please try again later.")
            .await;
    }

    match data.appeals.submit(session_id, text) {
        Ok(_) => ephemeral_modal(ctx, modal, "Your appeal has been submitted!").await,
        Err(AppealError::InvalidStateTransition) => {
            ephemeral_modal(ctx, modal, "You have already submitted this appeal.").await
        }
        Err(e) => {
            error!(
                target: APPEAL_TARGET,
                session_id = %session_id,
                error = %e,
                "Failed to record appeal submission"
            );
            ephemeral_modal(ctx, modal, "Error submitting appeal. Please try again later.").await
        }
    }
}

/// Approve/Deny pressed in the moderator's DM
async fn handle_resolution(
    ctx: &serenity::Context,
    data: &Data,
    component: &ComponentInteraction,
    session_id: &str,
    resolution: Resolution,
) -> Result<(), Error> {
    let actor = component.user.id.get();
    let result = match resolution {
        Resolution::Approve => data.appeals.approve(session_id, actor),
        Resolution::Deny => data.appeals.deny(session_id, actor),
    };

    let session = match result {
        Ok(session) => session,
        Err(AppealError::NotAuthorized) => {
            return ephemeral(ctx, component, "You cannot respond to this appeal.").await;
        }
        Err(AppealError::InvalidStateTransition) => {
            return ephemeral(ctx, component, "This appeal has already been resolved.").await;
        }
        Err(AppealError::NotFound(_)) => {
            return ephemeral(ctx, component, "This appeal is no longer available.").await;
        }
        Err(e) => {
            error!(
                target: APPEAL_TARGET,
                session_id = %session_id,
                error = %e,
                "Failed to resolve appeal"
            );
            return ephemeral(ctx, component, "Something went wrong resolving this appeal.").await;
        }
    };

    if resolution == Resolution::Approve {
        if let Err(e) = reverse_action(ctx, &session).await {
            // The appeal stays approved; the reversal just needs a human.
            error!(
                target: APPEAL_TARGET,
                session_id = %session_id,
                action = %session.action,
                error = %e,
                "Failed to reverse action for approved appeal"
            );
        }
    }

    // Disable the Approve/Deny buttons on the moderator's message
    component
        .create_response(
            &ctx.http,
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .components(vec![resolution_row(session_id, true)]),
            ),
        )
        .await?;

    let (announcement, appellant_notice) = match resolution {
        Resolution::Approve => (
            format!("Appeal approved for <@{}>", session.target_user_id),
            "Your appeal has been approved! The moderation action has been reversed.",
        ),
        Resolution::Deny => (
            format!("Appeal denied for <@{}>", session.target_user_id),
            "Your appeal has been denied.",
        ),
    };

    component
        .create_followup(
            &ctx.http,
            CreateInteractionResponseFollowup::new().content(announcement),
        )
        .await?;

    dm_user(&ctx.http, session.target_user_id, appellant_notice).await;

    info!(
        target: APPEAL_TARGET,
        session_id = %session_id,
        moderator_id = %actor,
        outcome = %session.state,
        "Appeal resolved"
    );

    Ok(())
}

/// Undo the original action where mechanically reversible.
///
/// Ban and kick have already removed the member; those kinds are a no-op
/// here and the approval is purely advisory.
async fn reverse_action(ctx: &serenity::Context, session: &AppealSession) -> Result<(), AppealError> {
    let edit = match session.action {
        ModerationActionKind::Timeout => EditMember::new().enable_communication(),
        ModerationActionKind::VoiceMute => EditMember::new().mute(false),
        ModerationActionKind::VoiceDeafen => EditMember::new().deafen(false),
        _ => return Ok(()),
    };

    GuildId::new(session.guild_id)
        .edit_member(
            &ctx.http,
            UserId::new(session.target_user_id),
            edit.audit_log_reason("Appeal approved"),
        )
        .await?;

    Ok(())
}

/// Approve/Deny button row, optionally disabled after resolution
fn resolution_row(session_id: &str, disabled: bool) -> CreateActionRow {
    let approve = CreateButton::new(
        AppealInteraction::Approve {
            session_id: session_id.to_string(),
        }
        .custom_id(),
    )
    .label("Approve Appeal")
    .style(ButtonStyle::Success)
    .disabled(disabled);

    let deny = CreateButton::new(
        AppealInteraction::Deny {
            session_id: session_id.to_string(),
        }
        .custom_id(),
    )
    .label("Deny Appeal")
    .style(ButtonStyle::Danger)
    .disabled(disabled);

    CreateActionRow::Buttons(vec![approve, deny])
}

/// Ephemeral reply to a component interaction
async fn ephemeral(
    ctx: &serenity::Context,
    component: &ComponentInteraction,
    content: &str,
) -> Result<(), Error> {
    component
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

/// Ephemeral reply to a modal submission
async fn ephemeral_modal(
    ctx: &serenity::Context,
    modal: &ModalInteraction,
    content: &str,
) -> Result<(), Error> {
    modal
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

fn extract_appeal_text(modal: &ModalInteraction) -> Option<String> {
    for row in &modal.data.components {
        for component in &row.components {
            if let ActionRowComponent::InputText(input) = component {
                if input.custom_id == APPEAL_TEXT_INPUT {
                    return input.value.clone();
                }
            }
        }
    }
    None
}

/// Best-effort DM, used for resolution notices to the appellant
async fn dm_user(http: &Http, user_id: u64, content: &str) {
    let result = async {
        UserId::new(user_id)
            .create_dm_channel(http)
            .await?
            .send_message(http, CreateMessage::new().content(content))
            .await
    }
    .await;

    if let Err(e) = result {
        warn!(
            target: APPEAL_TARGET,
            user_id = %user_id,
            error = %e,
            "Failed to notify appellant of resolution"
        );
    }
}
