use crate::appeal;
use crate::data::Data;
use crate::{EVENT_TARGET, NOTIFY_TARGET};
use poise::serenity_prelude::{
    self as serenity, Context, EventHandler, GuildId, Interaction, Member, Ready,
};
use tracing::{error, info, warn};

pub struct Handler;

impl Handler {
    /// Fetch the shared bot data out of the client's type map
    async fn data(ctx: &Context) -> Option<Data> {
        ctx.data.read().await.get::<Data>().cloned()
    }
}

#[serenity::async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready, but the cache may not be fully populated yet.
    async fn ready(&self, ctx: Context, ready: Ready) {
        let user_name = ready.user.name.clone();
        let shard_id = ctx.shard_id;
        info!("Connected as {user_name}, shard {shard_id}");
    }

    /// Called when the cache is fully populated.
    async fn cache_ready(&self, ctx: Context, guilds: Vec<GuildId>) {
        let guild_count_cache = ctx.cache.guild_count();
        let guild_count = guilds.len();
        if guild_count != guild_count_cache {
            warn!(
                "Cache guild count mismatch: {guild_count_cache} (cache) vs {guild_count} (actual)"
            );
        }
        info!("Cache ready! The bot is in {guild_count} guild(s)");
    }

    /// Welcome new members with a DM
    async fn guild_member_addition(&self, ctx: Context, new_member: Member) {
        let Some(data) = Self::data(&ctx).await else {
            return;
        };
        let Some(notifier) = &data.notifier else {
            return;
        };

        let guild_name = new_member
            .guild_id
            .name(&ctx.cache)
            .unwrap_or_else(|| "the server".to_string());

        let outcome = notifier
            .send_welcome(new_member.user.id.get(), &guild_name)
            .await;
        info!(
            target: NOTIFY_TARGET,
            user_id = %new_member.user.id,
            guild_id = %new_member.guild_id,
            outcome = %outcome,
            "Welcome DM attempted"
        );
    }

    /// Route appeal buttons and modals to their handlers
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Some(data) = Self::data(&ctx).await else {
            return;
        };

        let result = match &interaction {
            Interaction::Component(component) => {
                appeal::dispatch_component(&ctx, &data, component).await
            }
            Interaction::Modal(modal) => appeal::dispatch_modal(&ctx, &data, modal).await,
            _ => Ok(()),
        };

        if let Err(e) = result {
            error!(
                target: EVENT_TARGET,
                error = %e,
                "Failed to handle interaction"
            );
        }
    }
}
