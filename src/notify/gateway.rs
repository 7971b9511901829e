//! Delivery gateway traits and the serenity implementation
//!
//! The gateway is the only I/O boundary of the notification system. It is a
//! trait so the delivery service can be tested against a mock, with a real
//! implementation backed by the serenity cache and HTTP client.

use crate::appeal::AppealOffer;
use crate::notify::content::RichContent;
use crate::notify::profile::UserProfile;
use ::serenity::http::HttpError;
use poise::serenity_prelude as serenity;
use serenity::builder::{CreateActionRow, CreateButton, CreateMessage};
use serenity::{ButtonStyle, Cache, Http, User, UserId};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while delivering a DM
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The recipient has DMs disabled or blocked the sender
    #[error("recipient rejected the DM (privacy settings or block)")]
    Forbidden,

    /// The recipient could not be resolved at all
    #[error("user {0} could not be resolved")]
    UnknownRecipient(u64),

    /// Discord API error
    #[error("Discord API error: {0}")]
    Api(#[from] Box<serenity::Error>),
}

/// Map a serenity error onto the delivery taxonomy, picking out the
/// HTTP 403 the platform returns for closed DMs.
fn classify(err: serenity::Error) -> DeliveryError {
    if let serenity::Error::Http(HttpError::UnsuccessfulRequest(resp)) = &err {
        if resp.status_code.as_u16() == 403 {
            return DeliveryError::Forbidden;
        }
    }
    DeliveryError::Api(Box::new(err))
}

/// The "send direct message" capability
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DmGateway: Send + Sync {
    /// Send a DM with an optional rich content block and an optional appeal
    /// affordance attached.
    async fn send_dm(
        &self,
        recipient: u64,
        text: String,
        rich: Option<RichContent>,
        offer: Option<AppealOffer>,
    ) -> Result<(), DeliveryError>;
}

/// Optional external profile/statistics storage
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a user's profile document, if one exists
    async fn get_profile(&self, user_id: u64) -> Result<Option<UserProfile>, crate::Error>;

    /// Increment a profile statistic; pure telemetry, callers ignore failures
    async fn increment_stat(
        &self,
        user_id: u64,
        stat: String,
        delta: i64,
    ) -> Result<(), crate::Error>;
}

/// Gateway backed by the serenity cache and HTTP client
#[derive(Clone)]
pub struct SerenityGateway {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

impl SerenityGateway {
    #[must_use]
    pub fn new(http: Arc<Http>, cache: Arc<Cache>) -> Self {
        Self { http, cache }
    }

    /// Resolve a user from the cache first, falling back to the API
    async fn resolve_user(&self, user_id: u64) -> Result<User, DeliveryError> {
        let id = UserId::new(user_id);

        if let Some(user) = self.cache.user(id).map(|u| u.clone()) {
            return Ok(user);
        }

        debug!(
            target: crate::NOTIFY_TARGET,
            user_id = user_id,
            "User not cached, fetching from API"
        );
        self.http.get_user(id).await.map_err(|err| {
            if let serenity::Error::Http(HttpError::UnsuccessfulRequest(resp)) = &err {
                if resp.status_code.as_u16() == 404 {
                    return DeliveryError::UnknownRecipient(user_id);
                }
            }
            classify(err)
        })
    }
}

#[async_trait::async_trait]
impl DmGateway for SerenityGateway {
    async fn send_dm(
        &self,
        recipient: u64,
        text: String,
        rich: Option<RichContent>,
        offer: Option<AppealOffer>,
    ) -> Result<(), DeliveryError> {
        let user = self.resolve_user(recipient).await?;

        let mut message = CreateMessage::new().content(text);
        if let Some(rich) = &rich {
            message = message.embed(rich.to_embed());
        }
        if let Some(offer) = &offer {
            let button = CreateButton::new(offer.custom_id.clone())
                .label("Request Appeal")
                .style(ButtonStyle::Primary);
            message = message.components(vec![CreateActionRow::Buttons(vec![button])]);
        }

        let channel = user
            .create_dm_channel(&self.http)
            .await
            .map_err(classify)?;
        channel
            .send_message(&self.http, message)
            .await
            .map_err(classify)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_non_http_error_is_api() {
        let err = serenity::Error::Other("boom");
        assert!(matches!(classify(err), DeliveryError::Api(_)));
    }

    #[test]
    fn test_delivery_error_display() {
        let err = DeliveryError::UnknownRecipient(42);
        assert_eq!(err.to_string(), "user 42 could not be resolved");

        let err = DeliveryError::Forbidden;
        assert!(err.to_string().contains("privacy settings or block"));
    }
}
