//! DM delivery service
//!
//! Orchestrates a send: preference check, cooldown gate, gateway delivery,
//! telemetry. Every send resolves to a [`DeliveryOutcome`] value; collaborator
//! failures are logged and downgraded, never propagated.

use crate::appeal::{AppealOffer, AppealSession, AppealStore};
use crate::data::NotifierConfig;
use crate::notify::compose::compose;
use crate::notify::cooldown::CooldownGate;
use crate::notify::event::{ModerationNotice, NotificationEvent, WarningKind};
use crate::notify::gateway::{DeliveryError, DmGateway, ProfileStore};
use crate::notify::outcome::DeliveryOutcome;
use crate::notify::profile::UserProfile;
use crate::NOTIFY_TARGET;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Cooldown entries older than this are dropped by the prune task
const COOLDOWN_MAX_AGE_SECS: i64 = 600;

/// Stat bumped after each successfully delivered DM
const DM_RECEIVED_STAT: &str = "dm_messages_received";

/// The notification service. Cheap to clone; all state is shared.
#[derive(Clone)]
pub struct DmNotifier {
    gate: Arc<CooldownGate>,
    gateway: Arc<dyn DmGateway>,
    profiles: Option<Arc<dyn ProfileStore>>,
    appeals: AppealStore,
    config: NotifierConfig,
}

impl DmNotifier {
    /// Create a notifier with its own cooldown state
    #[must_use]
    pub fn new(
        gateway: Arc<dyn DmGateway>,
        profiles: Option<Arc<dyn ProfileStore>>,
        appeals: AppealStore,
        config: NotifierConfig,
    ) -> Self {
        Self {
            gate: Arc::new(CooldownGate::new()),
            gateway,
            profiles,
            appeals,
            config,
        }
    }

    /// The cooldown gate, shared with the prune task
    #[must_use]
    pub fn gate(&self) -> &CooldownGate {
        &self.gate
    }

    /// Spawn the periodic cooldown prune task so the recipient map stays
    /// bounded across long uptimes
    pub fn start_prune_task(&self) {
        let gate = Arc::clone(&self.gate);
        let interval_secs = self.config.cooldown_prune_interval_secs;

        tokio::spawn(async move {
            info!(
                target: NOTIFY_TARGET,
                interval_secs = interval_secs,
                "Starting cooldown prune task"
            );
            let mut interval =
                tokio::time::interval(tokio::time::Duration::from_secs(interval_secs));
            loop {
                interval.tick().await;
                gate.prune(chrono::Duration::seconds(COOLDOWN_MAX_AGE_SECS));
            }
        });
    }

    /// Welcome a user who just joined
    pub async fn send_welcome(&self, recipient: u64, guild_name: &str) -> DeliveryOutcome {
        let event = NotificationEvent::Welcome {
            guild_name: guild_name.to_string(),
        };
        self.send_event(recipient, &event, None).await
    }

    /// Notify a user of a warning
    pub async fn send_warning(
        &self,
        recipient: u64,
        kind: WarningKind,
        details: &str,
        count: u32,
        guild_name: &str,
    ) -> DeliveryOutcome {
        let event = NotificationEvent::Warning {
            kind,
            details: details.to_string(),
            count,
            guild_name: guild_name.to_string(),
        };
        self.send_event(recipient, &event, None).await
    }

    /// DM a user their own profile summary, or the plain "no profile"
    /// fallback when the store has nothing for them
    pub async fn send_profile_summary(&self, recipient: u64) -> DeliveryOutcome {
        // The summary content and the preference check share one lookup
        let profile = match self.fetch_profile(recipient).await {
            Ok(profile) => profile,
            Err(outcome) => return outcome,
        };

        let event = NotificationEvent::ProfileSummary {
            user_id: recipient,
            profile: profile.clone(),
        };
        self.deliver(recipient, &event, None, profile.as_ref()).await
    }

    /// Notify a user of a moderation action taken against them.
    ///
    /// When the acting moderator is known an appeal session is opened and a
    /// "Request Appeal" button rides along with the notice.
    pub async fn send_moderation_notice(
        &self,
        recipient: u64,
        guild_id: u64,
        notice: ModerationNotice,
        moderator_id: Option<u64>,
    ) -> DeliveryOutcome {
        let session = moderator_id
            .map(|moderator_id| AppealSession::new(guild_id, recipient, Some(moderator_id), notice.kind));
        let offer = session.as_ref().map(|session| AppealOffer::for_session(&session.id));

        let event = NotificationEvent::ModerationAction(notice);
        let outcome = self.send_event(recipient, &event, offer).await;

        // The appeal button only exists on a delivered message, so an
        // undelivered notice must not leave a session behind in the store
        if outcome.is_delivered() {
            if let Some(session) = session {
                self.appeals.add(session);
            }
        }
        outcome
    }

    /// Compose an event and run the full delivery sequence
    async fn send_event(
        &self,
        recipient: u64,
        event: &NotificationEvent,
        offer: Option<AppealOffer>,
    ) -> DeliveryOutcome {
        let profile = match self.fetch_profile(recipient).await {
            Ok(profile) => profile,
            Err(outcome) => return outcome,
        };
        self.deliver(recipient, event, offer, profile.as_ref()).await
    }

    /// Look up the recipient's profile, applying the lookup-failure policy.
    /// A missing store or a tolerated failure both read as "no profile".
    async fn fetch_profile(&self, recipient: u64) -> Result<Option<UserProfile>, DeliveryOutcome> {
        let Some(store) = &self.profiles else {
            return Ok(None);
        };
        match store.get_profile(recipient).await {
            Ok(profile) => Ok(profile),
            Err(e) => {
                warn!(
                    target: NOTIFY_TARGET,
                    user_id = %recipient,
                    error = %e,
                    "Preference lookup failed"
                );
                if self.config.send_on_preference_error {
                    Ok(None)
                } else {
                    Err(DeliveryOutcome::Failed)
                }
            }
        }
    }

    /// Run the delivery sequence with the profile already in hand
    async fn deliver(
        &self,
        recipient: u64,
        event: &NotificationEvent,
        offer: Option<AppealOffer>,
        profile: Option<&UserProfile>,
    ) -> DeliveryOutcome {
        // Preference check comes first and never consumes a cooldown slot.
        if let Some(profile) = profile {
            if !profile.preferences.dm_notifications {
                info!(
                    target: NOTIFY_TARGET,
                    user_id = %recipient,
                    "User has opted out of DM notifications"
                );
                return DeliveryOutcome::OptedOut;
            }
        }

        let (text, rich) = compose(event, &self.config);

        if !self
            .gate
            .allow(recipient, text.chars().count(), rich.is_some())
        {
            return DeliveryOutcome::Suppressed;
        }

        match self.gateway.send_dm(recipient, text, rich, offer).await {
            Ok(()) => {
                if let Some(store) = &self.profiles {
                    if let Err(e) = store
                        .increment_stat(recipient, DM_RECEIVED_STAT.to_string(), 1)
                        .await
                    {
                        debug!(
                            target: NOTIFY_TARGET,
                            user_id = %recipient,
                            error = %e,
                            "Failed to update DM stats"
                        );
                    }
                }
                info!(
                    target: NOTIFY_TARGET,
                    user_id = %recipient,
                    outcome = %DeliveryOutcome::Delivered,
                    "DM delivered"
                );
                DeliveryOutcome::Delivered
            }
            Err(DeliveryError::Forbidden) => {
                info!(
                    target: NOTIFY_TARGET,
                    user_id = %recipient,
                    "Cannot send DM (forbidden, DMs closed)"
                );
                DeliveryOutcome::Blocked
            }
            Err(e) => {
                error!(
                    target: NOTIFY_TARGET,
                    user_id = %recipient,
                    error = %e,
                    "Error sending DM"
                );
                DeliveryOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::gateway::{MockDmGateway, MockProfileStore};
    use crate::notify::profile::Preferences;

    fn opted_out_profile() -> UserProfile {
        UserProfile {
            preferences: Preferences {
                dm_notifications: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn notifier(
        gateway: MockDmGateway,
        profiles: Option<MockProfileStore>,
        config: NotifierConfig,
    ) -> DmNotifier {
        DmNotifier::new(
            Arc::new(gateway),
            profiles.map(|p| Arc::new(p) as Arc<dyn ProfileStore>),
            AppealStore::new(),
            config,
        )
    }

    #[tokio::test]
    async fn test_forbidden_maps_to_blocked() {
        let mut gateway = MockDmGateway::new();
        gateway
            .expect_send_dm()
            .returning(|_, _, _, _| Err(DeliveryError::Forbidden));

        let notifier = notifier(gateway, None, NotifierConfig::default());
        let outcome = notifier.send_welcome(1, "Test Guild").await;
        assert_eq!(outcome, DeliveryOutcome::Blocked);
    }

    #[tokio::test]
    async fn test_api_error_maps_to_failed() {
        let mut gateway = MockDmGateway::new();
        gateway.expect_send_dm().returning(|_, _, _, _| {
            Err(DeliveryError::Api(Box::new(
                poise::serenity_prelude::Error::Other("boom"),
            )))
        });

        let notifier = notifier(gateway, None, NotifierConfig::default());
        let outcome = notifier.send_welcome(1, "Test Guild").await;
        assert_eq!(outcome, DeliveryOutcome::Failed);
    }

    #[tokio::test]
    async fn test_opt_out_skips_send_and_cooldown() {
        let mut gateway = MockDmGateway::new();
        gateway.expect_send_dm().never();

        let mut profiles = MockProfileStore::new();
        profiles
            .expect_get_profile()
            .returning(|_| Ok(Some(opted_out_profile())));

        let notifier = notifier(gateway, Some(profiles), NotifierConfig::default());
        let outcome = notifier.send_welcome(1, "Test Guild").await;
        assert_eq!(outcome, DeliveryOutcome::OptedOut);
        // No cooldown slot was consumed
        assert_eq!(notifier.gate().tracked(), 0);
    }

    #[tokio::test]
    async fn test_preference_lookup_failure_allows_by_default() {
        let mut gateway = MockDmGateway::new();
        gateway.expect_send_dm().returning(|_, _, _, _| Ok(()));

        let mut profiles = MockProfileStore::new();
        profiles
            .expect_get_profile()
            .returning(|_| Err("storage offline".into()));
        profiles.expect_increment_stat().returning(|_, _, _| Ok(()));

        let notifier = notifier(gateway, Some(profiles), NotifierConfig::default());
        let outcome = notifier.send_welcome(1, "Test Guild").await;
        assert_eq!(outcome, DeliveryOutcome::Delivered);
    }

    #[tokio::test]
    async fn test_preference_lookup_failure_can_be_configured_to_fail() {
        let mut gateway = MockDmGateway::new();
        gateway.expect_send_dm().never();

        let mut profiles = MockProfileStore::new();
        profiles
            .expect_get_profile()
            .returning(|_| Err("storage offline".into()));

        let config = NotifierConfig {
            send_on_preference_error: false,
            ..Default::default()
        };
        let notifier = notifier(gateway, Some(profiles), config);
        let outcome = notifier.send_welcome(1, "Test Guild").await;
        assert_eq!(outcome, DeliveryOutcome::Failed);
    }

    #[tokio::test]
    async fn test_second_send_within_window_is_suppressed() {
        let mut gateway = MockDmGateway::new();
        gateway.expect_send_dm().times(1).returning(|_, _, _, _| Ok(()));

        let notifier = notifier(gateway, None, NotifierConfig::default());
        assert_eq!(
            notifier.send_welcome(1, "Test Guild").await,
            DeliveryOutcome::Delivered
        );
        assert_eq!(
            notifier.send_welcome(1, "Test Guild").await,
            DeliveryOutcome::Suppressed
        );
    }

    #[tokio::test]
    async fn test_cooldown_debits_even_when_delivery_fails() {
        let mut gateway = MockDmGateway::new();
        gateway
            .expect_send_dm()
            .times(1)
            .returning(|_, _, _, _| Err(DeliveryError::Forbidden));

        let notifier = notifier(gateway, None, NotifierConfig::default());
        assert_eq!(
            notifier.send_welcome(1, "Test Guild").await,
            DeliveryOutcome::Blocked
        );
        // The attempt consumed the slot; the retry is suppressed without
        // touching the gateway again.
        assert_eq!(
            notifier.send_welcome(1, "Test Guild").await,
            DeliveryOutcome::Suppressed
        );
    }

    #[tokio::test]
    async fn test_moderation_notice_with_moderator_offers_appeal() {
        let mut gateway = MockDmGateway::new();
        gateway
            .expect_send_dm()
            .withf(|_, _, rich, offer| rich.is_some() && offer.is_some())
            .returning(|_, _, _, _| Ok(()));

        let appeals = AppealStore::new();
        let notifier = DmNotifier::new(
            Arc::new(gateway),
            None,
            appeals.clone(),
            NotifierConfig::default(),
        );

        let notice =
            ModerationNotice::new(crate::notify::ModerationActionKind::Timeout, "Test Guild");
        let outcome = notifier.send_moderation_notice(42, 1, notice, Some(111)).await;
        assert_eq!(outcome, DeliveryOutcome::Delivered);
        assert_eq!(appeals.len(), 1);
    }

    #[tokio::test]
    async fn test_moderation_notice_without_moderator_has_no_offer() {
        let mut gateway = MockDmGateway::new();
        gateway
            .expect_send_dm()
            .withf(|_, _, _, offer| offer.is_none())
            .returning(|_, _, _, _| Ok(()));

        let appeals = AppealStore::new();
        let notifier = DmNotifier::new(
            Arc::new(gateway),
            None,
            appeals.clone(),
            NotifierConfig::default(),
        );

        let notice =
            ModerationNotice::new(crate::notify::ModerationActionKind::Kick, "Test Guild");
        let outcome = notifier.send_moderation_notice(42, 1, notice, None).await;
        assert_eq!(outcome, DeliveryOutcome::Delivered);
        assert!(appeals.is_empty());
    }

    #[tokio::test]
    async fn test_undelivered_moderation_notice_leaves_no_session() {
        let mut gateway = MockDmGateway::new();
        gateway
            .expect_send_dm()
            .returning(|_, _, _, _| Err(DeliveryError::Forbidden));

        let appeals = AppealStore::new();
        let notifier = DmNotifier::new(
            Arc::new(gateway),
            None,
            appeals.clone(),
            NotifierConfig::default(),
        );

        let notice =
            ModerationNotice::new(crate::notify::ModerationActionKind::Timeout, "Test Guild");
        let outcome = notifier.send_moderation_notice(42, 1, notice, Some(111)).await;
        assert_eq!(outcome, DeliveryOutcome::Blocked);
        // No dangling Offered session for a notice the user never saw
        assert!(appeals.is_empty());
    }

    #[tokio::test]
    async fn test_profile_summary_does_one_store_lookup() {
        let mut gateway = MockDmGateway::new();
        gateway.expect_send_dm().returning(|_, _, _, _| Ok(()));

        let mut profiles = MockProfileStore::new();
        // The summary content and the preference check share this call
        profiles
            .expect_get_profile()
            .times(1)
            .returning(|_| Ok(Some(UserProfile::default())));
        profiles.expect_increment_stat().returning(|_, _, _| Ok(()));

        let notifier = notifier(gateway, Some(profiles), NotifierConfig::default());
        let outcome = notifier.send_profile_summary(1).await;
        assert_eq!(outcome, DeliveryOutcome::Delivered);
    }

    #[tokio::test]
    async fn test_stat_increment_failure_does_not_change_outcome() {
        let mut gateway = MockDmGateway::new();
        gateway.expect_send_dm().returning(|_, _, _, _| Ok(()));

        let mut profiles = MockProfileStore::new();
        profiles.expect_get_profile().returning(|_| Ok(None));
        profiles
            .expect_increment_stat()
            .returning(|_, _, _| Err("stats offline".into()));

        let notifier = notifier(gateway, Some(profiles), NotifierConfig::default());
        let outcome = notifier.send_welcome(1, "Test Guild").await;
        assert_eq!(outcome, DeliveryOutcome::Delivered);
    }

    #[tokio::test]
    async fn test_profile_summary_without_store_uses_plain_fallback() {
        let mut gateway = MockDmGateway::new();
        gateway
            .expect_send_dm()
            .withf(|_, text, rich, _| text == "You don't have a profile yet." && rich.is_none())
            .returning(|_, _, _, _| Ok(()));

        let notifier = notifier(gateway, None, NotifierConfig::default());
        let outcome = notifier.send_profile_summary(1).await;
        assert_eq!(outcome, DeliveryOutcome::Delivered);
    }
}
