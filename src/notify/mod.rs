//! DM notification system for dm-courier
//!
//! This module builds formatted direct messages for moderation events
//! (welcome, warning, moderation action, profile summary), rate-limits them
//! per recipient, and delivers them through a gateway trait with a value
//! result for every outcome.

mod compose;
mod content;
mod cooldown;
mod event;
mod gateway;
mod outcome;
mod profile;
mod service;

pub use compose::compose;
pub use content::{ContentField, RichContent};
pub use cooldown::CooldownGate;
pub use event::{
    ActionAttributes, ModerationActionKind, ModerationNotice, NotificationEvent, WarningKind,
    format_duration,
};
pub use gateway::{DeliveryError, DmGateway, ProfileStore, SerenityGateway};
pub use outcome::DeliveryOutcome;
pub use profile::{Badge, Preferences, ProfileStats, UserProfile};
pub use service::DmNotifier;

#[cfg(test)]
pub use gateway::{MockDmGateway, MockProfileStore};
