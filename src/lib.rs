pub mod appeal;
pub mod commands;
pub mod data;
pub mod handlers;
pub mod logging;
pub mod notify;

// Customize these constants for your bot
pub const BOT_NAME: &str = "dm_courier";
pub const COMMAND_TARGET: &str = "dm_courier::command";
pub const ERROR_TARGET: &str = "dm_courier::error";
pub const EVENT_TARGET: &str = "dm_courier::handlers";
pub const NOTIFY_TARGET: &str = "dm_courier::notify";
pub const APPEAL_TARGET: &str = "dm_courier::appeal";

pub use data::{Data, DataInner, NotifierConfig};
pub use notify::{DeliveryOutcome, DmNotifier, ModerationActionKind, NotificationEvent};
pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
