use std::{
    default::Default,
    ops::{Deref, DerefMut},
    sync::Arc,
};

use crate::appeal::AppealStore;
use crate::notify::DmNotifier;
use dashmap::DashMap;
use poise::serenity_prelude as serenity;
use serde::{Deserialize, Serialize};
use serenity::prelude::TypeMapKey;

/// Notifier configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    // Prefix shown in command hints inside DM templates
    pub command_prefix: String,
    // Theme shown for profiles that never picked one
    pub default_theme: String,
    // Language shown for profiles that never picked one
    pub default_language: String,
    // Whether to deliver anyway when the preference lookup fails
    pub send_on_preference_error: bool,
    // Seconds between cooldown prune passes
    pub cooldown_prune_interval_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            command_prefix: "!".to_string(),
            default_theme: "dark".to_string(),
            default_language: "en".to_string(),
            send_on_preference_error: true,
            cooldown_prune_interval_secs: 300,
        }
    }
}

/// Centralized data structure for the bot
#[derive(Clone)]
pub struct Data(pub Arc<DataInner>);

// Implement TypeMapKey for Data to allow storing it in Serenity's data map
impl TypeMapKey for Data {
    type Value = Data;
}

impl Default for Data {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("config", &self.config)
            .field("warning_counts", &self.warning_counts)
            .finish_non_exhaustive()
    }
}

impl Deref for Data {
    type Target = DataInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Data {
    fn deref_mut(&mut self) -> &mut Self::Target {
        Arc::make_mut(&mut self.0)
    }
}

impl Data {
    /// Create a new Data instance
    #[must_use]
    pub fn new() -> Self {
        Self(DataInner::new().into())
    }

    /// Load data from YAML file
    pub async fn load() -> Self {
        Self(Arc::new(DataInner::load().await))
    }

    /// Save data to YAML file
    /// # Errors
    /// This function will return an error if:
    /// - The data directory cannot be created
    /// - The configuration cannot be serialized to YAML
    /// - The YAML data cannot be written to the config file
    pub async fn save(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.0.save().await
    }

    /// Attach the notifier once the Discord client exists
    pub fn set_notifier(&mut self, notifier: DmNotifier) {
        Arc::make_mut(&mut self.0).notifier = Some(notifier);
    }

    /// Number of warnings a user has received in a guild
    #[must_use]
    pub fn warning_count(&self, user_id: u64, guild_id: u64) -> u32 {
        let key = format!("{user_id}:{guild_id}");
        self.0
            .warning_counts
            .get(&key)
            .map_or(0, |entry| *entry.value())
    }

    /// Record one more warning for a user, returning the new count
    #[must_use]
    pub fn bump_warning_count(&self, user_id: u64, guild_id: u64) -> u32 {
        let key = format!("{user_id}:{guild_id}");
        let mut entry = self.0.warning_counts.entry(key).or_insert(0);
        *entry += 1;
        *entry
    }
}

/// Main centralized data structure for the bot
#[derive(Clone)]
pub struct DataInner {
    // Notifier configuration
    pub config: NotifierConfig,
    // Map of user_id:guild_id -> warning count
    pub warning_counts: DashMap<String, u32>,
    // Open appeal sessions
    pub appeals: AppealStore,
    // The DM notification service, attached after client startup
    pub notifier: Option<DmNotifier>,
}

impl Default for DataInner {
    fn default() -> Self {
        Self::new()
    }
}

impl DataInner {
    // Create a new Data instance
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: NotifierConfig::default(),
            warning_counts: DashMap::new(),
            appeals: AppealStore::new(),
            notifier: None,
        }
    }

    /// Load data from YAML file
    ///
    /// This method loads the notifier configuration from a YAML file.
    /// If the file doesn't exist, it returns defaults.
    pub async fn load() -> Self {
        const CONFIG_FILE: &str = "data/notifier_config.yaml";

        let mut data = Self::new();

        if let Ok(file_content) = tokio::fs::read_to_string(CONFIG_FILE).await {
            if let Ok(config) = serde_yaml::from_str::<NotifierConfig>(&file_content) {
                data.config = config;
            }
        }

        data
    }

    /// Save data to YAML file
    ///
    /// This method saves the notifier configuration to a YAML file.
    /// It creates the data directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The data directory cannot be created
    /// - The configuration cannot be serialized to YAML
    /// - The YAML data cannot be written to the config file
    pub async fn save(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        const DATA_DIR: &str = "data";
        const CONFIG_FILE: &str = "data/notifier_config.yaml";

        if !std::path::Path::new(DATA_DIR).exists() {
            tokio::fs::create_dir_all(DATA_DIR).await?;
        }

        let yaml = serde_yaml::to_string(&self.config)?;
        tokio::fs::write(CONFIG_FILE, yaml).await?;

        Ok(())
    }
}

/// Tests for the data module
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_new() {
        let data = Data::new();
        assert_eq!(data.warning_counts.len(), 0);
        assert!(data.appeals.is_empty());
        assert!(data.notifier.is_none());
    }

    #[test]
    fn test_notifier_config_default() {
        let config = NotifierConfig::default();
        assert_eq!(config.command_prefix, "!");
        assert_eq!(config.default_theme, "dark");
        assert_eq!(config.default_language, "en");
        assert!(config.send_on_preference_error);
        assert_eq!(config.cooldown_prune_interval_secs, 300);
    }

    #[test]
    fn test_data_debug_impl() {
        let data = Data::new();
        let debug_output = format!("{data:?}");
        assert!(debug_output.contains("Data"));
        assert!(debug_output.contains("config"));
        assert!(debug_output.contains("warning_counts"));
    }

    #[test]
    fn test_notifier_config_serialization() {
        let config = NotifierConfig {
            command_prefix: "?".to_string(),
            default_theme: "light".to_string(),
            default_language: "de".to_string(),
            send_on_preference_error: false,
            cooldown_prune_interval_secs: 60,
        };

        let serialized = serde_yaml::to_string(&config).expect("Failed to serialize");
        assert!(serialized.contains("command_prefix: '?'"));
        assert!(serialized.contains("default_theme: light"));
        assert!(serialized.contains("send_on_preference_error: false"));

        let deserialized: NotifierConfig =
            serde_yaml::from_str(&serialized).expect("Failed to deserialize");
        assert_eq!(deserialized.command_prefix, "?");
        assert_eq!(deserialized.default_language, "de");
        assert_eq!(deserialized.cooldown_prune_interval_secs, 60);
    }

    #[test]
    fn test_warning_counts_accumulate_per_guild() {
        let data = Data::new();
        assert_eq!(data.warning_count(1, 10), 0);
        assert_eq!(data.bump_warning_count(1, 10), 1);
        assert_eq!(data.bump_warning_count(1, 10), 2);
        // Other guilds and users are independent
        assert_eq!(data.bump_warning_count(1, 20), 1);
        assert_eq!(data.warning_count(2, 10), 0);
        assert_eq!(data.warning_count(1, 10), 2);
    }
}
