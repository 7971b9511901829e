//! Structured rich content for direct messages
//!
//! A `RichContent` is the platform-neutral description of an embed: title,
//! description, accent colour and an ordered field list. Values are built
//! once by the composer and never mutated afterwards.

use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;
use serenity::builder::{CreateEmbed, CreateEmbedFooter};

/// A single (name, value, inline) field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Structured, styled message body beyond plain text
#[derive(Debug, Clone, Default)]
pub struct RichContent {
    pub title: String,
    pub description: String,
    /// Accent colour as 0xRRGGBB
    pub colour: u32,
    pub fields: Vec<ContentField>,
    pub footer: Option<String>,
    pub thumbnail: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl RichContent {
    /// Start a new block with a title, description and accent colour
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>, colour: u32) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            colour,
            ..Default::default()
        }
    }

    /// Append a field, preserving insertion order
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(ContentField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    #[must_use]
    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(text.into());
        self
    }

    #[must_use]
    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }

    #[must_use]
    pub fn timestamp(mut self, when: DateTime<Utc>) -> Self {
        self.timestamp = Some(when);
        self
    }

    /// Find a field by name, mostly useful in tests
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&ContentField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Render this block as a serenity embed
    #[must_use]
    pub fn to_embed(&self) -> CreateEmbed {
        let mut embed = CreateEmbed::new()
            .title(self.title.clone())
            .description(self.description.clone())
            .colour(serenity::Colour::new(self.colour));

        for field in &self.fields {
            embed = embed.field(field.name.clone(), field.value.clone(), field.inline);
        }

        if let Some(footer) = &self.footer {
            embed = embed.footer(CreateEmbedFooter::new(footer.clone()));
        }

        if let Some(thumbnail) = &self.thumbnail {
            embed = embed.thumbnail(thumbnail.clone());
        }

        if let Some(timestamp) = self.timestamp {
            embed = embed.timestamp(serenity::Timestamp::from_unix_timestamp(timestamp.timestamp()).unwrap_or_else(|_| serenity::Timestamp::now()));
        }

        embed
    }
}
