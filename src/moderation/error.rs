//! Error types for moderation commands

use crate::store::StoreError;
use thiserror::Error;

/// Errors that fail a single moderation command
#[derive(Debug, Error)]
pub enum ModerationError {
    /// Persisting the role configuration or a case counter failed
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Discord rejected or failed the request
    #[error("Discord API error: {0}")]
    DiscordApi(#[from] Box<poise::serenity_prelude::Error>),

    /// A command argument is out of range or malformed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<poise::serenity_prelude::Error> for ModerationError {
    fn from(error: poise::serenity_prelude::Error) -> Self {
        Self::DiscordApi(Box::new(error))
    }
}

impl ModerationError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Result type for moderation operations
pub type ModerationResult<T> = Result<T, ModerationError>;
