//! Punishment kinds and the notice sent to punished members

use chrono::{DateTime, Utc};
use poise::serenity_prelude::{self as serenity, CreateEmbed};
use std::fmt;

/// Moderation actions that count as a case against a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Punishment {
    Warn,
    Mute,
    Kick,
    Ban,
}

impl Punishment {
    /// Past tense, as used in notices and replies
    #[must_use]
    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Warn => "warned",
            Self::Mute => "muted",
            Self::Kick => "kicked",
            Self::Ban => "banned",
        }
    }

    /// Whether the punished member is pointed to the appeal server
    #[must_use]
    pub const fn allows_appeal(self) -> bool {
        matches!(self, Self::Mute | Self::Ban)
    }
}

impl fmt::Display for Punishment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warn => write!(f, "Warn"),
            Self::Mute => write!(f, "Mute"),
            Self::Kick => write!(f, "Kick"),
            Self::Ban => write!(f, "Ban"),
        }
    }
}

/// Direct message telling a member about a punishment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PunishmentNotice {
    pub punishment: Punishment,
    pub moderator: String,
    pub reason: String,
    pub case_id: Option<u64>,
    pub issued_at: DateTime<Utc>,
    pub appeal_url: Option<String>,
}

impl PunishmentNotice {
    #[must_use]
    pub fn title(&self) -> String {
        format!("❗️ You were {}", self.punishment.past_tense())
    }

    /// Embed fields in display order
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("➡️ Punishment", self.punishment.past_tense().to_string()),
            ("➡️ Moderator", self.moderator.clone()),
            ("➡️ Time", format!("<t:{}:F>", self.issued_at.timestamp())),
        ];
        if let Some(case_id) = self.case_id {
            fields.push(("➡️ Case ID", case_id.to_string()));
        }
        fields.push(("➡️ Reason", self.reason.clone()));

        if self.punishment.allows_appeal() {
            if let Some(url) = &self.appeal_url {
                fields.push(("APPEAL SERVER", url.clone()));
            }
        }
        fields
    }

    #[must_use]
    pub fn to_embed(&self) -> CreateEmbed {
        let embed = CreateEmbed::new()
            .title(self.title())
            .description(
                "You received a punishment from our server staff for breaking the rules.\n\
                 Please review the details below. 👇🏻",
            )
            .colour(serenity::Colour::RED)
            .timestamp(serenity::Timestamp::from(self.issued_at));

        self.fields()
            .into_iter()
            .fold(embed, |embed, (name, value)| embed.field(name, value, false))
    }
}
