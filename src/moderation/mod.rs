//! Moderation commands, independent of the poise front end
//!
//! The [`ModerationService`] holds one operation per bot command. Each takes an
//! [`Invocation`] describing who called it and where, checks the [`Gate`], and
//! performs its Discord side effects through a [`ModerationGateway`].

mod error;
mod gate;
mod gateway;
mod punishment;
mod service;

pub use error::{ModerationError, ModerationResult};
pub use gate::Gate;
pub use gateway::{GatewayResult, ModerationGateway, SerenityGateway, toggle_send_messages};
pub use punishment::{Punishment, PunishmentNotice};
pub use service::{ModerationService, NoticeOptions};

#[cfg(test)]
pub use gateway::MockModerationGateway;

use poise::serenity_prelude::{ChannelId, GuildId, RoleId, UserId};

/// Caller and location of one command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub author_id: UserId,
    pub author_name: String,
    pub author_roles: Vec<RoleId>,
}

/// Text to send back to the invoker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    pub ephemeral: bool,
}

impl Reply {
    pub fn public(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
        }
    }
}

/// Parse a list of role mentions (`<@&123>`) and raw role ids, separated by
/// whitespace or commas.
///
/// # Errors
///
/// Returns `InvalidArgument` naming the first token that is neither.
pub fn parse_role_list(input: &str) -> ModerationResult<Vec<RoleId>> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            let raw = token
                .strip_prefix("<@&")
                .and_then(|rest| rest.strip_suffix('>'))
                .unwrap_or(token);
            raw.parse::<u64>()
                .ok()
                .filter(|id| *id != 0)
                .map(RoleId::new)
                .ok_or_else(|| {
                    ModerationError::invalid(format!("`{token}` is not a role mention or role id"))
                })
        })
        .collect()
}
