//! Poise front end: argument parsing and replies around [`ModerationService`]
//!
//! [`ModerationService`]: crate::moderation::ModerationService

mod admin;
mod channel;
mod member;
mod moderation;

pub use admin::{config, manage_servers};
pub use channel::{announce, clear, lock, poll, slowmode, unlock};
pub use member::{nick, role_add, role_remove};
pub use moderation::{ban, kick, mute, unban, unmute, warn};

use crate::moderation::{Gate, Invocation, Reply};
use crate::{Context, Data, ERROR_TARGET, Error, logging};
use poise::serenity_prelude::{GuildId, RoleId, UserId};
use poise::{CreateReply, FrameworkError};
use tracing::error;

/// Every command the bot registers
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        config(),
        warn(),
        mute(),
        unmute(),
        ban(),
        unban(),
        kick(),
        clear(),
        lock(),
        unlock(),
        slowmode(),
        nick(),
        role_add(),
        role_remove(),
        announce(),
        poll(),
        manage_servers(),
    ]
}

/// Who invoked the command, and where
async fn invocation(ctx: Context<'_>) -> Result<Invocation, Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or("This command can only be used in a server")?;
    let author_roles = ctx
        .author_member()
        .await
        .map(|member| member.roles.clone())
        .unwrap_or_default();

    Ok(Invocation {
        guild_id,
        channel_id: ctx.channel_id(),
        author_id: ctx.author().id,
        author_name: ctx.author().name.clone(),
        author_roles,
    })
}

/// Command check admitting the owner and members with a moderator role.
///
/// Checks run before argument parsing, so a denied caller gets no reply even
/// when the arguments are malformed.
async fn moderator_check(ctx: Context<'_>) -> Result<bool, Error> {
    let roles = ctx
        .author_member()
        .await
        .map(|member| member.roles.clone())
        .unwrap_or_default();
    let gate = ctx.data().moderation.gate();
    Ok(may_moderate(gate, ctx.guild_id(), ctx.author().id, &roles).await)
}

/// Command check admitting only the owner
async fn owner_check(ctx: Context<'_>) -> Result<bool, Error> {
    Ok(ctx.data().moderation.gate().is_owner(ctx.author().id))
}

async fn may_moderate(
    gate: &Gate,
    guild_id: Option<GuildId>,
    user_id: UserId,
    roles: &[RoleId],
) -> bool {
    match guild_id {
        Some(guild_id) => gate.may_moderate(guild_id, user_id, roles).await,
        None => false,
    }
}

/// Send `reply`, if there is one. Denied invocations get none.
async fn respond(ctx: Context<'_>, reply: Option<Reply>) -> Result<(), Error> {
    if let Some(reply) = reply {
        ctx.send(
            CreateReply::default()
                .content(reply.content)
                .ephemeral(reply.ephemeral),
        )
        .await?;
    }
    Ok(())
}

/// Framework error hook
pub async fn on_error(error: FrameworkError<'_, Data, Error>) {
    logging::log_command_error(&error);

    match error {
        FrameworkError::Command { error, ctx, .. } => {
            let reply = CreateReply::default()
                .content(format!("Command failed: {error}"))
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                error!(target: ERROR_TARGET, "Could not report command failure: {e}");
            }
        }
        // Unauthorized callers get no answer
        FrameworkError::CommandCheckFailed { .. } => {}
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!(target: ERROR_TARGET, "Error while handling error: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ConfigStore;
    use crate::test_utils::{GUILD, MOD_ROLE, MODERATOR, OWNER, TempDir};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn gate(dir: &TempDir) -> Gate {
        Gate::new(
            Some(UserId::new(OWNER)),
            Arc::new(ConfigStore::new(dir.path().join("config.json"))),
        )
    }

    #[tokio::test]
    async fn test_check_denies_unconfigured_guild() {
        let dir = TempDir::new();
        let gate = gate(&dir);
        let guild = Some(GuildId::new(GUILD));
        let roles = [RoleId::new(MOD_ROLE)];

        assert!(!may_moderate(&gate, guild, UserId::new(MODERATOR), &roles).await);
        assert!(may_moderate(&gate, guild, UserId::new(OWNER), &[]).await);
    }

    #[tokio::test]
    async fn test_check_admits_configured_role_in_guild_only() {
        let dir = TempDir::new();
        let gate = gate(&dir);
        let roles = [RoleId::new(MOD_ROLE)];
        gate.roles()
            .set_allowed_roles(GuildId::new(GUILD), roles)
            .await
            .unwrap();

        let guild = Some(GuildId::new(GUILD));
        assert!(may_moderate(&gate, guild, UserId::new(MODERATOR), &roles).await);
        assert!(!may_moderate(&gate, None, UserId::new(MODERATOR), &roles).await);
    }

    #[test]
    fn test_gated_commands_declare_a_check() {
        for cmd in all() {
            // config answers non-owners itself
            let expected = usize::from(cmd.name != "config");
            assert_eq!(cmd.checks.len(), expected, "{}", cmd.name);
        }
    }

    #[test]
    fn test_all_commands_registered_once() {
        let commands = all();
        let names: HashSet<&str> = commands.iter().map(|cmd| cmd.name.as_str()).collect();
        assert_eq!(names.len(), commands.len());
        assert_eq!(commands.len(), 17);
        for name in ["config", "warn", "role_add", "poll", "manage-servers"] {
            assert!(names.contains(name), "missing command {name}");
        }
    }

    #[test]
    fn test_commands_are_guild_only_with_descriptions() {
        for cmd in all() {
            assert!(cmd.guild_only, "{} should be guild only", cmd.name);
            assert!(cmd.description.is_some(), "{} has no description", cmd.name);
            assert!(cmd.prefix_action.is_some(), "{} has no prefix form", cmd.name);
        }
    }
}
