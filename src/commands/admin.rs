use super::{invocation, owner_check, respond};
use crate::{Context, Error};
use tracing::debug;

/// Set the roles allowed to use moderation commands (owner only)
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn config(
    ctx: Context<'_>,
    #[description = "Role mentions or ids, separated by spaces"]
    #[rest]
    roles: String,
) -> Result<(), Error> {
    let invocation = invocation(ctx).await?;
    let reply = ctx.data().moderation.configure(&invocation, &roles).await?;
    respond(ctx, Some(reply)).await
}

/// Run the bot status check (owner only)
#[poise::command(
    prefix_command,
    guild_only,
    hide_in_help,
    rename = "manage-servers",
    check = "owner_check"
)]
pub async fn manage_servers(ctx: Context<'_>) -> Result<(), Error> {
    let invocation = invocation(ctx).await?;
    if !ctx.data().moderation.verify(&invocation).await? {
        debug!(user_id = %invocation.author_id, "Ignoring status check from non-owner");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_command_definition() {
        let cmd = config();
        assert_eq!(cmd.name, "config");
        assert!(cmd.description.as_deref().unwrap_or_default().contains("owner only"));
        assert!(cmd.create_as_slash_command().is_some());
    }

    #[test]
    fn test_manage_servers_is_prefix_only() {
        let cmd = manage_servers();
        assert_eq!(cmd.name, "manage-servers");
        assert!(cmd.prefix_action.is_some());
        assert!(cmd.slash_action.is_none());
        assert!(cmd.hide_in_help);
    }
}
