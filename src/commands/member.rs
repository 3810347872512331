use super::{invocation, moderator_check, respond};
use crate::{Context, Error};
use poise::serenity_prelude as serenity;

/// Change a member's nickname
#[poise::command(prefix_command, slash_command, guild_only, check = "moderator_check")]
pub async fn nick(
    ctx: Context<'_>,
    #[description = "Member to rename"] member: serenity::Member,
    #[description = "New nickname (1-32 characters)"]
    #[rest]
    nickname: String,
) -> Result<(), Error> {
    let invocation = invocation(ctx).await?;
    let reply = ctx
        .data()
        .moderation
        .nick(&invocation, member.user.id, &nickname)
        .await?;
    respond(ctx, reply).await
}

/// Give a member a role
#[poise::command(prefix_command, slash_command, guild_only, check = "moderator_check")]
pub async fn role_add(
    ctx: Context<'_>,
    #[description = "Member to give the role to"] member: serenity::Member,
    #[description = "Role to add"] role: serenity::Role,
) -> Result<(), Error> {
    let invocation = invocation(ctx).await?;
    let reply = ctx
        .data()
        .moderation
        .add_role(&invocation, member.user.id, role.id)
        .await?;
    respond(ctx, reply).await
}

/// Take a role away from a member
#[poise::command(prefix_command, slash_command, guild_only, check = "moderator_check")]
pub async fn role_remove(
    ctx: Context<'_>,
    #[description = "Member to take the role from"] member: serenity::Member,
    #[description = "Role to remove"] role: serenity::Role,
) -> Result<(), Error> {
    let invocation = invocation(ctx).await?;
    let reply = ctx
        .data()
        .moderation
        .remove_role(&invocation, member.user.id, role.id)
        .await?;
    respond(ctx, reply).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_commands_take_member_and_role() {
        for cmd in [role_add(), role_remove()] {
            let names: Vec<&str> = cmd.parameters.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(names, ["member", "role"]);
        }
    }
}
