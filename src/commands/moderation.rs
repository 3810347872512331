use super::{invocation, moderator_check, respond};
use crate::{Context, Error};
use poise::serenity_prelude as serenity;

/// Warn a member
#[poise::command(prefix_command, slash_command, guild_only, check = "moderator_check")]
pub async fn warn(
    ctx: Context<'_>,
    #[description = "Member to warn"] member: serenity::Member,
    #[description = "Reason for the warning"]
    #[rest]
    reason: String,
) -> Result<(), Error> {
    let invocation = invocation(ctx).await?;
    let reply = ctx
        .data()
        .moderation
        .warn(&invocation, member.user.id, &reason)
        .await?;
    respond(ctx, reply).await
}

/// Time out a member for a number of minutes
#[poise::command(prefix_command, slash_command, guild_only, check = "moderator_check")]
pub async fn mute(
    ctx: Context<'_>,
    #[description = "Member to mute"] member: serenity::Member,
    #[description = "Duration in minutes (1-40320)"] minutes: u32,
    #[description = "Reason for the mute"]
    #[rest]
    reason: Option<String>,
) -> Result<(), Error> {
    let invocation = invocation(ctx).await?;
    let reply = ctx
        .data()
        .moderation
        .mute(&invocation, member.user.id, minutes, reason.as_deref())
        .await?;
    respond(ctx, reply).await
}

/// Lift a member's timeout
#[poise::command(prefix_command, slash_command, guild_only, check = "moderator_check")]
pub async fn unmute(
    ctx: Context<'_>,
    #[description = "Member to unmute"] member: serenity::Member,
) -> Result<(), Error> {
    let invocation = invocation(ctx).await?;
    let reply = ctx
        .data()
        .moderation
        .unmute(&invocation, member.user.id)
        .await?;
    respond(ctx, reply).await
}

/// Ban a member from the server
#[poise::command(prefix_command, slash_command, guild_only, check = "moderator_check")]
pub async fn ban(
    ctx: Context<'_>,
    #[description = "Member to ban"] member: serenity::Member,
    #[description = "Reason for the ban"]
    #[rest]
    reason: String,
) -> Result<(), Error> {
    let invocation = invocation(ctx).await?;
    let reply = ctx
        .data()
        .moderation
        .ban(&invocation, member.user.id, &reason)
        .await?;
    respond(ctx, reply).await
}

/// Unban a user by id
#[poise::command(prefix_command, slash_command, guild_only, check = "moderator_check")]
pub async fn unban(
    ctx: Context<'_>,
    #[description = "Id of the user to unban"] user_id: String,
) -> Result<(), Error> {
    let invocation = invocation(ctx).await?;
    let reply = ctx.data().moderation.unban(&invocation, &user_id).await?;
    respond(ctx, reply).await
}

/// Kick a member from the server
#[poise::command(prefix_command, slash_command, guild_only, check = "moderator_check")]
pub async fn kick(
    ctx: Context<'_>,
    #[description = "Member to kick"] member: serenity::Member,
    #[description = "Reason for the kick"]
    #[rest]
    reason: String,
) -> Result<(), Error> {
    let invocation = invocation(ctx).await?;
    let reply = ctx
        .data()
        .moderation
        .kick(&invocation, member.user.id, &reason)
        .await?;
    respond(ctx, reply).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punishment_commands_take_member_first() {
        for cmd in [warn(), mute(), unmute(), ban(), kick()] {
            assert_eq!(cmd.parameters[0].name, "member", "{}", cmd.name);
            assert!(cmd.parameters[0].required);
            assert!(cmd.create_as_slash_command().is_some());
        }
    }

    #[test]
    fn test_mute_reason_is_optional() {
        let cmd = mute();
        assert_eq!(cmd.parameters.len(), 3);
        assert!(cmd.parameters[1].required);
        assert!(!cmd.parameters[2].required);
        assert!(
            cmd.description
                .as_deref()
                .unwrap_or_default()
                .contains("number of minutes")
        );
    }

    #[test]
    fn test_unban_takes_raw_user_id() {
        let cmd = unban();
        assert_eq!(cmd.parameters.len(), 1);
        assert_eq!(cmd.parameters[0].name, "user_id");
    }
}
