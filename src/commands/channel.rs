use super::{invocation, moderator_check, respond};
use crate::{Context, Error};

/// Delete recent messages in this channel
#[poise::command(prefix_command, slash_command, guild_only, check = "moderator_check")]
pub async fn clear(
    ctx: Context<'_>,
    #[description = "Number of messages to delete (1-100)"] amount: u16,
) -> Result<(), Error> {
    let invocation = invocation(ctx).await?;
    let reply = ctx.data().moderation.clear(&invocation, amount).await?;
    respond(ctx, reply).await
}

/// Stop @everyone from sending messages in this channel
#[poise::command(prefix_command, slash_command, guild_only, check = "moderator_check")]
pub async fn lock(ctx: Context<'_>) -> Result<(), Error> {
    let invocation = invocation(ctx).await?;
    let reply = ctx.data().moderation.lock(&invocation).await?;
    respond(ctx, reply).await
}

/// Let @everyone send messages in this channel again
#[poise::command(prefix_command, slash_command, guild_only, check = "moderator_check")]
pub async fn unlock(ctx: Context<'_>) -> Result<(), Error> {
    let invocation = invocation(ctx).await?;
    let reply = ctx.data().moderation.unlock(&invocation).await?;
    respond(ctx, reply).await
}

/// Set the slowmode delay of this channel
#[poise::command(prefix_command, slash_command, guild_only, check = "moderator_check")]
pub async fn slowmode(
    ctx: Context<'_>,
    #[description = "Delay between messages in seconds (0-21600)"] seconds: u16,
) -> Result<(), Error> {
    let invocation = invocation(ctx).await?;
    let reply = ctx.data().moderation.slowmode(&invocation, seconds).await?;
    respond(ctx, reply).await
}

/// Post an announcement as the bot
#[poise::command(prefix_command, slash_command, guild_only, check = "moderator_check")]
pub async fn announce(
    ctx: Context<'_>,
    #[description = "Announcement text"]
    #[rest]
    message: String,
) -> Result<(), Error> {
    let invocation = invocation(ctx).await?;
    let reply = ctx.data().moderation.announce(&invocation, &message).await?;
    respond(ctx, reply).await
}

/// Start a thumbs up/down poll
#[poise::command(prefix_command, slash_command, guild_only, check = "moderator_check")]
pub async fn poll(
    ctx: Context<'_>,
    #[description = "Poll question"]
    #[rest]
    question: String,
) -> Result<(), Error> {
    let invocation = invocation(ctx).await?;
    let reply = ctx.data().moderation.poll(&invocation, &question).await?;
    respond(ctx, reply).await
}
