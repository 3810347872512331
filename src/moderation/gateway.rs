//! Discord side effects of moderation commands
//!
//! Every call the moderation service makes against Discord goes through the
//! [`ModerationGateway`] trait, so the command logic can run against a mock.

use super::punishment::PunishmentNotice;
use chrono::{DateTime, Utc};
use poise::serenity_prelude::{
    self as serenity, ChannelId, CreateMessage, EditChannel, EditMember, EditMessage,
    GetMessages, GuildId, Http, MessageId, PermissionOverwrite, PermissionOverwriteType,
    Permissions, ReactionType, RoleId, UserId,
};
use std::sync::Arc;
use tracing::info;

pub type GatewayResult<T> = Result<T, serenity::Error>;

/// Oldest message Discord's bulk delete endpoint accepts
const BULK_DELETE_MAX_AGE_DAYS: i64 = 14;

/// Platform calls used by moderation commands
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ModerationGateway: Send + Sync {
    /// Time out a member until `until`
    async fn timeout_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        until: DateTime<Utc>,
    ) -> GatewayResult<()>;

    /// Lift a member's timeout
    async fn remove_timeout(&self, guild_id: GuildId, user_id: UserId) -> GatewayResult<()>;

    async fn ban_member(&self, guild_id: GuildId, user_id: UserId, reason: &str)
    -> GatewayResult<()>;

    async fn unban_user(&self, guild_id: GuildId, user_id: UserId) -> GatewayResult<()>;

    async fn kick_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        reason: &str,
    ) -> GatewayResult<()>;

    /// DM a punishment notice to a user
    async fn notify_user(&self, user_id: UserId, notice: &PunishmentNotice) -> GatewayResult<()>;

    /// Delete up to `amount` of the latest messages, returning how many went
    async fn purge_messages(&self, channel_id: ChannelId, amount: u8) -> GatewayResult<usize>;

    /// Allow or deny `SEND_MESSAGES` for @everyone in a channel
    async fn set_send_messages(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        allowed: bool,
    ) -> GatewayResult<()>;

    async fn set_slowmode(&self, channel_id: ChannelId, seconds: u16) -> GatewayResult<()>;

    async fn set_nickname(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        nickname: &str,
    ) -> GatewayResult<()>;

    async fn add_role(&self, guild_id: GuildId, user_id: UserId, role_id: RoleId)
    -> GatewayResult<()>;

    async fn remove_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> GatewayResult<()>;

    /// Post a plain message, returning its id
    async fn send_text(&self, channel_id: ChannelId, content: &str) -> GatewayResult<MessageId>;

    async fn edit_text(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        content: &str,
    ) -> GatewayResult<()>;

    async fn add_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &str,
    ) -> GatewayResult<()>;
}

/// [`ModerationGateway`] backed by serenity's HTTP client
#[derive(Clone)]
pub struct SerenityGateway {
    http: Arc<Http>,
}

impl SerenityGateway {
    #[must_use]
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    fn http(&self) -> &Http {
        &self.http
    }
}

impl std::fmt::Debug for SerenityGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerenityGateway").finish_non_exhaustive()
    }
}

/// Flip `SEND_MESSAGES` on an overwrite, keeping every other bit
#[must_use]
pub fn toggle_send_messages(
    allow: Permissions,
    deny: Permissions,
    allowed: bool,
) -> (Permissions, Permissions) {
    let (mut allow, mut deny) = (allow, deny);
    if allowed {
        allow.insert(Permissions::SEND_MESSAGES);
        deny.remove(Permissions::SEND_MESSAGES);
    } else {
        allow.remove(Permissions::SEND_MESSAGES);
        deny.insert(Permissions::SEND_MESSAGES);
    }
    (allow, deny)
}

/// Split messages into those bulk delete accepts (younger than 14 days, with a
/// minute of slack) and older ones that must be deleted one by one.
#[must_use]
fn split_bulk_deletable(
    ids: Vec<MessageId>,
    now: DateTime<Utc>,
) -> (Vec<MessageId>, Vec<MessageId>) {
    let oldest = now - chrono::Duration::days(BULK_DELETE_MAX_AGE_DAYS);
    let cutoff = (oldest + chrono::Duration::minutes(1)).timestamp();
    ids.into_iter()
        .partition(|id| id.created_at().unix_timestamp() > cutoff)
}

#[async_trait::async_trait]
impl ModerationGateway for SerenityGateway {
    async fn timeout_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        until: DateTime<Utc>,
    ) -> GatewayResult<()> {
        guild_id
            .edit_member(
                self.http(),
                user_id,
                EditMember::new().disable_communication_until_datetime(until.into()),
            )
            .await?;
        info!("Timed out user {user_id} in guild {guild_id} until {until}");
        Ok(())
    }

    async fn remove_timeout(&self, guild_id: GuildId, user_id: UserId) -> GatewayResult<()> {
        guild_id
            .edit_member(self.http(), user_id, EditMember::new().enable_communication())
            .await?;
        info!("Removed timeout of user {user_id} in guild {guild_id}");
        Ok(())
    }

    async fn ban_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        reason: &str,
    ) -> GatewayResult<()> {
        guild_id
            .ban_with_reason(self.http(), user_id, 0, reason)
            .await?;
        info!("Banned user {user_id} from guild {guild_id}");
        Ok(())
    }

    async fn unban_user(&self, guild_id: GuildId, user_id: UserId) -> GatewayResult<()> {
        guild_id.unban(self.http(), user_id).await?;
        info!("Unbanned user {user_id} in guild {guild_id}");
        Ok(())
    }

    async fn kick_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        reason: &str,
    ) -> GatewayResult<()> {
        guild_id
            .kick_with_reason(self.http(), user_id, reason)
            .await?;
        info!("Kicked user {user_id} from guild {guild_id}");
        Ok(())
    }

    async fn notify_user(&self, user_id: UserId, notice: &PunishmentNotice) -> GatewayResult<()> {
        let dm_channel = user_id.create_dm_channel(self.http()).await?;
        dm_channel
            .send_message(self.http(), CreateMessage::new().embed(notice.to_embed()))
            .await?;
        Ok(())
    }

    async fn purge_messages(&self, channel_id: ChannelId, amount: u8) -> GatewayResult<usize> {
        let messages = channel_id
            .messages(self.http(), GetMessages::new().limit(amount))
            .await?;
        let ids: Vec<MessageId> = messages.into_iter().map(|message| message.id).collect();
        let (recent, old) = split_bulk_deletable(ids, Utc::now());

        match recent.as_slice() {
            [] => {}
            [single] => channel_id.delete_message(self.http(), *single).await?,
            _ => channel_id.delete_messages(self.http(), &recent).await?,
        }
        for id in &old {
            channel_id.delete_message(self.http(), *id).await?;
        }
        Ok(recent.len() + old.len())
    }

    async fn set_send_messages(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        allowed: bool,
    ) -> GatewayResult<()> {
        // The @everyone role shares the guild's id
        let everyone = RoleId::new(guild_id.get());
        let current = channel_id
            .to_channel(self.http())
            .await?
            .guild()
            .and_then(|channel| {
                channel.permission_overwrites.into_iter().find(|overwrite| {
                    matches!(overwrite.kind, PermissionOverwriteType::Role(id) if id == everyone)
                })
            });

        let (allow, deny) = current.map_or_else(
            || (Permissions::empty(), Permissions::empty()),
            |overwrite| (overwrite.allow, overwrite.deny),
        );
        let (allow, deny) = toggle_send_messages(allow, deny, allowed);

        channel_id
            .create_permission(
                self.http(),
                PermissionOverwrite {
                    allow,
                    deny,
                    kind: PermissionOverwriteType::Role(everyone),
                },
            )
            .await
    }

    async fn set_slowmode(&self, channel_id: ChannelId, seconds: u16) -> GatewayResult<()> {
        channel_id
            .edit(self.http(), EditChannel::new().rate_limit_per_user(seconds))
            .await?;
        Ok(())
    }

    async fn set_nickname(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        nickname: &str,
    ) -> GatewayResult<()> {
        guild_id
            .edit_member(self.http(), user_id, EditMember::new().nickname(nickname))
            .await?;
        Ok(())
    }

    async fn add_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> GatewayResult<()> {
        self.http()
            .add_member_role(guild_id, user_id, role_id, None)
            .await
    }

    async fn remove_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> GatewayResult<()> {
        self.http()
            .remove_member_role(guild_id, user_id, role_id, None)
            .await
    }

    async fn send_text(&self, channel_id: ChannelId, content: &str) -> GatewayResult<MessageId> {
        let message = channel_id.say(self.http(), content).await?;
        Ok(message.id)
    }

    async fn edit_text(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        content: &str,
    ) -> GatewayResult<()> {
        channel_id
            .edit_message(self.http(), message_id, EditMessage::new().content(content))
            .await?;
        Ok(())
    }

    async fn add_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &str,
    ) -> GatewayResult<()> {
        channel_id
            .create_reaction(
                self.http(),
                message_id,
                ReactionType::Unicode(emoji.to_string()),
            )
            .await
    }
}
