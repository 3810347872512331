//! Moderation command logic

use super::{
    Gate, Invocation, ModerationError, ModerationGateway, ModerationResult, Punishment,
    PunishmentNotice, Reply, parse_role_list,
};
use crate::COMMAND_TARGET;
use crate::store::CaseCounter;
use chrono::Utc;
use poise::serenity_prelude::{Mentionable, RoleId, UserId};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Longest timeout Discord accepts (28 days)
pub const MAX_TIMEOUT_MINUTES: u32 = 40_320;
/// Most messages removed by one `clear`
pub const MAX_PURGE: u8 = 100;
pub const MAX_SLOWMODE_SECONDS: u16 = 21_600;
pub const MAX_NICKNAME_CHARS: usize = 32;
pub const MAX_MESSAGE_CHARS: usize = 2_000;

const DEFAULT_REASON: &str = "No reason provided";
const POLL_REACTIONS: [&str; 2] = ["👍", "👎"];

const VERIFY_PENDING: &str = "Verifying bot...";
const VERIFY_WORKING: &str = "Bot is now working (estimated: 10)";
const VERIFY_DONE: &str = "This bot is now verified as an Airplane Instance.";
const VERIFY_FIRST_STAGE: Duration = Duration::from_secs(10);
const VERIFY_SECOND_STAGE: Duration = Duration::from_secs(1);

/// How punished members are told about it
#[derive(Debug, Clone, Default)]
pub struct NoticeOptions {
    /// DM the member before the action takes effect
    pub notify_targets: bool,
    /// Shown to muted and banned members
    pub appeal_url: Option<String>,
}

/// One operation per moderation command
pub struct ModerationService<G> {
    gate: Gate,
    cases: Option<CaseCounter>,
    notices: NoticeOptions,
    gateway: G,
}

impl<G> std::fmt::Debug for ModerationService<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModerationService")
            .field("gate", &self.gate)
            .field("cases", &self.cases)
            .field("notices", &self.notices)
            .finish_non_exhaustive()
    }
}

impl<G: ModerationGateway> ModerationService<G> {
    /// `cases` is `None` when case numbering is turned off.
    pub fn new(gate: Gate, cases: Option<CaseCounter>, notices: NoticeOptions, gateway: G) -> Self {
        Self {
            gate,
            cases,
            notices,
            gateway,
        }
    }

    #[must_use]
    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    async fn permitted(&self, invocation: &Invocation) -> bool {
        let permitted = self
            .gate
            .may_moderate(
                invocation.guild_id,
                invocation.author_id,
                &invocation.author_roles,
            )
            .await;
        if !permitted {
            debug!(
                guild_id = %invocation.guild_id,
                user_id = %invocation.author_id,
                "Ignoring command from user without a moderator role"
            );
        }
        permitted
    }

    /// Allocate a case id (if enabled) and notify the target (if enabled).
    async fn record_punishment(
        &self,
        invocation: &Invocation,
        target: UserId,
        punishment: Punishment,
        reason: &str,
    ) -> ModerationResult<Option<u64>> {
        let case_id = match &self.cases {
            Some(cases) => Some(cases.next_case_id(invocation.guild_id, target).await?),
            None => None,
        };

        info!(
            target: COMMAND_TARGET,
            guild_id = %invocation.guild_id,
            moderator_id = %invocation.author_id,
            target_id = %target,
            punishment = %punishment,
            case_id = ?case_id,
            event = "punishment",
            "Punishment issued"
        );

        if self.notices.notify_targets {
            let notice = PunishmentNotice {
                punishment,
                moderator: invocation.author_name.clone(),
                reason: reason.to_string(),
                case_id,
                issued_at: Utc::now(),
                appeal_url: self.notices.appeal_url.clone(),
            };
            if let Err(e) = self.gateway.notify_user(target, &notice).await {
                warn!("Could not notify user {target} about being {}: {e}", punishment.past_tense());
            }
        }

        Ok(case_id)
    }

    /// Replace the guild's moderator roles. Owner only.
    ///
    /// # Errors
    ///
    /// Fails on an unparsable role list or when the configuration can't be saved.
    pub async fn configure(&self, invocation: &Invocation, roles: &str) -> ModerationResult<Reply> {
        if !self.gate.is_owner(invocation.author_id) {
            warn!(
                guild_id = %invocation.guild_id,
                user_id = %invocation.author_id,
                "Rejected configuration change from non-owner"
            );
            return Ok(Reply::ephemeral("Access denied."));
        }

        let roles = parse_role_list(roles)?;
        self.gate
            .roles()
            .set_allowed_roles(invocation.guild_id, roles)
            .await?;
        Ok(Reply::ephemeral("Moderation roles configured."))
    }

    /// # Errors
    ///
    /// Fails when the case counter can't be saved.
    pub async fn warn(
        &self,
        invocation: &Invocation,
        target: UserId,
        reason: &str,
    ) -> ModerationResult<Option<Reply>> {
        if !self.permitted(invocation).await {
            return Ok(None);
        }
        self.record_punishment(invocation, target, Punishment::Warn, reason)
            .await?;
        Ok(Some(Reply::public(format!("{} warned.", target.mention()))))
    }

    /// # Errors
    ///
    /// Fails on an out-of-range duration, a Discord error or a storage error.
    pub async fn mute(
        &self,
        invocation: &Invocation,
        target: UserId,
        minutes: u32,
        reason: Option<&str>,
    ) -> ModerationResult<Option<Reply>> {
        if !self.permitted(invocation).await {
            return Ok(None);
        }
        if !(1..=MAX_TIMEOUT_MINUTES).contains(&minutes) {
            return Err(ModerationError::invalid(format!(
                "minutes must be between 1 and {MAX_TIMEOUT_MINUTES}"
            )));
        }

        let until = Utc::now() + chrono::Duration::minutes(i64::from(minutes));
        self.gateway
            .timeout_member(invocation.guild_id, target, until)
            .await?;
        self.record_punishment(
            invocation,
            target,
            Punishment::Mute,
            reason.unwrap_or(DEFAULT_REASON),
        )
        .await?;
        Ok(Some(Reply::public(format!("{} muted.", target.mention()))))
    }

    /// # Errors
    ///
    /// Fails when Discord rejects the request.
    pub async fn unmute(
        &self,
        invocation: &Invocation,
        target: UserId,
    ) -> ModerationResult<Option<Reply>> {
        if !self.permitted(invocation).await {
            return Ok(None);
        }
        self.gateway
            .remove_timeout(invocation.guild_id, target)
            .await?;
        Ok(Some(Reply::public(format!("{} unmuted.", target.mention()))))
    }

    /// The notice goes out before the ban, while the member can still be reached.
    ///
    /// # Errors
    ///
    /// Fails on a Discord error or a storage error.
    pub async fn ban(
        &self,
        invocation: &Invocation,
        target: UserId,
        reason: &str,
    ) -> ModerationResult<Option<Reply>> {
        if !self.permitted(invocation).await {
            return Ok(None);
        }
        self.record_punishment(invocation, target, Punishment::Ban, reason)
            .await?;
        self.gateway
            .ban_member(invocation.guild_id, target, reason)
            .await?;
        Ok(Some(Reply::public(format!("{} banned.", target.mention()))))
    }

    /// # Errors
    ///
    /// Fails if `user_id` is not a user id or Discord rejects the unban.
    pub async fn unban(
        &self,
        invocation: &Invocation,
        user_id: &str,
    ) -> ModerationResult<Option<Reply>> {
        if !self.permitted(invocation).await {
            return Ok(None);
        }
        let user = user_id
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|id| *id != 0)
            .map(UserId::new)
            .ok_or_else(|| ModerationError::invalid(format!("`{user_id}` is not a user id")))?;

        self.gateway.unban_user(invocation.guild_id, user).await?;
        Ok(Some(Reply::public(format!("{} unbanned.", user.mention()))))
    }

    /// # Errors
    ///
    /// Fails on a Discord error or a storage error.
    pub async fn kick(
        &self,
        invocation: &Invocation,
        target: UserId,
        reason: &str,
    ) -> ModerationResult<Option<Reply>> {
        if !self.permitted(invocation).await {
            return Ok(None);
        }
        self.record_punishment(invocation, target, Punishment::Kick, reason)
            .await?;
        self.gateway
            .kick_member(invocation.guild_id, target, reason)
            .await?;
        Ok(Some(Reply::public(format!("{} kicked.", target.mention()))))
    }

    /// Delete the latest `amount` messages of the invoking channel
    ///
    /// # Errors
    ///
    /// Fails on an out-of-range amount or a Discord error.
    pub async fn clear(
        &self,
        invocation: &Invocation,
        amount: u16,
    ) -> ModerationResult<Option<Reply>> {
        if !self.permitted(invocation).await {
            return Ok(None);
        }
        let amount = u8::try_from(amount)
            .ok()
            .filter(|n| (1..=MAX_PURGE).contains(n))
            .ok_or_else(|| {
                ModerationError::invalid(format!("amount must be between 1 and {MAX_PURGE}"))
            })?;

        let deleted = self
            .gateway
            .purge_messages(invocation.channel_id, amount)
            .await?;
        info!(
            target: COMMAND_TARGET,
            channel_id = %invocation.channel_id,
            deleted,
            event = "purge",
            "Messages deleted"
        );
        Ok(Some(Reply::ephemeral(format!("Deleted {deleted} message(s)."))))
    }

    /// # Errors
    ///
    /// Fails when Discord rejects the permission change.
    pub async fn lock(&self, invocation: &Invocation) -> ModerationResult<Option<Reply>> {
        self.set_locked(invocation, true).await
    }

    /// # Errors
    ///
    /// Fails when Discord rejects the permission change.
    pub async fn unlock(&self, invocation: &Invocation) -> ModerationResult<Option<Reply>> {
        self.set_locked(invocation, false).await
    }

    async fn set_locked(
        &self,
        invocation: &Invocation,
        locked: bool,
    ) -> ModerationResult<Option<Reply>> {
        if !self.permitted(invocation).await {
            return Ok(None);
        }
        self.gateway
            .set_send_messages(invocation.guild_id, invocation.channel_id, !locked)
            .await?;
        let reply = if locked {
            "Channel locked."
        } else {
            "Channel unlocked."
        };
        Ok(Some(Reply::public(reply)))
    }

    /// # Errors
    ///
    /// Fails on an out-of-range delay or a Discord error.
    pub async fn slowmode(
        &self,
        invocation: &Invocation,
        seconds: u16,
    ) -> ModerationResult<Option<Reply>> {
        if !self.permitted(invocation).await {
            return Ok(None);
        }
        if seconds > MAX_SLOWMODE_SECONDS {
            return Err(ModerationError::invalid(format!(
                "seconds must be between 0 and {MAX_SLOWMODE_SECONDS}"
            )));
        }
        self.gateway
            .set_slowmode(invocation.channel_id, seconds)
            .await?;
        Ok(Some(Reply::public("Slowmode updated.")))
    }

    /// # Errors
    ///
    /// Fails on an empty or too long nickname or a Discord error.
    pub async fn nick(
        &self,
        invocation: &Invocation,
        target: UserId,
        nickname: &str,
    ) -> ModerationResult<Option<Reply>> {
        if !self.permitted(invocation).await {
            return Ok(None);
        }
        let length = nickname.chars().count();
        if length == 0 || length > MAX_NICKNAME_CHARS {
            return Err(ModerationError::invalid(format!(
                "nickname must be between 1 and {MAX_NICKNAME_CHARS} characters"
            )));
        }
        self.gateway
            .set_nickname(invocation.guild_id, target, nickname)
            .await?;
        Ok(Some(Reply::public("Nickname changed.")))
    }

    /// # Errors
    ///
    /// Fails when Discord rejects the role change.
    pub async fn add_role(
        &self,
        invocation: &Invocation,
        target: UserId,
        role: RoleId,
    ) -> ModerationResult<Option<Reply>> {
        if !self.permitted(invocation).await {
            return Ok(None);
        }
        self.gateway
            .add_role(invocation.guild_id, target, role)
            .await?;
        Ok(Some(Reply::public("Role added.")))
    }

    /// # Errors
    ///
    /// Fails when Discord rejects the role change.
    pub async fn remove_role(
        &self,
        invocation: &Invocation,
        target: UserId,
        role: RoleId,
    ) -> ModerationResult<Option<Reply>> {
        if !self.permitted(invocation).await {
            return Ok(None);
        }
        self.gateway
            .remove_role(invocation.guild_id, target, role)
            .await?;
        Ok(Some(Reply::public("Role removed.")))
    }

    /// Post `message` in the invoking channel as the bot
    ///
    /// # Errors
    ///
    /// Fails on an empty or oversized message or a Discord error.
    pub async fn announce(
        &self,
        invocation: &Invocation,
        message: &str,
    ) -> ModerationResult<Option<Reply>> {
        if !self.permitted(invocation).await {
            return Ok(None);
        }
        check_message_length(message)?;
        self.gateway
            .send_text(invocation.channel_id, message)
            .await?;
        Ok(Some(Reply::ephemeral("Announcement sent.")))
    }

    /// Post a yes/no poll with thumbs reactions
    ///
    /// # Errors
    ///
    /// Fails on an empty or oversized question or a Discord error.
    pub async fn poll(
        &self,
        invocation: &Invocation,
        question: &str,
    ) -> ModerationResult<Option<Reply>> {
        if !self.permitted(invocation).await {
            return Ok(None);
        }
        if question.trim().is_empty() {
            return Err(ModerationError::invalid("question must not be empty"));
        }
        let content = format!("📊 **{question}**");
        check_message_length(&content)?;

        let message_id = self
            .gateway
            .send_text(invocation.channel_id, &content)
            .await?;
        for emoji in POLL_REACTIONS {
            self.gateway
                .add_reaction(invocation.channel_id, message_id, emoji)
                .await?;
        }
        Ok(Some(Reply::ephemeral("Poll created.")))
    }

    /// Owner-only status check: post a status message, update it after a
    /// while, then confirm. Returns `false` without doing anything for anyone
    /// but the owner.
    ///
    /// # Errors
    ///
    /// Fails when a status message can't be posted or edited.
    pub async fn verify(&self, invocation: &Invocation) -> ModerationResult<bool> {
        if !self.gate.is_owner(invocation.author_id) {
            return Ok(false);
        }

        let channel_id = invocation.channel_id;
        let status = self.gateway.send_text(channel_id, VERIFY_PENDING).await?;
        tokio::time::sleep(VERIFY_FIRST_STAGE).await;
        self.gateway
            .edit_text(channel_id, status, VERIFY_WORKING)
            .await?;
        tokio::time::sleep(VERIFY_SECOND_STAGE).await;
        self.gateway.send_text(channel_id, VERIFY_DONE).await?;
        Ok(true)
    }
}

fn check_message_length(message: &str) -> ModerationResult<()> {
    let length = message.chars().count();
    if message.trim().is_empty() || length > MAX_MESSAGE_CHARS {
        return Err(ModerationError::invalid(format!(
            "message must be between 1 and {MAX_MESSAGE_CHARS} characters"
        )));
    }
    Ok(())
}
