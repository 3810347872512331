//! Who may run which command

use crate::store::ConfigStore;
use poise::serenity_prelude::{GuildId, RoleId, UserId};
use std::sync::Arc;

/// Authorization policy: the configured moderator roles, plus one owner who
/// may always act and alone may change configuration.
#[derive(Debug, Clone)]
pub struct Gate {
    owner_id: Option<UserId>,
    roles: Arc<ConfigStore>,
}

impl Gate {
    #[must_use]
    pub fn new(owner_id: Option<UserId>, roles: Arc<ConfigStore>) -> Self {
        Self { owner_id, roles }
    }

    #[must_use]
    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.owner_id == Some(user_id)
    }

    /// Whether `user_id`, holding `user_roles`, may moderate in `guild_id`
    pub async fn may_moderate(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        user_roles: &[RoleId],
    ) -> bool {
        self.is_owner(user_id) || self.roles.is_authorized(guild_id, user_roles).await
    }

    #[must_use]
    pub fn roles(&self) -> &ConfigStore {
        &self.roles
    }
}
