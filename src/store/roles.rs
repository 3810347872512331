//! Moderator role configuration
//!
//! Maps a guild to the set of roles whose members may run moderation commands.
//! On disk: `{ "<guild_id>": [<role_id>, ...] }`.

use super::{JsonFile, StoreResult};
use poise::serenity_prelude::{GuildId, RoleId};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use tracing::{error, info};

type GuildRoles = BTreeMap<String, Vec<u64>>;

/// Store of the allowed moderator roles per guild
#[derive(Debug)]
pub struct ConfigStore {
    file: JsonFile<GuildRoles>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }

    /// Roles allowed to moderate in `guild_id`, empty if the guild has no entry.
    ///
    /// An unreadable store is logged and treated as empty.
    pub async fn get_allowed_roles(&self, guild_id: GuildId) -> HashSet<RoleId> {
        let document = match self.file.load().await {
            Ok(document) => document,
            Err(e) => {
                error!("Failed to load role configuration: {e}");
                return HashSet::new();
            }
        };

        document
            .get(&guild_id.to_string())
            .into_iter()
            .flatten()
            .filter(|id| **id != 0)
            .map(|id| RoleId::new(*id))
            .collect()
    }

    /// Replace the allowed roles of `guild_id`. Other guilds are left untouched.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the store can't be read or the new document
    /// can't be written. The previous file content is kept in either case.
    pub async fn set_allowed_roles(
        &self,
        guild_id: GuildId,
        role_ids: impl IntoIterator<Item = RoleId>,
    ) -> StoreResult<HashSet<RoleId>> {
        let roles: HashSet<RoleId> = role_ids.into_iter().collect();
        let mut serialized: Vec<u64> = roles.iter().map(|role| role.get()).collect();
        serialized.sort_unstable();

        self.file
            .update(|document| {
                document.insert(guild_id.to_string(), serialized);
            })
            .await?;

        info!(
            guild_id = %guild_id,
            role_count = roles.len(),
            "Moderator roles updated"
        );
        Ok(roles)
    }

    /// Whether any of `user_roles` is an allowed moderator role in `guild_id`
    pub async fn is_authorized(&self, guild_id: GuildId, user_roles: &[RoleId]) -> bool {
        if user_roles.is_empty() {
            return false;
        }
        let allowed = self.get_allowed_roles(guild_id).await;
        user_roles.iter().any(|role| allowed.contains(role))
    }
}
