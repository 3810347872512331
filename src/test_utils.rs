//! Shared test helpers.

use crate::moderation::Invocation;
use poise::serenity_prelude::{ChannelId, GuildId, RoleId, UserId};
use std::path::{Path, PathBuf};

pub const GUILD: u64 = 1_000;
pub const CHANNEL: u64 = 2_000;
pub const MODERATOR: u64 = 3_000;
pub const OWNER: u64 = 4_000;
pub const TARGET: u64 = 5_000;
pub const MOD_ROLE: u64 = 6_000;

/// Scratch directory under the system temp dir, removed on drop.
pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("rolewarden-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&path).expect("Failed to create temp dir");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// An invocation in the test guild by `author` holding `roles`.
pub fn invocation(author: u64, roles: &[u64]) -> Invocation {
    Invocation {
        guild_id: GuildId::new(GUILD),
        channel_id: ChannelId::new(CHANNEL),
        author_id: UserId::new(author),
        author_name: format!("user{author}"),
        author_roles: roles.iter().copied().map(RoleId::new).collect(),
    }
}
