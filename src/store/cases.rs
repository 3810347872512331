//! Case numbering
//!
//! Every punishment issued to a member gets the next case number for that
//! (guild, member) pair. On disk: `{ "<guild_id>:<user_id>": <count> }`.

use super::{JsonFile, StoreResult};
use derive_more::Display;
use poise::serenity_prelude::{GuildId, UserId};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

/// Key of a case counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("{guild_id}:{user_id}")]
pub struct CaseKey {
    pub guild_id: GuildId,
    pub user_id: UserId,
}

impl CaseKey {
    #[must_use]
    pub fn new(guild_id: GuildId, user_id: UserId) -> Self {
        Self { guild_id, user_id }
    }
}

/// Persistent per-member case counter
#[derive(Debug)]
pub struct CaseCounter {
    file: JsonFile<BTreeMap<String, u64>>,
}

impl CaseCounter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }

    /// Increment and persist the counter for (`guild_id`, `user_id`), returning
    /// the new value. The first case for a pair is 1.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the counter file can't be read or written; the
    /// counter is not advanced in that case.
    pub async fn next_case_id(&self, guild_id: GuildId, user_id: UserId) -> StoreResult<u64> {
        let key = CaseKey::new(guild_id, user_id);
        let case_id = self
            .file
            .update(|counts| {
                let count = counts.entry(key.to_string()).or_insert(0);
                *count += 1;
                *count
            })
            .await?;

        debug!(case_key = %key, case_id, "Allocated case id");
        Ok(case_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TempDir;
    use std::sync::Arc;

    #[test]
    fn test_case_key_format() {
        let key = CaseKey::new(GuildId::new(12), UserId::new(34));
        assert_eq!(key.to_string(), "12:34");
    }

    #[tokio::test]
    async fn test_sequential_ids_per_key() {
        let dir = TempDir::new();
        let counter = CaseCounter::new(dir.path().join("cases.json"));
        let (guild, user) = (GuildId::new(1), UserId::new(2));

        for expected in 1..=5 {
            assert_eq!(counter.next_case_id(guild, user).await.unwrap(), expected);
        }
        // Other keys start from scratch
        assert_eq!(counter.next_case_id(guild, UserId::new(3)).await.unwrap(), 1);
        assert_eq!(counter.next_case_id(GuildId::new(9), user).await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_get_distinct_consecutive_ids() {
        let dir = TempDir::new();
        let counter = Arc::new(CaseCounter::new(dir.path().join("cases.json")));
        let (guild, user) = (GuildId::new(1), UserId::new(2));

        let tasks: Vec<_> = (0..24)
            .map(|_| {
                let counter = Arc::clone(&counter);
                tokio::spawn(async move { counter.next_case_id(guild, user).await.unwrap() })
            })
            .collect();

        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap());
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=24).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn test_counter_survives_reload() {
        let dir = TempDir::new();
        let path = dir.path().join("cases.json");
        let (guild, user) = (GuildId::new(77), UserId::new(88));

        let counter = CaseCounter::new(&path);
        counter.next_case_id(guild, user).await.unwrap();
        counter.next_case_id(guild, user).await.unwrap();
        drop(counter);

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({ "77:88": 2 }));

        let reopened = CaseCounter::new(&path);
        assert_eq!(reopened.next_case_id(guild, user).await.unwrap(), 3);
    }
}
