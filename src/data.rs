use std::{ops::Deref, sync::Arc};

use crate::moderation::{Gate, ModerationService, NoticeOptions, SerenityGateway};
use crate::settings::BotSettings;
use crate::store::{CaseCounter, ConfigStore};
use poise::serenity_prelude::{Http, UserId};

/// User data shared by every command invocation
#[derive(Debug, Clone)]
pub struct Data(pub Arc<DataInner>);

#[derive(Debug)]
pub struct DataInner {
    pub settings: BotSettings,
    pub moderation: ModerationService<SerenityGateway>,
}

impl Deref for Data {
    type Target = DataInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Data {
    /// Wire the stores and gateway described by `settings`
    #[must_use]
    pub fn new(settings: BotSettings, http: Arc<Http>) -> Self {
        let roles = Arc::new(ConfigStore::new(settings.config_file.clone()));
        let gate = Gate::new(settings.owner_id.map(UserId::new), roles);
        let cases = settings
            .case_numbering
            .then(|| CaseCounter::new(settings.cases_file.clone()));
        let notices = NoticeOptions {
            notify_targets: settings.notify_targets,
            appeal_url: settings.appeal_url.clone(),
        };
        let moderation =
            ModerationService::new(gate, cases, notices, SerenityGateway::new(http));

        Self(Arc::new(DataInner {
            settings,
            moderation,
        }))
    }
}
