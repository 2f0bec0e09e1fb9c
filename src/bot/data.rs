use std::fmt;
use std::sync::Arc;

use crate::config::{OptionsStore, Settings};
use crate::services::spam::SpamGuard;

/// Shared data available to all commands and handlers
pub struct Data {
    pub settings: Settings,
    /// Per-guild spam options, fixed for the lifetime of the process
    pub options: OptionsStore,
    /// Per-user message windows and escalation state
    pub spam_guard: SpamGuard,
}

impl Data {
    pub fn new(settings: Settings, options: OptionsStore) -> Self {
        Self {
            settings,
            options,
            spam_guard: SpamGuard::new(),
        }
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data")
            .field("configured_guilds", &self.options.guild_count())
            .field("tracked_users", &self.spam_guard.len())
            .finish_non_exhaustive()
    }
}

pub type Context<'a> = poise::Context<'a, Arc<Data>, crate::bot::error::Error>;
