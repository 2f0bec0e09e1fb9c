use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::bot::error::Error;
use crate::constants::defaults::*;
use crate::services::spam::error::AntiSpamError;

/// Per-guild spam detection options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AntiSpamOptions {
    pub warn_threshold: u32,
    pub kick_threshold: u32,
    pub ban_threshold: u32,
    /// Window length in milliseconds
    pub message_interval: u64,
    pub message_duplicate_count: u32,
    /// Similarity percentage, 0-100
    pub message_duplicate_accuracy: u8,
    pub warn_message: String,
    pub kick_message: String,
    pub ban_message: String,
    /// Permission bits that exempt a member
    pub ignore_perms: HashSet<u64>,
    pub ignore_users: HashSet<u64>,
    pub ignore_bots: bool,
    pub ignore_channels: HashSet<u64>,
    pub ignore_roles: HashSet<u64>,
    pub ignore_guilds: HashSet<u64>,
}

impl Default for AntiSpamOptions {
    fn default() -> Self {
        Self {
            warn_threshold: DEFAULT_WARN_THRESHOLD,
            kick_threshold: DEFAULT_KICK_THRESHOLD,
            ban_threshold: DEFAULT_BAN_THRESHOLD,
            message_interval: DEFAULT_MESSAGE_INTERVAL_MS,
            message_duplicate_count: DEFAULT_MESSAGE_DUPLICATE_COUNT,
            message_duplicate_accuracy: DEFAULT_MESSAGE_DUPLICATE_ACCURACY,
            warn_message: DEFAULT_WARN_MESSAGE.to_string(),
            kick_message: DEFAULT_KICK_MESSAGE.to_string(),
            ban_message: DEFAULT_BAN_MESSAGE.to_string(),
            ignore_perms: HashSet::new(),
            ignore_users: HashSet::new(),
            ignore_bots: true,
            ignore_channels: HashSet::new(),
            ignore_roles: HashSet::new(),
            ignore_guilds: HashSet::new(),
        }
    }
}

impl AntiSpamOptions {
    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), AntiSpamError> {
        if self.message_interval == 0 {
            return Err(AntiSpamError::invalid("messageInterval must be greater than 0"));
        }
        if self.message_duplicate_count == 0 {
            return Err(AntiSpamError::invalid(
                "messageDuplicateCount must be greater than 0",
            ));
        }
        if self.message_duplicate_accuracy > 100 {
            return Err(AntiSpamError::invalid(format!(
                "messageDuplicateAccuracy must be between 0 and 100, got {}",
                self.message_duplicate_accuracy
            )));
        }
        Ok(())
    }

    /// Window length as a chrono duration, saturating at `TimeDelta::MAX`
    pub fn interval(&self) -> TimeDelta {
        i64::try_from(self.message_interval)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

#[derive(Debug, Default, Deserialize)]
struct OptionsFile {
    #[serde(default)]
    default: AntiSpamOptions,
    #[serde(default)]
    guilds: HashMap<u64, AntiSpamOptions>,
}

/// Validated options for every guild, resolved once at startup
#[derive(Debug, Clone, Default)]
pub struct OptionsStore {
    default: Arc<AntiSpamOptions>,
    guilds: HashMap<u64, Arc<AntiSpamOptions>>,
}

impl OptionsStore {
    pub fn new(default: AntiSpamOptions) -> Result<Self, AntiSpamError> {
        default.validate()?;
        Ok(Self {
            default: Arc::new(default),
            guilds: HashMap::new(),
        })
    }

    /// Parse an options document
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let file: OptionsFile = serde_json::from_str(json)?;

        let mut store = Self::new(file.default)?;
        for (guild_id, options) in file.guilds {
            store.insert(guild_id, options)?;
        }

        Ok(store)
    }

    /// Load an options document from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn insert(&mut self, guild_id: u64, options: AntiSpamOptions) -> Result<(), AntiSpamError> {
        options.validate()?;
        self.guilds.insert(guild_id, Arc::new(options));
        Ok(())
    }

    /// Options for a guild, falling back to the defaults
    pub fn for_guild(&self, guild_id: u64) -> &Arc<AntiSpamOptions> {
        self.guilds.get(&guild_id).unwrap_or(&self.default)
    }

    pub fn guild_count(&self) -> usize {
        self.guilds.len()
    }
}
