use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::config::AntiSpamOptions;
use crate::constants::defaults::{MENTION_PLACEHOLDER, USERNAME_PLACEHOLDER};
use crate::services::spam::error::AntiSpamError;
use crate::services::spam::escalation::{EscalationPolicy, Punishment, Tier};
use crate::services::spam::message::MessageRecord;
use crate::services::spam::tracker::{TrackerKey, UserSpamTracker};

/// What the engine knows about a message author, resolved by the caller
#[derive(Debug, Clone, Default)]
pub struct AuthorProfile {
    pub is_bot: bool,
    /// Raw permission bits of the member in the guild
    pub permissions: u64,
    pub role_ids: Vec<u64>,
    /// Mention form, e.g. `<@123>`
    pub mention: String,
    pub display_name: String,
}

/// Outcome of ingesting a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub punishment: Punishment,
    /// Rendered template, absent when there is nothing to do
    pub message: Option<String>,
}

impl Decision {
    pub fn none() -> Self {
        Self {
            punishment: Punishment::None,
            message: None,
        }
    }

    pub fn is_none(&self) -> bool {
        self.punishment == Punishment::None
    }
}

/// Point-in-time view of one tracked user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSnapshot {
    pub key: TrackerKey,
    pub stored_messages: usize,
    pub duplicate_counter: u32,
    pub tier: Tier,
    pub punish_event_count: u32,
    pub last_activity: Option<DateTime<Utc>>,
}

struct TrackedUser {
    tracker: UserSpamTracker,
    policy: EscalationPolicy,
}

/// Registry of trackers and the entry point for incoming messages
pub struct SpamGuard {
    /// One lock per tracker; the map shard is released before it is taken
    trackers: DashMap<TrackerKey, Arc<Mutex<TrackedUser>>>,
}

impl SpamGuard {
    pub fn new() -> Self {
        Self {
            trackers: DashMap::new(),
        }
    }

    /// Run a message through the ignore rules, its tracker and the
    /// escalation policy
    pub fn ingest(
        &self,
        message: MessageRecord,
        author: &AuthorProfile,
        options: &Arc<AntiSpamOptions>,
    ) -> Result<Decision, AntiSpamError> {
        if is_ignored(&message, author, options) {
            return Ok(Decision::none());
        }

        let key = TrackerKey::new(message.author_id, message.guild_id);
        let entry = self
            .trackers
            .entry(key)
            .or_insert_with(|| {
                debug!("Tracking new {}", key);
                Arc::new(Mutex::new(TrackedUser {
                    tracker: UserSpamTracker::new(key.user_id, key.guild_id, options.clone()),
                    policy: EscalationPolicy::new(),
                }))
            })
            .clone();

        let mut guard = entry.lock().unwrap_or_else(PoisonError::into_inner);
        let TrackedUser { tracker, policy } = &mut *guard;

        tracker.set_options(options.clone());
        tracker.add_message(message)?;

        let punishment = policy.evaluate(tracker, options);
        let message = template_for(punishment, options).map(|template| render(template, author));

        Ok(Decision {
            punishment,
            message,
        })
    }

    pub fn snapshot(&self, key: TrackerKey) -> Option<TrackerSnapshot> {
        let entry = self.trackers.get(&key)?.clone();
        let guard = entry.lock().unwrap_or_else(PoisonError::into_inner);

        Some(TrackerSnapshot {
            key,
            stored_messages: guard.tracker.messages().len(),
            duplicate_counter: guard.tracker.duplicate_counter(),
            tier: guard.policy.tier(),
            punish_event_count: guard.policy.punish_event_count(),
            last_activity: guard.tracker.last_activity(),
        })
    }

    /// Forget a user; their next message starts from a clean slate
    pub fn remove(&self, key: TrackerKey) -> bool {
        self.trackers.remove(&key).is_some()
    }

    /// Drop trackers whose newest message is older than `idle_for`.
    /// Trackers currently in use are kept.
    pub fn evict_idle(&self, now: DateTime<Utc>, idle_for: chrono::Duration) -> usize {
        // Negative timeouts would evict fresh trackers; unrepresentable cutoffs evict nothing
        if idle_for < chrono::Duration::zero() {
            return 0;
        }
        let Some(cutoff) = now.checked_sub_signed(idle_for) else {
            return 0;
        };
        let before = self.trackers.len();

        self.trackers.retain(|_, entry| match entry.try_lock() {
            Ok(tracked) => tracked
                .tracker
                .last_activity()
                .map(|last| last >= cutoff)
                .unwrap_or(false),
            Err(_) => true,
        });

        before.saturating_sub(self.trackers.len())
    }

    /// Drop every tracker belonging to a guild
    pub fn forget_guild(&self, guild_id: u64) -> usize {
        let before = self.trackers.len();
        self.trackers.retain(|key, _| key.guild_id != guild_id);
        before.saturating_sub(self.trackers.len())
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }
}

impl Default for SpamGuard {
    fn default() -> Self {
        Self::new()
    }
}

fn is_ignored(message: &MessageRecord, author: &AuthorProfile, options: &AntiSpamOptions) -> bool {
    if options.ignore_bots && author.is_bot {
        return true;
    }
    if options.ignore_users.contains(&message.author_id) {
        return true;
    }
    if options
        .ignore_perms
        .iter()
        .any(|flag| author.permissions & flag != 0)
    {
        return true;
    }
    if options.ignore_guilds.contains(&message.guild_id) {
        return true;
    }
    if options.ignore_channels.contains(&message.channel_id) {
        return true;
    }
    author
        .role_ids
        .iter()
        .any(|role| options.ignore_roles.contains(role))
}

fn template_for(punishment: Punishment, options: &AntiSpamOptions) -> Option<&str> {
    match punishment {
        Punishment::None => None,
        Punishment::Warn => Some(options.warn_message.as_str()),
        Punishment::Kick => Some(options.kick_message.as_str()),
        Punishment::Ban => Some(options.ban_message.as_str()),
    }
}

/// Substitute the author's mention and display name into a template
pub fn render(template: &str, author: &AuthorProfile) -> String {
    template
        .replace(MENTION_PLACEHOLDER, &author.mention)
        .replace(USERNAME_PLACEHOLDER, &author.display_name)
}
