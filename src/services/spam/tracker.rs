use std::collections::VecDeque;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::AntiSpamOptions;
use crate::services::spam::error::AntiSpamError;
use crate::services::spam::message::MessageRecord;
use crate::services::spam::similarity;

/// Identity of a tracker: one user inside one guild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackerKey {
    pub user_id: u64,
    pub guild_id: u64,
}

impl TrackerKey {
    pub fn new(user_id: u64, guild_id: u64) -> Self {
        Self { user_id, guild_id }
    }
}

impl fmt::Display for TrackerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user {} in guild {}", self.user_id, self.guild_id)
    }
}

/// Recent messages of one user in one guild, plus how many of them
/// repeat the newest one
pub struct UserSpamTracker {
    key: TrackerKey,
    options: Arc<AntiSpamOptions>,
    /// Insertion order, bounded by `options.message_interval`
    messages: VecDeque<MessageRecord>,
    duplicate_counter: u32,
}

impl UserSpamTracker {
    pub fn new(user_id: u64, guild_id: u64, options: Arc<AntiSpamOptions>) -> Self {
        Self {
            key: TrackerKey::new(user_id, guild_id),
            options,
            messages: VecDeque::new(),
            duplicate_counter: 0,
        }
    }

    pub fn key(&self) -> TrackerKey {
        self.key
    }

    pub fn user_id(&self) -> u64 {
        self.key.user_id
    }

    pub fn guild_id(&self) -> u64 {
        self.key.guild_id
    }

    pub fn options(&self) -> &AntiSpamOptions {
        &self.options
    }

    /// Swap in a newer options snapshot; stored messages are kept
    pub fn set_options(&mut self, options: Arc<AntiSpamOptions>) {
        self.options = options;
    }

    pub fn messages(&self) -> &VecDeque<MessageRecord> {
        &self.messages
    }

    /// Cached count, refreshed by `add_message`
    pub fn duplicate_counter(&self) -> u32 {
        self.duplicate_counter
    }

    /// Timestamp of the newest stored message
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.messages.iter().map(|m| m.timestamp).max()
    }

    /// Store a message, dropping anything that fell out of the window.
    ///
    /// The window is measured back from the newest timestamp stored, so a
    /// message delivered late and already outside it is not retained.
    ///
    /// Validation happens before any mutation, so a failed call leaves the
    /// tracker untouched.
    pub fn add_message(&mut self, record: MessageRecord) -> Result<(), AntiSpamError> {
        if record.author_id != self.key.user_id || record.guild_id != self.key.guild_id {
            return Err(AntiSpamError::ObjectMismatch {
                author_id: record.author_id,
                guild_id: record.guild_id,
                key: self.key,
            });
        }

        if self.messages.iter().any(|m| m.id == record.id) {
            return Err(AntiSpamError::DuplicateObject {
                message_id: record.id,
                key: self.key,
            });
        }

        // The window trails the newest message seen, which a late delivery is not
        let latest = self
            .last_activity()
            .map_or(record.timestamp, |newest| newest.max(record.timestamp));
        self.messages.push_back(record);

        // An interval reaching past the representable range keeps everything
        if let Some(cutoff) = latest.checked_sub_signed(self.options.interval()) {
            self.messages.retain(|m| m.timestamp >= cutoff);
        }

        // The newest message counts itself once
        self.duplicate_counter = self.count_duplicates_of_newest() + 1;

        Ok(())
    }

    /// Recompute the duplicate count from the current window without
    /// touching the cached counter.
    ///
    /// This does not count the newest message itself, so it sits exactly one
    /// below `duplicate_counter` whenever the window is non-empty.
    pub fn get_correct_duplicate_count(&self) -> u32 {
        self.count_duplicates_of_newest()
    }

    fn count_duplicates_of_newest(&self) -> u32 {
        let Some(newest) = self.messages.back() else {
            return 0;
        };

        let accuracy = self.options.message_duplicate_accuracy;
        self.messages
            .iter()
            .take(self.messages.len() - 1)
            .filter(|m| similarity::is_duplicate(&m.content, &newest.content, accuracy))
            .count() as u32
    }
}

impl PartialEq for UserSpamTracker {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for UserSpamTracker {}

impl Hash for UserSpamTracker {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for UserSpamTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserSpamTracker for {}", self.key.user_id)
    }
}

impl fmt::Debug for UserSpamTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSpamTracker")
            .field("user_id", &self.key.user_id)
            .field("guild_id", &self.key.guild_id)
            .field("stored_messages", &self.messages.len())
            .field("duplicate_counter", &self.duplicate_counter)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn base_time() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn msg(
        id: u64,
        content: &str,
        author_id: u64,
        guild_id: u64,
        offset_ms: i64,
    ) -> MessageRecord {
        MessageRecord::new(
            id,
            content,
            author_id,
            2,
            guild_id,
            base_time() + Duration::milliseconds(offset_ms),
        )
    }

    fn setup() -> UserSpamTracker {
        let mut tracker = UserSpamTracker::new(0, 3, Arc::new(AntiSpamOptions::default()));
        assert_ok!(tracker.add_message(msg(0, "Hello world", 0, 3, 0)));
        assert_ok!(tracker.add_message(msg(1, "Foo Bar", 0, 3, 10)));
        tracker
    }

    #[test]
    fn test_identity() {
        let tracker = setup();
        assert_eq!(tracker.user_id(), 0);
        assert_eq!(tracker.guild_id(), 3);
        assert_eq!(tracker.key(), TrackerKey::new(0, 3));
        assert_eq!(*tracker.options(), AntiSpamOptions::default());
    }

    #[test]
    fn test_message_added() {
        let mut tracker = setup();
        assert_eq!(tracker.messages().len(), 2);
        assert_ok!(tracker.add_message(msg(3, "Test", 0, 3, 20)));
        assert_eq!(tracker.messages().len(), 3);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut tracker = setup();
        let err = assert_err!(tracker.add_message(msg(1, "Testing", 0, 3, 20)));
        assert!(matches!(err, AntiSpamError::DuplicateObject { message_id: 1, .. }));

        assert_eq!(tracker.messages().len(), 2);
        let ids: Vec<u64> = tracker.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(tracker.messages()[1].content, "Foo Bar");
    }

    #[test]
    fn test_identity_mismatch_rejected() {
        let mut tracker = setup();
        let record = MessageRecord::new(20, "Testing", 20, 20, 20, base_time());
        let err = assert_err!(tracker.add_message(record));
        assert!(matches!(
            err,
            AntiSpamError::ObjectMismatch {
                author_id: 20,
                guild_id: 20,
                ..
            }
        ));

        // Either field alone is enough
        assert_err!(tracker.add_message(msg(21, "Testing", 0, 4, 20)));
        assert_err!(tracker.add_message(msg(22, "Testing", 1, 3, 20)));
        assert_eq!(tracker.messages().len(), 2);
    }

    #[test]
    fn test_equality_ignores_history() {
        let tracker = setup();
        let same = UserSpamTracker::new(0, 3, Arc::new(AntiSpamOptions::default()));
        let other_user = UserSpamTracker::new(2, 3, Arc::new(AntiSpamOptions::default()));
        let other_guild = UserSpamTracker::new(0, 2, Arc::new(AntiSpamOptions::default()));

        assert_eq!(tracker, same);
        assert_ne!(tracker, other_user);
        assert_ne!(tracker, other_guild);
    }

    #[test]
    fn test_duplicate_counter_offset() {
        let tracker = setup();
        assert_ne!(tracker.duplicate_counter(), tracker.get_correct_duplicate_count());
        assert_eq!(
            tracker.duplicate_counter() - 1,
            tracker.get_correct_duplicate_count()
        );
    }

    #[test]
    fn test_duplicates_counted() {
        let mut tracker = UserSpamTracker::new(0, 3, Arc::new(AntiSpamOptions::default()));
        for id in 0..4 {
            assert_ok!(tracker.add_message(msg(id, "buy cheap gold now", 0, 3, id as i64 * 100)));
        }
        assert_ok!(tracker.add_message(msg(4, "something unrelated", 0, 3, 400)));
        assert_eq!(tracker.duplicate_counter(), 1);

        assert_ok!(tracker.add_message(msg(5, "Buy cheap gold now!", 0, 3, 500)));
        assert_eq!(tracker.duplicate_counter(), 5);
        assert_eq!(tracker.get_correct_duplicate_count(), 4);
    }

    #[test]
    fn test_old_messages_evicted() {
        let mut tracker = UserSpamTracker::new(0, 3, Arc::new(AntiSpamOptions::default()));
        assert_ok!(tracker.add_message(msg(0, "a", 0, 3, 0)));
        assert_ok!(tracker.add_message(msg(1, "b", 0, 3, 1000)));
        assert_ok!(tracker.add_message(msg(2, "c", 0, 3, 2500)));
        // Exactly on the boundary is still inside the window
        assert_eq!(tracker.messages().len(), 3);

        assert_ok!(tracker.add_message(msg(3, "d", 0, 3, 3600)));
        let ids: Vec<u64> = tracker.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 3]);

        let latest = tracker.messages().back().unwrap().timestamp;
        let cutoff = latest - tracker.options().interval();
        assert!(tracker.messages().iter().all(|m| m.timestamp >= cutoff));
    }

    #[test]
    fn test_late_delivery_uses_newest_timestamp() {
        let mut tracker = UserSpamTracker::new(0, 3, Arc::new(AntiSpamOptions::default()));
        assert_ok!(tracker.add_message(msg(0, "a", 0, 3, 10_000)));
        assert_ok!(tracker.add_message(msg(1, "b", 0, 3, 0)));

        // id 1 is older than newest - interval and must not be kept
        let ids: Vec<u64> = tracker.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0]);

        // A late message still inside the window is kept
        assert_ok!(tracker.add_message(msg(2, "c", 0, 3, 8_000)));
        let ids: Vec<u64> = tracker.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 2]);

        let latest = tracker.last_activity().unwrap();
        let cutoff = latest - tracker.options().interval();
        assert!(tracker.messages().iter().all(|m| m.timestamp >= cutoff));
    }

    #[test]
    fn test_huge_interval_keeps_everything() {
        let options = AntiSpamOptions {
            message_interval: 10_000_000_000_000_000,
            ..Default::default()
        };
        assert_ok!(options.validate());

        let mut tracker = UserSpamTracker::new(0, 3, Arc::new(options));
        assert_ok!(tracker.add_message(msg(0, "a", 0, 3, 0)));
        assert_ok!(tracker.add_message(msg(1, "a", 0, 3, 1_000_000)));
        assert_eq!(tracker.messages().len(), 2);
        assert_eq!(tracker.duplicate_counter(), 2);

        let options = AntiSpamOptions {
            message_interval: u64::MAX,
            ..Default::default()
        };
        tracker.set_options(Arc::new(options));
        assert_ok!(tracker.add_message(msg(2, "a", 0, 3, 2_000_000)));
        assert_eq!(tracker.messages().len(), 3);
    }

    #[test]
    fn test_evicted_duplicates_stop_counting() {
        let mut tracker = UserSpamTracker::new(0, 3, Arc::new(AntiSpamOptions::default()));
        assert_ok!(tracker.add_message(msg(0, "spam", 0, 3, 0)));
        assert_ok!(tracker.add_message(msg(1, "spam", 0, 3, 100)));
        assert_eq!(tracker.duplicate_counter(), 2);

        assert_ok!(tracker.add_message(msg(2, "spam", 0, 3, 10_000)));
        assert_eq!(tracker.duplicate_counter(), 1);
        assert_eq!(tracker.messages().len(), 1);
    }

    #[test]
    fn test_empty_tracker() {
        let tracker = UserSpamTracker::new(5, 6, Arc::new(AntiSpamOptions::default()));
        assert_eq!(tracker.duplicate_counter(), 0);
        assert_eq!(tracker.get_correct_duplicate_count(), 0);
        assert!(tracker.last_activity().is_none());
    }

    #[test]
    fn test_last_activity() {
        let tracker = setup();
        assert_eq!(
            tracker.last_activity(),
            Some(base_time() + Duration::milliseconds(10))
        );
    }

    #[test]
    fn test_formatting() {
        let tracker = setup();
        assert_eq!(tracker.to_string(), "UserSpamTracker for 0");
        let debug = format!("{:?}", tracker);
        assert!(debug.contains("stored_messages: 2"));
    }
}
