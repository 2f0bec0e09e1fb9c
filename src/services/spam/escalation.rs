use std::fmt;

use tracing::debug;

use crate::config::AntiSpamOptions;
use crate::services::spam::tracker::UserSpamTracker;

/// Action the caller should take for a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Punishment {
    None,
    Warn,
    Kick,
    Ban,
}

impl Punishment {
    fn tier(self) -> Tier {
        match self {
            Punishment::None => Tier::None,
            Punishment::Warn => Tier::Warned,
            Punishment::Kick => Tier::Kicked,
            Punishment::Ban => Tier::Banned,
        }
    }
}

/// How far a user has been escalated; never goes down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    #[default]
    None,
    Warned,
    Kicked,
    Banned,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tier::None => "None",
            Tier::Warned => "Warned",
            Tier::Kicked => "Kicked",
            Tier::Banned => "Banned",
        };
        f.write_str(label)
    }
}

/// Escalation state kept alongside each tracker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EscalationPolicy {
    tier: Tier,
    punish_event_count: u32,
}

impl EscalationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn punish_event_count(&self) -> u32 {
        self.punish_event_count
    }

    /// Turn the tracker's current duplicate count into an action.
    ///
    /// Every time the counter reaches `message_duplicate_count` one
    /// punishment event is registered. The first `warn_threshold` events
    /// warn, the next `kick_threshold` events kick, and the event that
    /// brings the total to `warn + kick + ban_threshold` bans. Events in
    /// between the last kick and the ban return `Punishment::None`.
    pub fn evaluate(&mut self, tracker: &UserSpamTracker, options: &AntiSpamOptions) -> Punishment {
        if self.tier == Tier::Banned {
            return Punishment::None;
        }

        if tracker.duplicate_counter() < options.message_duplicate_count {
            return Punishment::None;
        }

        self.punish_event_count = self.punish_event_count.saturating_add(1);
        debug!(
            "Punishment event {} for {} (duplicates: {})",
            self.punish_event_count,
            tracker.key(),
            tracker.duplicate_counter()
        );

        let punishment = ladder_step(self.punish_event_count, options);
        let reached = punishment.tier();

        // A smaller ladder after an options change must not downgrade
        if reached < self.tier {
            return Punishment::None;
        }
        if reached != Tier::None {
            self.tier = reached;
        }

        punishment
    }
}

/// `warn_threshold` and `kick_threshold` count events that get a response,
/// while `ban_threshold` counts events after the last kick up to and including
/// the ban. The events in that stretch return `None`: the member has already
/// been kicked and is on probation until the ban lands.
fn ladder_step(events: u32, options: &AntiSpamOptions) -> Punishment {
    let warn_end = options.warn_threshold;
    let kick_end = warn_end.saturating_add(options.kick_threshold);
    let ban_at = kick_end.saturating_add(options.ban_threshold);

    if events <= warn_end {
        Punishment::Warn
    } else if events <= kick_end {
        Punishment::Kick
    } else if events >= ban_at {
        Punishment::Ban
    } else {
        Punishment::None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Duration, Utc};
    use tokio_test::assert_ok;

    use super::*;
    use crate::services::spam::message::MessageRecord;

    fn spam_tracker(options: &Arc<AntiSpamOptions>, count: u64) -> UserSpamTracker {
        let base = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let mut tracker = UserSpamTracker::new(1, 1, options.clone());
        for id in 0..count {
            let record = MessageRecord::new(
                id,
                "free nitro at example.com",
                1,
                1,
                1,
                base + Duration::milliseconds(id as i64 * 50),
            );
            assert_ok!(tracker.add_message(record));
        }
        tracker
    }

    #[test]
    fn test_below_threshold_no_event() {
        let options = Arc::new(AntiSpamOptions::default());
        let tracker = spam_tracker(&options, 4);
        let mut policy = EscalationPolicy::new();

        assert_eq!(policy.evaluate(&tracker, &options), Punishment::None);
        assert_eq!(policy.punish_event_count(), 0);
        assert_eq!(policy.tier(), Tier::None);
    }

    #[test]
    fn test_five_duplicates_one_event() {
        let options = Arc::new(AntiSpamOptions::default());
        let base = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let mut tracker = UserSpamTracker::new(1, 1, options.clone());
        let mut policy = EscalationPolicy::new();

        let contents = [
            "free nitro at example.com",
            "free nitro at example.com!",
            "Free nitro at example.com",
            "free nitro at example.com",
            "free  nitro at example.com!",
        ];
        for (id, content) in contents.iter().enumerate() {
            let record = MessageRecord::new(
                id as u64,
                *content,
                1,
                1,
                1,
                base + Duration::milliseconds(id as i64 * 100),
            );
            assert_ok!(tracker.add_message(record));
            policy.evaluate(&tracker, &options);
        }

        assert_eq!(tracker.duplicate_counter(), 5);
        assert_eq!(policy.punish_event_count(), 1);
        assert_eq!(policy.tier(), Tier::Warned);
    }

    #[test]
    fn test_full_ladder() {
        let options = Arc::new(AntiSpamOptions::default());
        let tracker = spam_tracker(&options, 5);
        let mut policy = EscalationPolicy::new();

        // warn 3, kick 2, then ban on the 2nd event after the kicks
        let expected = [
            Punishment::Warn,
            Punishment::Warn,
            Punishment::Warn,
            Punishment::Kick,
            Punishment::Kick,
            Punishment::None,
            Punishment::Ban,
        ];
        for (i, want) in expected.iter().enumerate() {
            assert_eq!(policy.evaluate(&tracker, &options), *want, "event {}", i + 1);
        }
        assert_eq!(policy.tier(), Tier::Banned);
        assert_eq!(policy.punish_event_count(), 7);
    }

    #[test]
    fn test_banned_is_terminal() {
        let options = Arc::new(AntiSpamOptions {
            warn_threshold: 0,
            kick_threshold: 0,
            ban_threshold: 1,
            ..Default::default()
        });
        let tracker = spam_tracker(&options, 5);
        let mut policy = EscalationPolicy::new();

        assert_eq!(policy.evaluate(&tracker, &options), Punishment::Ban);
        assert_eq!(policy.evaluate(&tracker, &options), Punishment::None);
        assert_eq!(policy.punish_event_count(), 1);
        assert_eq!(policy.tier(), Tier::Banned);
    }

    #[test]
    fn test_zero_ban_threshold_bans_after_kicks() {
        let options = Arc::new(AntiSpamOptions {
            warn_threshold: 1,
            kick_threshold: 1,
            ban_threshold: 0,
            ..Default::default()
        });
        let tracker = spam_tracker(&options, 5);
        let mut policy = EscalationPolicy::new();

        assert_eq!(policy.evaluate(&tracker, &options), Punishment::Warn);
        assert_eq!(policy.evaluate(&tracker, &options), Punishment::Kick);
        assert_eq!(policy.evaluate(&tracker, &options), Punishment::Ban);
    }

    #[test]
    fn test_never_downgrades() {
        let options = Arc::new(AntiSpamOptions {
            warn_threshold: 1,
            kick_threshold: 1,
            ..Default::default()
        });
        let tracker = spam_tracker(&options, 5);
        let mut policy = EscalationPolicy::new();

        policy.evaluate(&tracker, &options);
        assert_eq!(policy.evaluate(&tracker, &options), Punishment::Kick);
        assert_eq!(policy.tier(), Tier::Kicked);

        // A guild raising its warn threshold should not send a kicked user back to warnings
        let relaxed = AntiSpamOptions {
            warn_threshold: 10,
            ..Default::default()
        };
        assert_eq!(policy.evaluate(&tracker, &relaxed), Punishment::None);
        assert_eq!(policy.tier(), Tier::Kicked);
    }
}
