use std::time::Duration;

/// Punishment events answered with a warning
pub const DEFAULT_WARN_THRESHOLD: u32 = 3;
/// Punishment events answered with a kick once warnings are used up
pub const DEFAULT_KICK_THRESHOLD: u32 = 2;
/// Further punishment events before a ban
pub const DEFAULT_BAN_THRESHOLD: u32 = 2;

/// Window in milliseconds for retaining a user's messages
pub const DEFAULT_MESSAGE_INTERVAL_MS: u64 = 2500;
/// Duplicates inside the window that make one punishment event
pub const DEFAULT_MESSAGE_DUPLICATE_COUNT: u32 = 5;
/// Similarity percentage for two messages to count as duplicates
pub const DEFAULT_MESSAGE_DUPLICATE_ACCURACY: u8 = 90;

pub const DEFAULT_WARN_MESSAGE: &str =
    "Hey $MENTIONUSER, please stop spamming/sending duplicate messages.";
pub const DEFAULT_KICK_MESSAGE: &str =
    "$USERNAME was kicked for spamming/sending duplicate messages.";
pub const DEFAULT_BAN_MESSAGE: &str =
    "$USERNAME was banned for spamming/sending duplicate messages.";

/// Template placeholders
pub const MENTION_PLACEHOLDER: &str = "$MENTIONUSER";
pub const USERNAME_PLACEHOLDER: &str = "$USERNAME";

/// Trackers without a message for this long are dropped (seconds)
pub const DEFAULT_TRACKER_IDLE_SECONDS: u64 = 600;

/// How often the idle sweeper runs
pub const IDLE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Days of messages deleted alongside a spam ban
pub const BAN_DELETE_MESSAGE_DAYS: u8 = 1;

/// Milliseconds between the Unix epoch and the Discord epoch (2015-01-01)
pub const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;
