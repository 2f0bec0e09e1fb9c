use thiserror::Error;

use crate::services::spam::tracker::TrackerKey;

/// Failures surfaced by the spam engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AntiSpamError {
    #[error("Message {message_id} is already stored for {key}")]
    DuplicateObject { message_id: u64, key: TrackerKey },

    #[error("Message from user {author_id} in guild {guild_id} does not belong to {key}")]
    ObjectMismatch {
        author_id: u64,
        guild_id: u64,
        key: TrackerKey,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl AntiSpamError {
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        AntiSpamError::InvalidArgument(msg.into())
    }
}
