use chrono::{DateTime, Utc};

/// A single chat message as seen by the spam engine
#[derive(Debug, Clone)]
pub struct MessageRecord {
    pub id: u64,
    pub content: String,
    pub author_id: u64,
    pub channel_id: u64,
    pub guild_id: u64,
    pub timestamp: DateTime<Utc>,
}

impl MessageRecord {
    pub fn new(
        id: u64,
        content: impl Into<String>,
        author_id: u64,
        channel_id: u64,
        guild_id: u64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            content: content.into(),
            author_id,
            channel_id,
            guild_id,
            timestamp,
        }
    }
}

impl PartialEq for MessageRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MessageRecord {}
