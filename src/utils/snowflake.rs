use chrono::{DateTime, Utc};

use crate::constants::defaults::DISCORD_EPOCH_MS;

/// Creation time encoded in a Discord snowflake id
pub fn timestamp(id: u64) -> Option<DateTime<Utc>> {
    let millis = (id >> 22).checked_add(DISCORD_EPOCH_MS)?;
    DateTime::from_timestamp_millis(i64::try_from(millis).ok()?)
}
