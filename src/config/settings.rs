use std::env;

use chrono::TimeDelta;

use crate::constants::defaults::DEFAULT_TRACKER_IDLE_SECONDS;

#[derive(Debug, Clone)]
pub struct Settings {
    pub discord_token: String,
    pub guild_id: Option<u64>,
    /// JSON document with default and per-guild spam options
    pub options_path: Option<String>,
    /// Trackers idle for longer than this are evicted
    pub tracker_idle_seconds: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| "DISCORD_TOKEN environment variable not set")?;

        let guild_id = env::var("GUILD_ID")
            .ok()
            .and_then(|s| s.parse::<u64>().ok());

        let options_path = env::var("ANTISPAM_OPTIONS_PATH")
            .ok()
            .filter(|s| !s.is_empty());

        let tracker_idle_seconds =
            parse_idle_seconds(env::var("TRACKER_IDLE_SECONDS").ok().as_deref())?;

        Ok(Self {
            discord_token,
            guild_id,
            options_path,
            tracker_idle_seconds,
        })
    }

    /// Idle timeout for spam trackers
    pub fn tracker_idle(&self) -> TimeDelta {
        idle_delta(self.tracker_idle_seconds).unwrap_or(TimeDelta::MAX)
    }
}

fn idle_delta(seconds: u64) -> Option<TimeDelta> {
    i64::try_from(seconds).ok().and_then(TimeDelta::try_seconds)
}

/// Unparseable values fall back to the default; values chrono cannot
/// represent as a duration are rejected
fn parse_idle_seconds(raw: Option<&str>) -> Result<u64, String> {
    let Some(seconds) = raw.and_then(|s| s.parse::<u64>().ok()) else {
        return Ok(DEFAULT_TRACKER_IDLE_SECONDS);
    };

    if idle_delta(seconds).is_none() {
        return Err(format!("TRACKER_IDLE_SECONDS out of range: {}", seconds));
    }

    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_idle_seconds_default() {
        assert_eq!(assert_ok!(parse_idle_seconds(None)), DEFAULT_TRACKER_IDLE_SECONDS);
        assert_eq!(
            assert_ok!(parse_idle_seconds(Some("soon"))),
            DEFAULT_TRACKER_IDLE_SECONDS
        );
        assert_eq!(assert_ok!(parse_idle_seconds(Some("30"))), 30);
    }

    #[test]
    fn test_idle_seconds_out_of_range() {
        assert_err!(parse_idle_seconds(Some("18446744073709551615")));
        assert_err!(parse_idle_seconds(Some("10000000000000000")));
    }

    #[test]
    fn test_tracker_idle_never_negative() {
        let settings = Settings {
            discord_token: String::new(),
            guild_id: None,
            options_path: None,
            tracker_idle_seconds: u64::MAX,
        };
        assert_eq!(settings.tracker_idle(), TimeDelta::MAX);

        let settings = Settings {
            tracker_idle_seconds: 600,
            ..settings
        };
        assert_eq!(settings.tracker_idle(), TimeDelta::seconds(600));
    }
}
