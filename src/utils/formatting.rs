use serenity::all::UserId;

/// Format a user mention
pub fn mention_user(user_id: UserId) -> String {
    format!("<@{}>", user_id)
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Render an optional instant as a Discord relative timestamp
pub fn relative_time(at: Option<chrono::DateTime<chrono::Utc>>) -> String {
    match at {
        Some(at) => format!("<t:{}:R>", at.timestamp()),
        None => "never".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mention() {
        assert_eq!(mention_user(UserId::new(42)), "<@42>");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer message body", 10), "a longe...");
        assert_eq!(truncate("abcdef", 2), "ab");
    }

    #[test]
    fn test_relative_time() {
        let at = chrono::DateTime::from_timestamp(1_700_000_000, 0);
        assert_eq!(relative_time(at), "<t:1700000000:R>");
        assert_eq!(relative_time(None), "never");
    }
}
