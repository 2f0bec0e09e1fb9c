use std::sync::Arc;

use chrono::Utc;
use serenity::all::{Context, Message};
use tracing::{debug, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::services::moderation::punishment;
use crate::services::spam::{AntiSpamError, AuthorProfile, MessageRecord};
use crate::utils::{formatting, permissions, snowflake};

/// Feed a guild message into the spam guard and act on the result
pub async fn handle_message(ctx: &Context, data: &Arc<Data>, msg: &Message) -> Result<(), Error> {
    let Some(guild_id) = msg.guild_id else {
        // Direct messages are not moderated
        return Ok(());
    };

    let record = record_from_parts(
        msg.id.get(),
        &msg.content,
        msg.author.id.get(),
        msg.channel_id.get(),
        Some(guild_id.get()),
    )?;

    let (perms, role_ids) = permissions::member_context(ctx, guild_id, msg.author.id).await;
    let author = AuthorProfile {
        is_bot: msg.author.bot,
        permissions: perms.bits(),
        role_ids,
        mention: formatting::mention_user(msg.author.id),
        display_name: msg.author.display_name().to_string(),
    };

    let options = data.options.for_guild(guild_id.get());
    let decision = match data.spam_guard.ingest(record, &author, options) {
        Ok(decision) => decision,
        Err(AntiSpamError::DuplicateObject { message_id, key }) => {
            // Gateway re-delivery
            debug!("Ignoring re-delivered message {} for {}", message_id, key);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if decision.is_none() {
        return Ok(());
    }

    debug!(
        "Spam decision {:?} for user {} on message: {}",
        decision.punishment,
        msg.author.id,
        formatting::truncate(&msg.content, 80)
    );

    if let Err(e) =
        punishment::execute(ctx, data, guild_id, msg.channel_id, msg.author.id, &decision).await
    {
        warn!(
            "Failed to apply {:?} to user {} in guild {}: {:?}",
            decision.punishment, msg.author.id, guild_id, e
        );
    }

    Ok(())
}

/// Build a record from raw gateway fields
pub fn record_from_parts(
    message_id: u64,
    content: &str,
    author_id: u64,
    channel_id: u64,
    guild_id: Option<u64>,
) -> Result<MessageRecord, AntiSpamError> {
    let guild_id = guild_id
        .ok_or_else(|| AntiSpamError::invalid(format!("message {} has no guild", message_id)))?;

    // Snowflakes carry their creation time; fall back to receive time
    let timestamp = snowflake::timestamp(message_id).unwrap_or_else(Utc::now);

    Ok(MessageRecord::new(
        message_id,
        content,
        author_id,
        channel_id,
        guild_id,
        timestamp,
    ))
}
