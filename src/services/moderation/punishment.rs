use std::sync::Arc;

use serenity::all::{ChannelId, Context, CreateMessage, GuildId, UserId};
use tracing::{debug, info, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::defaults::BAN_DELETE_MESSAGE_DAYS;
use crate::constants::embeds;
use crate::services::spam::{Decision, Punishment, TrackerKey};

const AUDIT_REASON: &str = "Spamming/sending duplicate messages";

/// Carry out a decision produced by the spam guard
pub async fn execute(
    ctx: &Context,
    data: &Arc<Data>,
    guild_id: GuildId,
    channel_id: ChannelId,
    user_id: UserId,
    decision: &Decision,
) -> Result<(), Error> {
    let text = decision.message.as_deref().unwrap_or_default();

    match decision.punishment {
        Punishment::None => return Ok(()),
        Punishment::Warn => {
            channel_id.say(ctx, text).await?;
            info!("Warned user {} in guild {} for spam", user_id, guild_id);
        }
        Punishment::Kick => {
            notify_user(ctx, user_id, guild_id, "kicked").await;
            guild_id.kick_with_reason(ctx, user_id, AUDIT_REASON).await?;
            channel_id.say(ctx, text).await?;
            info!("Kicked user {} from guild {} for spam", user_id, guild_id);
        }
        Punishment::Ban => {
            notify_user(ctx, user_id, guild_id, "banned").await;
            guild_id
                .ban_with_reason(ctx, user_id, BAN_DELETE_MESSAGE_DAYS, AUDIT_REASON)
                .await?;
            channel_id.say(ctx, text).await?;
            info!("Banned user {} from guild {} for spam", user_id, guild_id);

            // Banned users leave moderation scope
            data.spam_guard
                .remove(TrackerKey::new(user_id.get(), guild_id.get()));
        }
    }

    Ok(())
}

/// DM the user before they lose access to the guild
async fn notify_user(ctx: &Context, user_id: UserId, guild_id: GuildId, action: &str) {
    let embed = embeds::warning_embed()
        .title("Spam Protection")
        .description(format!(
            "You were {} from a server (id `{}`) for spamming/sending duplicate messages.",
            action, guild_id
        ));

    let message = CreateMessage::new().embed(embed);

    // DMs may be closed; the punishment goes ahead regardless
    match user_id.create_dm_channel(ctx).await {
        Ok(dm_channel) => {
            if let Err(e) = dm_channel.send_message(ctx, message).await {
                debug!("Could not DM user {} about spam {}: {:?}", user_id, action, e);
            }
        }
        Err(e) => {
            warn!("Could not create DM channel for user {}: {:?}", user_id, e);
        }
    }
}
