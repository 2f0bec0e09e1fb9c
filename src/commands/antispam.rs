use poise::serenity_prelude::User;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::services::spam::TrackerKey;
use crate::utils::formatting;

/// Inspect or reset duplicate-spam tracking
#[poise::command(
    slash_command,
    guild_only,
    subcommands("status", "reset"),
    required_permissions = "KICK_MEMBERS"
)]
pub async fn antispam(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Show a member's spam window and escalation tier
#[poise::command(slash_command, guild_only, required_permissions = "KICK_MEMBERS")]
pub async fn status(
    ctx: Context<'_>,
    #[description = "Member to inspect"] user: User,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let key = TrackerKey::new(user.id.get(), guild_id.get());

    let embed = match ctx.data().spam_guard.snapshot(key) {
        Some(snapshot) => {
            let options = ctx.data().options.for_guild(guild_id.get());
            let lines = vec![
                format!("Tier: **{}**", snapshot.tier),
                format!("Punishment events: **{}**", snapshot.punish_event_count),
                format!(
                    "Duplicates in window: **{}**/{}",
                    snapshot.duplicate_counter, options.message_duplicate_count
                ),
                format!("Messages in window: **{}**", snapshot.stored_messages),
                format!(
                    "Last message: {}",
                    formatting::relative_time(snapshot.last_activity)
                ),
            ];
            embeds::tier_embed(snapshot.tier)
                .title(format!("Spam status for {}", user.name))
                .description(embeds::bullet_list(&lines))
        }
        None => embeds::info_embed()
            .title(format!("Spam status for {}", user.name))
            .description("This member is not being tracked."),
    };

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

/// Clear a member's spam window and escalation tier
#[poise::command(slash_command, guild_only, required_permissions = "KICK_MEMBERS")]
pub async fn reset(
    ctx: Context<'_>,
    #[description = "Member to reset"] user: User,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let key = TrackerKey::new(user.id.get(), guild_id.get());

    let embed = if ctx.data().spam_guard.remove(key) {
        tracing::info!("{} reset spam tracking for {}", ctx.author().id, key);
        embeds::success_embed()
            .title("Spam tracking reset")
            .description(format!(
                "{} starts from a clean slate.",
                formatting::mention_user(user.id)
            ))
    } else {
        embeds::info_embed()
            .title("Nothing to reset")
            .description("This member is not being tracked.")
    };

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}
