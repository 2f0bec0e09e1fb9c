use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, FullEvent};
use tracing::{debug, error, info};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::handlers::message;

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Arc<Data>, Error>,
    data: &Arc<Data>,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot, .. } => {
            info!("Bot ready as {}", data_about_bot.user.name);
        }

        FullEvent::Message { new_message } => {
            if let Err(e) = message::handle_message(ctx, data, new_message).await {
                error!("Message handler error: {:?}", e);
            }
        }

        FullEvent::GuildDelete { incomplete, .. } => {
            let dropped = data.spam_guard.forget_guild(incomplete.id.get());
            debug!("Guild {} removed, dropped {} spam trackers", incomplete.id, dropped);
        }

        _ => {}
    }

    Ok(())
}
