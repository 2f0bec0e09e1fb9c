use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, GatewayIntents, GuildId};
use tracing::{error, info, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::commands;
use crate::config::{OptionsStore, Settings};
use crate::handlers::event_handler::event_handler;
use crate::services::spam::sweeper;

pub async fn run(settings: Settings, options: OptionsStore) -> Result<(), Error> {
    let data = Arc::new(Data::new(settings.clone(), options));

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![commands::antispam::antispam()],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: None, // Slash commands only
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            error!("Command error: {:?}", error);
                            let _ = ctx.say(format!("Error: {}", error)).await;
                        }
                        poise::FrameworkError::ArgumentParse { error, ctx, .. } => {
                            let _ = ctx.say(format!("Invalid argument: {}", error)).await;
                        }
                        poise::FrameworkError::MissingUserPermissions { ctx, .. } => {
                            let _ = ctx.say("You need the Kick Members permission for this.").await;
                        }
                        poise::FrameworkError::UnknownCommand { .. } => {}
                        err => {
                            error!("Framework error: {:?}", err);
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot connected as {}", ready.user.name);

                sweeper::spawn_idle_sweeper(data.clone());
                info!(
                    "Started idle tracker sweeper (idle after {}s)",
                    data.settings.tracker_idle_seconds
                );

                // Register commands globally or per-guild based on GUILD_ID env var
                let commands = &framework.options().commands;
                match data.settings.guild_id {
                    Some(guild_id) => {
                        let guild_id = GuildId::new(guild_id);
                        match poise::builtins::register_in_guild(ctx, commands, guild_id).await {
                            Ok(_) => {
                                info!(
                                    "Registered {} commands in guild {}",
                                    commands.len(),
                                    guild_id
                                );
                            }
                            Err(e) => {
                                error!("Failed to register guild commands: {:?}", e);
                                return Err(Error::Serenity(e));
                            }
                        }
                    }
                    None => {
                        match poise::builtins::register_globally(ctx, commands).await {
                            Ok(_) => {
                                info!(
                                    "Registered {} commands globally",
                                    commands.len()
                                );
                                info!("Note: global commands can take up to 1 hour to appear");
                            }
                            Err(e) => {
                                warn!("Failed to register commands globally: {:?}", e);
                                return Err(Error::Serenity(e));
                            }
                        }
                    }
                }

                Ok(data)
            })
        })
        .build();

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::ClientBuilder::new(&settings.discord_token, intents)
        .framework(framework)
        .await
        .map_err(Error::Serenity)?;

    info!("Starting Discord client...");
    client.start().await.map_err(Error::Serenity)
}
