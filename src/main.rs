use dupeguard::{
    bot,
    config::{OptionsStore, Settings},
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Dupeguard");

    // Load settings
    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to load settings: {}", e);
            std::process::exit(1);
        }
    };

    // Load spam options, falling back to built-in defaults
    let options = match &settings.options_path {
        Some(path) => match OptionsStore::load(path) {
            Ok(store) => {
                info!(
                    "Loaded spam options from {} ({} guild overrides)",
                    path,
                    store.guild_count()
                );
                store
            }
            Err(e) => {
                error!("Failed to load spam options from {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => {
            info!("No ANTISPAM_OPTIONS_PATH set, using default spam options");
            OptionsStore::default()
        }
    };

    // Start the bot
    if let Err(e) = bot::framework::run(settings, options).await {
        error!("Bot error: {}", e);
        std::process::exit(1);
    }
}
