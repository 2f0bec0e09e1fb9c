use thiserror::Error;

use crate::services::spam::AntiSpamError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Discord API error: {0}")]
    Serenity(#[from] serenity::Error),

    #[error("Spam engine error: {0}")]
    AntiSpam(#[from] AntiSpamError),

    #[error("Could not read options file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not parse options: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),
}

impl Error {
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        Error::Custom(msg.into())
    }
}
