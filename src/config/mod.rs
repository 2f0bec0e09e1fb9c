pub mod options;
pub mod settings;

pub use options::{AntiSpamOptions, OptionsStore};
pub use settings::Settings;
