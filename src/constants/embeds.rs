use serenity::all::{Colour, CreateEmbed};

use crate::services::spam::Tier;

// ============================================================================
// Color Palette
// ============================================================================

/// Success color - Emerald green
pub const SUCCESS_COLOR: Colour = Colour::from_rgb(16, 185, 129);

/// Error color - Rose red
pub const ERROR_COLOR: Colour = Colour::from_rgb(244, 63, 94);

/// Warning color - Amber
pub const WARNING_COLOR: Colour = Colour::from_rgb(245, 158, 11);

/// Info/neutral color - Slate
pub const INFO_COLOR: Colour = Colour::from_rgb(100, 116, 139);

/// Bullet point character
pub const BULLET: &str = "•";

// ============================================================================
// Embed Builders
// ============================================================================

/// Create a success embed
pub fn success_embed() -> CreateEmbed {
    CreateEmbed::new().color(SUCCESS_COLOR)
}

/// Create an error embed
pub fn error_embed() -> CreateEmbed {
    CreateEmbed::new().color(ERROR_COLOR)
}

/// Create a warning embed
pub fn warning_embed() -> CreateEmbed {
    CreateEmbed::new().color(WARNING_COLOR)
}

/// Create an info/neutral embed
pub fn info_embed() -> CreateEmbed {
    CreateEmbed::new().color(INFO_COLOR)
}

/// Embed colored by how far a user has been escalated
pub fn tier_embed(tier: Tier) -> CreateEmbed {
    match tier {
        Tier::None => info_embed(),
        Tier::Warned => warning_embed(),
        Tier::Kicked | Tier::Banned => error_embed(),
    }
}

// ============================================================================
// Text Helpers
// ============================================================================

/// Format a list of items with bullet points
pub fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("{} {}", BULLET, item))
        .collect::<Vec<_>>()
        .join("\n")
}
