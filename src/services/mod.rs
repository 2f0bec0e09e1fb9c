pub mod moderation;
pub mod spam;
