pub mod error;
pub mod escalation;
pub mod guard;
pub mod message;
pub mod similarity;
pub mod sweeper;
pub mod tracker;

pub use error::AntiSpamError;
pub use escalation::{EscalationPolicy, Punishment, Tier};
pub use guard::{AuthorProfile, Decision, SpamGuard, TrackerSnapshot};
pub use message::MessageRecord;
pub use tracker::{TrackerKey, UserSpamTracker};
