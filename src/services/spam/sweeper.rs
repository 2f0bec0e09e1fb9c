use std::sync::Arc;

use chrono::Utc;
use tokio::time::interval;
use tracing::{debug, info};

use crate::bot::data::Data;
use crate::constants::defaults::IDLE_SWEEP_INTERVAL;

/// Start the background task that drops trackers nobody has written to lately
pub fn spawn_idle_sweeper(data: Arc<Data>) {
    tokio::spawn(async move {
        let mut ticker = interval(IDLE_SWEEP_INTERVAL);
        let idle_for = data.settings.tracker_idle();

        loop {
            ticker.tick().await;

            let evicted = data.spam_guard.evict_idle(Utc::now(), idle_for);
            if evicted > 0 {
                info!(
                    "Evicted {} idle spam trackers ({} remaining)",
                    evicted,
                    data.spam_guard.len()
                );
            } else {
                debug!("No idle spam trackers to evict");
            }
        }
    });
}
