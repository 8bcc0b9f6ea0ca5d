use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use bastion_core::Guard;
use bastion_utils::time::now_unix_secs;

/// Periodically drop ledger entries for executors that went quiet.
pub fn spawn_ledger_sweeper(guard: Arc<Guard>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let dropped = guard.sweep(now_unix_secs());
            if dropped > 0 {
                debug!(dropped, remaining = guard.ledger().tracked_keys(), "antinuke ledger swept");
            }
        }
    })
}
