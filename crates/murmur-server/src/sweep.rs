use std::time::Duration;

use tracing::debug;

use murmur_api::state::AppState;

/// Background task that drops idle presence entries in every channel.
///
/// Heartbeats already sweep their own channel; this catches channels nobody
/// heartbeats into any more, so their rosters stop listing long-gone users.
pub async fn run_presence_sweep(state: AppState, period: Duration) {
    let mut interval = tokio::time::interval(period);

    loop {
        interval.tick().await;

        let removed = state.store.sweep_presence();
        if removed > 0 {
            debug!("Presence sweep: removed {} idle user(s)", removed);
        }
    }
}
