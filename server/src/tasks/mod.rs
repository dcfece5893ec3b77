// Background subscriber sweep, decoupled from request traffic.

use std::time::Duration;

use tokio::time;
use tracing::info;

use crate::app::AppState;
use crate::constants::SWEEP_INTERVAL_MS;
use crate::utils::now_epoch_ms;

pub async fn sweep_task(state: AppState) {
    let mut interval = time::interval(Duration::from_millis(SWEEP_INTERVAL_MS));
    loop {
        interval.tick().await;
        let (removed, remaining) = {
            let mut hub = state.hub.write().await;
            let removed = hub.subscribers.sweep(now_epoch_ms());
            (removed, hub.subscribers.len())
        };
        if removed > 0 {
            info!(removed, remaining, "stale subscribers swept");
        }
    }
}
