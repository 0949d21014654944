use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::info;

use crate::state::AppState;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Periodically closes editor sessions nobody has touched within the TTL.
pub async fn start_session_sweeper(state: Arc<AppState>) {
    info!(
        ttl_minutes = state.config.session_ttl_minutes,
        "starting idle session sweeper"
    );

    let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
    loop {
        ticker.tick().await;
        let expired = state.sweep_idle(Utc::now());
        if !expired.is_empty() {
            info!(count = expired.len(), "swept idle sessions");
        }
    }
}
