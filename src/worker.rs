use std::time::Duration;

use tokio::sync::watch;

use crate::db;
use crate::state::SharedState;

/// How long consumed/expired reset tokens are kept before deletion, so a
/// late confirmation still gets the "expired" message instead of "invalid".
pub const RESET_TOKEN_GRACE_HOURS: i64 = 24;

const PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Spawn the hourly maintenance task: purge reset tokens past their grace
/// period, expired refresh tokens and stale rate-limiter entries.
pub fn spawn_purge(
    state: SharedState,
    mut shutdown: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tracing::debug!("Maintenance task started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            run_once(&state).await;

            tokio::select! {
                _ = tokio::time::sleep(PURGE_INTERVAL) => {}
                _ = shutdown.changed() => {}
            }
        }

        tracing::debug!("Maintenance task stopped");
    })
}

async fn run_once(state: &SharedState) {
    match db::password_reset_tokens::purge_expired(&state.pool, RESET_TOKEN_GRACE_HOURS).await {
        Ok(0) => {}
        Ok(n) => tracing::info!("Purged {n} expired password reset tokens"),
        Err(e) => tracing::error!("Reset token purge failed: {e}"),
    }

    match db::refresh_tokens::purge_expired(&state.pool).await {
        Ok(0) => {}
        Ok(n) => tracing::info!("Purged {n} expired refresh tokens"),
        Err(e) => tracing::error!("Refresh token purge failed: {e}"),
    }

    let max_age = Duration::from_secs(24 * 60 * 60);
    state.login_limiter.cleanup(max_age);
    state.reset_limiter.cleanup(max_age);
}
