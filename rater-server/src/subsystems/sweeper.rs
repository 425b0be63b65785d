use std::sync::Arc;

use chrono::Utc;
use rater_core::config::ConversationConfig;
use tokio::sync::broadcast;

use crate::conversation::SessionRegistry;

/// Periodically drop sessions abandoned mid-dialogue.
pub async fn run_session_sweeper(
    sessions: Arc<SessionRegistry>,
    config: ConversationConfig,
    mut shutdown: broadcast::Receiver<()>,
) {
    let interval = tokio::time::Duration::from_secs(config.sweep_interval_seconds.max(1));
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let ttl = session_ttl(&config);

    tracing::info!(
        "Session sweeper started (interval: {}s, ttl: {}min)",
        config.sweep_interval_seconds,
        config.session_ttl_minutes
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let expired = sessions.expire_idle(Utc::now(), ttl).await;
                if expired > 0 {
                    tracing::info!(expired, "Expired idle sessions");
                } else {
                    tracing::debug!("Session sweep found nothing to expire");
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("Session sweeper shutting down");
                break;
            }
        }
    }
}

/// Largest TTL `chrono::Duration` can represent, in minutes.
const MAX_TTL_MINUTES: u64 = (i64::MAX / 60_000) as u64;

fn session_ttl(config: &ConversationConfig) -> chrono::Duration {
    chrono::Duration::minutes(config.session_ttl_minutes.min(MAX_TTL_MINUTES) as i64)
}
