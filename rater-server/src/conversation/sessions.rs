//! Per-reviewer session registry.
//!
//! Only reviewers in the middle of a dialogue have an entry; returning to
//! `Idle` removes it. Entries untouched for longer than the TTL are dropped
//! by `expire_idle`, which the sweeper calls periodically.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rater_core::ReviewerId;
use tokio::sync::RwLock;

use super::state::ConversationState;

#[derive(Debug, Clone)]
pub struct Session {
    pub state: ConversationState,
    pub last_active: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<ReviewerId, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state, `Idle` when the reviewer has no session.
    pub async fn state(&self, reviewer_id: ReviewerId) -> ConversationState {
        self.sessions
            .read()
            .await
            .get(&reviewer_id)
            .map(|s| s.state.clone())
            .unwrap_or_default()
    }

    /// Store the state reached after handling a message.
    pub async fn update(&self, reviewer_id: ReviewerId, state: ConversationState, now: DateTime<Utc>) {
        let mut sessions = self.sessions.write().await;
        if state.is_idle() {
            sessions.remove(&reviewer_id);
        } else {
            sessions.insert(
                reviewer_id,
                Session {
                    state,
                    last_active: now,
                },
            );
        }
    }

    /// Drop sessions idle for longer than `ttl`. Returns how many were dropped.
    pub async fn expire_idle(&self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| now - s.last_active <= ttl);
        before - sessions.len()
    }

    pub async fn active(&self) -> usize {
        self.sessions.read().await.len()
    }
}
