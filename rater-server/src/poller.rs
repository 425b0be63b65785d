//! Long-polling loop.
//!
//! Updates are handed to a `Dispatcher` and polling resumes right away. Each
//! message runs on its own task chained behind the same reviewer's previous
//! message, so one reviewer's messages are handled in arrival order and never
//! overlap, while a slow reviewer holds nobody else back.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use rater_core::ReviewerId;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::router::{InboundMessage, Router};
use crate::telegram::{TelegramClient, Update};

/// Pause after a failed poll before trying again.
const POLL_ERROR_PAUSE: Duration = Duration::from_secs(5);

pub struct Dispatcher {
    router: Router,
    bot_username: Option<String>,
    /// Task handling each reviewer's most recent message.
    tails: HashMap<ReviewerId, JoinHandle<()>>,
}

impl Dispatcher {
    /// `bot_username` filters out commands addressed to other bots.
    pub fn new(router: Router, bot_username: Option<String>) -> Self {
        Self {
            router,
            bot_username,
            tails: HashMap::new(),
        }
    }

    /// Queue one message behind the reviewer's earlier ones.
    pub fn submit(&mut self, message: InboundMessage) {
        let reviewer_id = message.reviewer_id;
        let previous = self.tails.remove(&reviewer_id);
        let router = self.router.clone();

        let handle = tokio::spawn(async move {
            if let Some(previous) = previous {
                if let Err(e) = previous.await {
                    tracing::error!(reviewer_id, error = %e, "Message handler failed");
                }
            }
            router.dispatch(message).await;
        });
        self.tails.insert(reviewer_id, handle);
    }

    /// Queue a batch of updates without waiting for them. Returns how many
    /// messages were queued.
    pub fn dispatch_batch(&mut self, updates: Vec<Update>) -> usize {
        self.tails.retain(|_, handle| !handle.is_finished());

        let mut queued = 0;
        for update in &updates {
            match InboundMessage::from_update(update, self.bot_username.as_deref()) {
                Some(message) => {
                    self.submit(message);
                    queued += 1;
                }
                None => tracing::debug!(update_id = update.update_id, "Skipping update"),
            }
        }
        queued
    }

    /// Reviewers with a message still being handled.
    pub fn in_flight(&self) -> usize {
        self.tails
            .values()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Wait until every queued message has been handled.
    pub async fn drain(&mut self) {
        for result in join_all(self.tails.drain().map(|(_, handle)| handle)).await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Message handler failed");
            }
        }
    }
}

pub async fn run_polling(
    client: Arc<TelegramClient>,
    mut dispatcher: Dispatcher,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut offset: Option<i64> = None;
    tracing::info!("Polling for updates");

    loop {
        tokio::select! {
            result = client.get_updates(offset) => match result {
                Ok(updates) => {
                    if let Some(last) = updates.iter().map(|u| u.update_id).max() {
                        offset = Some(last + 1);
                    }
                    let queued = dispatcher.dispatch_batch(updates);
                    if queued > 0 {
                        tracing::debug!(
                            queued,
                            in_flight = dispatcher.in_flight(),
                            "Dispatched update batch"
                        );
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "getUpdates failed, retrying in {}s",
                        POLL_ERROR_PAUSE.as_secs()
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(POLL_ERROR_PAUSE) => {}
                        _ = shutdown.recv() => break,
                    }
                }
            },
            _ = shutdown.recv() => break,
        }
    }

    tracing::info!(in_flight = dispatcher.in_flight(), "Poller shutting down");
    dispatcher.drain().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{messages, ConversationEngine, ConversationState, SessionRegistry};
    use crate::subsystems::admin::{AdminGate, AdminOps};
    use crate::transport::recording::{RecordingTransport, Sent};
    use rater_core::{MemorySampleStore, NewSample, SampleStore};

    const FILLER: &str = "https://example.com/kitten.jpg";

    fn update(update_id: i64, reviewer_id: ReviewerId, text: &str) -> Update {
        serde_json::from_value(serde_json::json!({
            "update_id": update_id,
            "message": {
                "message_id": update_id,
                "from": { "id": reviewer_id, "first_name": "R" },
                "chat": { "id": reviewer_id },
                "text": text
            }
        }))
        .unwrap()
    }

    async fn dispatcher(
        transport: Arc<RecordingTransport>,
    ) -> (Arc<MemorySampleStore>, Dispatcher) {
        let store = Arc::new(MemorySampleStore::new());
        store
            .add_samples(vec![NewSample::new("A", "hello"), NewSample::new("B", "world")])
            .await
            .unwrap();
        let engine = ConversationEngine::new(
            store.clone(),
            transport.clone(),
            Arc::new(SessionRegistry::new()),
            FILLER,
        );
        let admin = AdminOps::new(store.clone(), transport.clone());
        let router = Router::new(engine, admin, AdminGate::new(1), transport, FILLER);
        (store, Dispatcher::new(router, Some("rater_bot".to_string())))
    }

    #[tokio::test]
    async fn test_batch_keeps_per_reviewer_order() {
        let transport = Arc::new(RecordingTransport::new());
        let (store, mut dispatcher) = dispatcher(transport).await;

        let updates = vec![
            update(1, 7, "/get_text"),
            update(2, 8, "/get_text"),
            update(3, 7, "Evaluate"),
            update(4, 7, "3"),
            update(5, 7, "4"),
            update(6, 8, "hello?"),
            update(7, 8, "/get_text@other_bot"),
        ];
        assert_eq!(dispatcher.dispatch_batch(updates), 6);
        dispatcher.drain().await;
        assert_eq!(dispatcher.in_flight(), 0);

        let sessions = dispatcher.router.engine().sessions();
        assert_eq!(sessions.state(7).await, ConversationState::AwaitingContinue);
        assert!(matches!(
            sessions.state(8).await,
            ConversationState::AwaitingReady { .. }
        ));
        assert_eq!(store.counts().await.unwrap().interactions, 1);
    }

    #[tokio::test]
    async fn test_slow_reviewer_does_not_delay_others() {
        let transport = Arc::new(RecordingTransport::slow_photos(Duration::from_secs(5)));
        let (_, mut dispatcher) = dispatcher(transport.clone()).await;

        dispatcher.dispatch_batch(vec![update(1, 7, "/kitten"), update(2, 7, "/help")]);
        dispatcher.dispatch_batch(vec![update(3, 8, "/start")]);

        let replied = tokio::time::timeout(Duration::from_secs(1), async {
            while transport.texts().await.is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(replied.is_ok(), "reviewer 8 waited for reviewer 7");

        let sent = transport.sent().await;
        assert_eq!(sent.len(), 1);
        assert!(matches!(
            &sent[0],
            Sent::Text { chat_id: 8, text, .. } if *text == messages::greeting("R")
        ));
        // Reviewer 7's /help stays queued behind the slow photo.
        assert!(dispatcher.in_flight() >= 1);
    }

    #[tokio::test]
    async fn test_same_reviewer_messages_never_overlap() {
        let transport = Arc::new(RecordingTransport::slow_photos(Duration::from_millis(50)));
        let (_, mut dispatcher) = dispatcher(transport.clone()).await;

        dispatcher.dispatch_batch(vec![update(1, 7, "/kitten")]);
        dispatcher.dispatch_batch(vec![update(2, 7, "/help")]);
        dispatcher.drain().await;

        let sent = transport.sent().await;
        assert!(matches!(sent[0], Sent::Photo { chat_id: 7, .. }));
        assert!(matches!(
            &sent[1],
            Sent::Text { chat_id: 7, text, .. } if text == messages::HELP
        ));
    }
}
