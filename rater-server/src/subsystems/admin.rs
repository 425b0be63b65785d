//! Operator-only batch operations: sample upload and data export.
//!
//! Purge is a dialogue (it needs confirmation) and lives in the conversation
//! state machine; the router only gates who may start it.

use std::sync::Arc;

use rater_core::{RaterError, ReviewerId, SampleStore};
use rater_ingest::{export_file_name, parse_samples, render_table};

use crate::conversation::messages;
use crate::scope::{self, Notice};
use crate::transport::{ChatId, Keyboard, TextFormat, Transport};

/// Authorization predicate for operator commands.
#[derive(Debug, Clone, Copy)]
pub struct AdminGate {
    admin_id: ReviewerId,
}

impl AdminGate {
    pub fn new(admin_id: ReviewerId) -> Self {
        Self { admin_id }
    }

    pub fn is_admin(&self, caller: ReviewerId) -> bool {
        caller == self.admin_id
    }

    pub fn check(&self, caller: ReviewerId) -> Result<(), RaterError> {
        if self.is_admin(caller) {
            Ok(())
        } else {
            Err(RaterError::Unauthorized(caller))
        }
    }

    /// `Some(())` when the caller may run `operation`. Refusals are silent to
    /// the caller and only logged.
    pub fn guard(&self, caller: ReviewerId, operation: &'static str) -> Option<()> {
        match self.check(caller) {
            Ok(()) => Some(()),
            Err(e) => {
                tracing::debug!(operation, error = %e, "Ignoring admin command");
                None
            }
        }
    }
}

#[derive(Clone)]
pub struct AdminOps {
    store: Arc<dyn SampleStore>,
    transport: Arc<dyn Transport>,
}

impl AdminOps {
    pub fn new(store: Arc<dyn SampleStore>, transport: Arc<dyn Transport>) -> Self {
        Self { store, transport }
    }

    /// Download an uploaded `.tsv` file and insert every record in one batch.
    ///
    /// Returns the number of samples stored, `None` if anything failed (the
    /// chat has then already been told).
    pub async fn ingest_upload(&self, chat_id: ChatId, file_id: &str) -> Option<usize> {
        self.reply(chat_id, messages::UPLOAD_STARTED).await;
        let notice = Some(Notice::new(self.transport.as_ref(), chat_id));

        let bytes = scope::settle(
            "download_upload",
            self.transport.download_document(file_id).await,
            notice,
        )
        .await?;
        let samples = scope::settle("parse_upload", parse_samples(&bytes), notice).await?;
        let ids = scope::settle("add_samples", self.store.add_samples(samples).await, notice).await?;

        tracing::info!(count = ids.len(), "Ingested uploaded samples");
        self.reply(chat_id, &messages::upload_done(ids.len())).await;
        Some(ids.len())
    }

    /// Send every table as `<table>.csv`. Returns how many documents were sent.
    pub async fn export(&self, chat_id: ChatId) -> usize {
        let notice = Some(Notice::new(self.transport.as_ref(), chat_id));
        let Some(tables) = scope::settle("export_all", self.store.export_all().await, notice).await
        else {
            return 0;
        };

        let mut sent = 0;
        for table in &tables {
            let Some(bytes) = scope::settle("render_table", render_table(table), notice).await else {
                return sent;
            };
            let file_name = export_file_name(&table.name);
            let delivered = scope::settle(
                "send_export",
                self.transport.send_document(chat_id, &file_name, bytes).await,
                None,
            )
            .await;
            if delivered.is_some() {
                tracing::info!(table = %table.name, rows = table.rows.len(), "Exported table");
                sent += 1;
            }
        }
        sent
    }

    async fn reply(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self
            .transport
            .send_text(chat_id, text, TextFormat::Plain, &Keyboard::Unchanged)
            .await
        {
            tracing::error!(chat_id, error = %e, "Failed to send reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::recording::{RecordingTransport, Sent};
    use rater_core::{Interaction, MemorySampleStore, NewSample, Rating};

    const ADMIN: ReviewerId = 42;

    fn ops() -> (Arc<MemorySampleStore>, Arc<RecordingTransport>, AdminOps) {
        let store = Arc::new(MemorySampleStore::new());
        let transport = Arc::new(RecordingTransport::new());
        let ops = AdminOps::new(store.clone(), transport.clone());
        (store, transport, ops)
    }

    #[test]
    fn test_gate_admits_only_the_operator() {
        let gate = AdminGate::new(ADMIN);
        assert!(gate.is_admin(ADMIN));
        assert!(gate.guard(ADMIN, "export_all").is_some());
        assert!(gate.guard(7, "export_all").is_none());
        assert!(matches!(gate.check(7), Err(RaterError::Unauthorized(7))));
    }

    #[tokio::test]
    async fn test_ingest_reports_count() {
        let (store, transport, ops) = ops();
        transport
            .add_file("f1", b"Class\tText\nA\thello\nB\tworld\nA\tagain\n")
            .await;

        assert_eq!(ops.ingest_upload(ADMIN, "f1").await, Some(3));
        assert_eq!(store.counts().await.unwrap().samples, 3);
        assert_eq!(
            transport.texts().await,
            vec![messages::UPLOAD_STARTED.to_string(), messages::upload_done(3)]
        );
    }

    #[tokio::test]
    async fn test_malformed_upload_stores_nothing() {
        let (store, transport, ops) = ops();
        transport
            .add_file("f1", b"Class\tText\nA\thello\nB\tworld\textra\n")
            .await;

        assert_eq!(ops.ingest_upload(ADMIN, "f1").await, None);
        assert_eq!(store.counts().await.unwrap().samples, 0);
        assert_eq!(
            transport.texts().await,
            vec![messages::UPLOAD_STARTED.to_string(), messages::FAILURE_REPLY.to_string()]
        );
    }

    #[tokio::test]
    async fn test_oversized_label_rolls_back_whole_batch() {
        let (store, transport, ops) = ops();
        let long_label = "x".repeat(40);
        let upload = format!("Class\tText\nA\thello\n{}\tworld\n", long_label);
        transport.add_file("f1", upload.as_bytes()).await;

        assert_eq!(ops.ingest_upload(ADMIN, "f1").await, None);
        assert_eq!(store.counts().await.unwrap().samples, 0);
        assert_eq!(
            transport.texts().await.last().map(String::as_str),
            Some(messages::FAILURE_REPLY)
        );
    }

    #[tokio::test]
    async fn test_export_sends_one_document_per_table() {
        let (store, transport, ops) = ops();
        let id = store.add_sample(NewSample::new("A", "hello")).await.unwrap();
        let r = |v| Rating::new(v).unwrap();
        store
            .record_interaction(Interaction::new(5, id, r(3), r(4)))
            .await
            .unwrap();

        assert_eq!(ops.export(ADMIN).await, 2);
        assert_eq!(
            transport.sent().await,
            vec![
                Sent::Document {
                    chat_id: ADMIN,
                    file_name: "item.csv".to_string(),
                    bytes: b"label,content\nA,hello\n".to_vec(),
                },
                Sent::Document {
                    chat_id: ADMIN,
                    file_name: "interaction.csv".to_string(),
                    bytes: b"item_id,relevance,quality\n1,3,4\n".to_vec(),
                },
            ]
        );
    }
}
