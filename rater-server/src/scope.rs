//! User-facing edge of a transactional scope.
//!
//! Stores already roll back on failure. This is where a failed operation is
//! logged with full detail and, when there is a chat to answer, turned into
//! the generic failure notice. Nothing here propagates the error further.

use std::fmt::Display;

use crate::conversation::messages;
use crate::transport::{ChatId, Keyboard, TextFormat, Transport};

/// Chat that should hear about a failure.
#[derive(Clone, Copy)]
pub struct Notice<'a> {
    pub transport: &'a dyn Transport,
    pub chat_id: ChatId,
}

impl<'a> Notice<'a> {
    pub fn new(transport: &'a dyn Transport, chat_id: ChatId) -> Self {
        Self { transport, chat_id }
    }

    pub async fn send_failure(&self) {
        if let Err(e) = self
            .transport
            .send_text(
                self.chat_id,
                messages::FAILURE_REPLY,
                TextFormat::Plain,
                &Keyboard::Remove,
            )
            .await
        {
            tracing::warn!(chat_id = self.chat_id, error = %e, "Failed to deliver failure notice");
        }
    }
}

/// Log a failed operation and notify the chat if one is given.
pub async fn settle<T, E: Display>(
    operation: &'static str,
    result: Result<T, E>,
    notice: Option<Notice<'_>>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(operation, error = %e, "Operation failed");
            if let Some(notice) = notice {
                notice.send_failure().await;
            }
            None
        }
    }
}
