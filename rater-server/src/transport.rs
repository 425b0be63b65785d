//! Outbound chat transport.
//!
//! `Transport` is the only way the conversation engine and the admin
//! subsystem talk to reviewers. `TelegramClient` implements it over the Bot
//! API; tests use `RecordingTransport`.

use async_trait::async_trait;
use thiserror::Error;

pub type ChatId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    Html,
}

/// Reply keyboard attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Leave whatever keyboard the reviewer currently has.
    Unchanged,
    Remove,
    Buttons {
        rows: Vec<Vec<String>>,
        one_time: bool,
    },
}

impl Keyboard {
    pub fn single_row(buttons: &[&str], one_time: bool) -> Self {
        Self::Buttons {
            rows: vec![buttons.iter().map(|b| b.to_string()).collect()],
            one_time,
        }
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bot API error ({code}): {description}")]
    Api { code: u16, description: String },

    #[error("Bot API returned no result for {0}")]
    MissingResult(&'static str),
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        format: TextFormat,
        keyboard: &Keyboard,
    ) -> Result<(), TransportError>;

    /// Fetch an image from `url` and send it as a photo.
    async fn send_photo_from_url(
        &self,
        chat_id: ChatId,
        url: &str,
        caption: Option<&str>,
    ) -> Result<(), TransportError>;

    async fn send_document(
        &self,
        chat_id: ChatId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), TransportError>;

    /// Download a file the reviewer attached to a message.
    async fn download_document(&self, file_id: &str) -> Result<Vec<u8>, TransportError>;
}
