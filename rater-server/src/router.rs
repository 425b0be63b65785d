//! Inbound message dispatch.
//!
//! Turns a Bot API update into an `InboundMessage`, then routes it: stateless
//! commands are answered directly, operator commands pass through the
//! `AdminGate`, and everything else is an event for the conversation engine.

use std::sync::Arc;

use rater_core::ReviewerId;
use rater_ingest::is_upload_file_name;

use crate::conversation::{messages, ConversationEngine, Event};
use crate::subsystems::admin::{AdminGate, AdminOps};
use crate::telegram::Update;
use crate::transport::{ChatId, Keyboard, TextFormat, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    GetText,
    Cancel,
    Kitten,
    DropAll,
    ExportAll,
}

impl Command {
    /// Parse `/name`, `/name@botname` or `/name args`. Unknown names are `None`,
    /// and so are commands addressed to a bot other than `bot_username`.
    /// Without a known username any `@botname` suffix is accepted.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let word = word.strip_prefix('/')?;
        let (name, addressee) = match word.split_once('@') {
            Some((name, addressee)) => (name, Some(addressee)),
            None => (word, None),
        };
        if let (Some(addressee), Some(own)) = (addressee, bot_username) {
            if !addressee.eq_ignore_ascii_case(own) {
                return None;
            }
        }
        match name {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            "get_text" => Some(Self::GetText),
            "cancel" => Some(Self::Cancel),
            "kitten" => Some(Self::Kitten),
            "drop_all" => Some(Self::DropAll),
            "export_all" => Some(Self::ExportAll),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Command(Command),
    Text(String),
    Document {
        file_id: String,
        file_name: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub reviewer_id: ReviewerId,
    pub chat_id: ChatId,
    pub full_name: String,
    pub inbound: Inbound,
}

impl InboundMessage {
    /// `None` for updates the bot does not act on (no sender, stickers,
    /// unknown commands, commands for other bots).
    pub fn from_update(update: &Update, bot_username: Option<&str>) -> Option<Self> {
        let message = update.message.as_ref()?;
        let from = message.from.as_ref()?;

        let inbound = if let Some(document) = &message.document {
            Inbound::Document {
                file_id: document.file_id.clone(),
                file_name: document.file_name.clone(),
            }
        } else {
            let text = message.text.as_ref()?;
            if text.trim_start().starts_with('/') {
                Inbound::Command(Command::parse(text, bot_username)?)
            } else {
                Inbound::Text(text.clone())
            }
        };

        Some(Self {
            reviewer_id: from.id,
            chat_id: message.chat.id,
            full_name: from.full_name(),
            inbound,
        })
    }
}

#[derive(Clone)]
pub struct Router {
    engine: ConversationEngine,
    admin: AdminOps,
    gate: AdminGate,
    transport: Arc<dyn Transport>,
    filler_image_url: String,
}

impl Router {
    pub fn new(
        engine: ConversationEngine,
        admin: AdminOps,
        gate: AdminGate,
        transport: Arc<dyn Transport>,
        filler_image_url: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            admin,
            gate,
            transport,
            filler_image_url: filler_image_url.into(),
        }
    }

    pub fn engine(&self) -> &ConversationEngine {
        &self.engine
    }

    pub async fn dispatch(&self, message: InboundMessage) {
        let InboundMessage {
            reviewer_id,
            chat_id,
            full_name,
            inbound,
        } = message;

        match inbound {
            Inbound::Command(Command::Start) => {
                self.reply(chat_id, &messages::greeting(&full_name), TextFormat::Html)
                    .await;
            }
            Inbound::Command(Command::Help) => {
                self.reply(chat_id, messages::HELP, TextFormat::Plain).await;
            }
            Inbound::Command(Command::Kitten) => {
                if let Err(e) = self
                    .transport
                    .send_photo_from_url(chat_id, &self.filler_image_url, None)
                    .await
                {
                    tracing::warn!(reviewer_id, error = %e, "Failed to send filler image");
                }
            }
            Inbound::Command(Command::GetText) => {
                self.engine
                    .handle(reviewer_id, chat_id, Event::RequestSample)
                    .await;
            }
            Inbound::Command(Command::Cancel) => {
                self.engine.handle(reviewer_id, chat_id, Event::Cancel).await;
            }
            Inbound::Command(Command::DropAll) => {
                if self.gate.guard(reviewer_id, "drop_all").is_some() {
                    self.engine
                        .handle(reviewer_id, chat_id, Event::RequestPurge)
                        .await;
                }
            }
            Inbound::Command(Command::ExportAll) => {
                if self.gate.guard(reviewer_id, "export_all").is_some() {
                    self.admin.export(chat_id).await;
                }
            }
            Inbound::Text(text) => {
                self.engine
                    .handle(reviewer_id, chat_id, Event::Text(text))
                    .await;
            }
            Inbound::Document { file_id, file_name } => {
                let is_upload = file_name.as_deref().is_some_and(is_upload_file_name);
                if !is_upload {
                    tracing::debug!(reviewer_id, ?file_name, "Ignoring non-upload document");
                    return;
                }
                if self.gate.guard(reviewer_id, "upload").is_some() {
                    self.admin.ingest_upload(chat_id, &file_id).await;
                }
            }
        }
    }

    async fn reply(&self, chat_id: ChatId, text: &str, format: TextFormat) {
        if let Err(e) = self
            .transport
            .send_text(chat_id, text, format, &Keyboard::Unchanged)
            .await
        {
            tracing::error!(chat_id, error = %e, "Failed to send reply");
        }
    }
}
