//! Telegram Bot API client.
//!
//! Only the handful of methods the bot needs: `getMe`, `getUpdates` long
//! polling, `sendMessage`, `sendPhoto`, `sendDocument` and `getFile` plus the
//! file download. Every call goes to `{base_url}/bot{token}/{method}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::transport::{ChatId, Keyboard, TextFormat, Transport, TransportError};

/// File name used for the filler photo upload.
const FILLER_FILE_NAME: &str = "filler.jpg";

/// Slack on top of the long-poll timeout before the HTTP request gives up.
const REQUEST_TIMEOUT_SLACK_SECS: u64 = 10;

// ============================================================================
// Bot API types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
    pub document: Option<Document>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub file_id: String,
    pub file_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct File {
    file_path: Option<String>,
}

/// Envelope around every Bot API reply.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<u16>,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: ChatId,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct GetFileRequest<'a> {
    file_id: &'a str,
}

/// Bot API `reply_markup` for a keyboard, `None` to leave the current one.
fn reply_markup(keyboard: &Keyboard) -> Option<serde_json::Value> {
    match keyboard {
        Keyboard::Unchanged => None,
        Keyboard::Remove => Some(serde_json::json!({ "remove_keyboard": true })),
        Keyboard::Buttons { rows, one_time } => {
            let keyboard: Vec<Vec<serde_json::Value>> = rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|text| serde_json::json!({ "text": text }))
                        .collect()
                })
                .collect();
            Some(serde_json::json!({
                "keyboard": keyboard,
                "resize_keyboard": true,
                "one_time_keyboard": one_time,
            }))
        }
    }
}

// ============================================================================
// Client
// ============================================================================

pub struct TelegramClient {
    client: Client,
    base_url: String,
    token: String,
    poll_timeout_seconds: u64,
}

impl TelegramClient {
    /// `base_url` is `https://api.telegram.org` unless a local Bot API server
    /// (or a test double) is used.
    pub fn with_base_url(
        token: String,
        base_url: String,
        poll_timeout_seconds: u64,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(
                poll_timeout_seconds + REQUEST_TIMEOUT_SLACK_SECS,
            ))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            poll_timeout_seconds,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.base_url, self.token, file_path)
    }

    /// The bot's own account. Also proves the token is valid.
    pub async fn get_me(&self) -> Result<User, TransportError> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Long-poll for updates after `offset`. Returns an empty list on timeout.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, TransportError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: self.poll_timeout_seconds,
            allowed_updates: &["message"],
        };
        self.call("getUpdates", &request).await
    }

    async fn call<P: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: &P,
    ) -> Result<T, TransportError> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(params)
            .send()
            .await?;
        Self::read_result(method, response).await
    }

    async fn call_multipart<T: DeserializeOwned>(
        &self,
        method: &'static str,
        form: Form,
    ) -> Result<T, TransportError> {
        let response = self
            .client
            .post(self.method_url(method))
            .multipart(form)
            .send()
            .await?;
        Self::read_result(method, response).await
    }

    async fn read_result<T: DeserializeOwned>(
        method: &'static str,
        response: Response,
    ) -> Result<T, TransportError> {
        let status = response.status();
        let body = response.text().await?;

        let parsed = match serde_json::from_str::<ApiResponse<T>>(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::error!(method, code = status.as_u16(), "Unreadable Bot API reply");
                return Err(TransportError::Api {
                    code: status.as_u16(),
                    description: if status.is_success() {
                        e.to_string()
                    } else {
                        body
                    },
                });
            }
        };

        if !parsed.ok || !status.is_success() {
            let code = parsed.error_code.unwrap_or(status.as_u16());
            let description = parsed.description.unwrap_or_default();
            tracing::error!(method, code, description = %description, "Bot API error");
            return Err(TransportError::Api { code, description });
        }

        parsed.result.ok_or(TransportError::MissingResult(method))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl Transport for TelegramClient {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        format: TextFormat,
        keyboard: &Keyboard,
    ) -> Result<(), TransportError> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: match format {
                TextFormat::Plain => None,
                TextFormat::Html => Some("HTML"),
            },
            reply_markup: reply_markup(keyboard),
        };
        let _: serde_json::Value = self.call("sendMessage", &request).await?;
        Ok(())
    }

    async fn send_photo_from_url(
        &self,
        chat_id: ChatId,
        url: &str,
        caption: Option<&str>,
    ) -> Result<(), TransportError> {
        let bytes = self.fetch_bytes(url).await?;
        let mut form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("photo", Part::bytes(bytes).file_name(FILLER_FILE_NAME));
        if let Some(caption) = caption {
            form = form.text("caption", caption.to_string());
        }
        let _: serde_json::Value = self.call_multipart("sendPhoto", form).await?;
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: ChatId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), TransportError> {
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", Part::bytes(bytes).file_name(file_name.to_string()));
        let _: serde_json::Value = self.call_multipart("sendDocument", form).await?;
        Ok(())
    }

    async fn download_document(&self, file_id: &str) -> Result<Vec<u8>, TransportError> {
        let file: File = self.call("getFile", &GetFileRequest { file_id }).await?;
        let path = file
            .file_path
            .ok_or(TransportError::MissingResult("getFile"))?;
        self.fetch_bytes(&self.file_url(&path)).await
    }
}
