//! Thin Telegram Bot API client.
//!
//! Long polling via `getUpdates`, JSON posts for the send methods, and
//! multipart upload for documents. Only the handful of methods and
//! fields this bot touches are modeled.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Errors from the Bot API boundary.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("api rejected {method}: {description}")]
    Rejected { method: String, description: String },
}

/// Telegram Bot API client.
pub struct TelegramClient {
    token: Secret<String>,
    base_url: String,
    http: Client,
}

impl TelegramClient {
    pub fn new(token: Secret<String>) -> Self {
        // Request timeout must outlive the long-poll timeout.
        let http = Client::builder()
            .timeout(Duration::from_secs(45))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
            http,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.base_url,
            self.token.expose_secret(),
            method
        )
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: &impl Serialize,
    ) -> Result<T, TelegramError> {
        let response = self
            .http
            .post(self.method_url(method))
            .json(payload)
            .send()
            .await?;
        let body: ApiResponse<T> = response.json().await?;
        body.into_result(method)
    }

    /// Polls for updates, blocking server-side up to `timeout_secs`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            &GetUpdates {
                offset,
                timeout: timeout_secs,
                allowed_updates: &["message", "callback_query"],
            },
        )
        .await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<ReplyMarkup>,
    ) -> Result<Message, TelegramError> {
        self.call(
            "sendMessage",
            &SendMessage {
                chat_id,
                text,
                reply_markup,
            },
        )
        .await
    }

    /// Re-sends a photo the servers already hold, by file id.
    pub async fn send_photo(
        &self,
        chat_id: i64,
        file_id: &str,
        caption: &str,
        reply_markup: Option<ReplyMarkup>,
    ) -> Result<Message, TelegramError> {
        self.call(
            "sendPhoto",
            &SendPhoto {
                chat_id,
                photo: file_id,
                caption,
                reply_markup,
            },
        )
        .await
    }

    /// Uploads and sends a document.
    pub async fn send_document(
        &self,
        chat_id: i64,
        filename: &str,
        content: Vec<u8>,
        caption: &str,
    ) -> Result<Message, TelegramError> {
        let part = Part::bytes(content).file_name(filename.to_string());
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("document", part);

        let response = self
            .http
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await?;
        let body: ApiResponse<Message> = response.json().await?;
        body.into_result("sendDocument")
    }

    /// Acknowledges a callback query so the client stops its spinner.
    pub async fn answer_callback_query(&self, id: &str) -> Result<(), TelegramError> {
        let _: bool = self
            .call("answerCallbackQuery", &AnswerCallbackQuery { callback_query_id: id })
            .await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_result(self, method: &str) -> Result<T, TelegramError> {
        if self.ok {
            self.result.ok_or_else(|| TelegramError::Rejected {
                method: method.to_string(),
                description: "ok response without a result".to_string(),
            })
        } else {
            Err(TelegramError::Rejected {
                method: method.to_string(),
                description: self.description.unwrap_or_else(|| "no description".to_string()),
            })
        }
    }
}

#[derive(Serialize)]
struct GetUpdates<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<ReplyMarkup>,
}

#[derive(Serialize)]
struct SendPhoto<'a> {
    chat_id: i64,
    photo: &'a str,
    caption: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<ReplyMarkup>,
}

#[derive(Serialize)]
struct AnswerCallbackQuery<'a> {
    callback_query_id: &'a str,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Either keyboard flavor, sent as-is in `reply_markup`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    Inline(InlineKeyboardMarkup),
    Keyboard(ReplyKeyboardMarkup),
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl InlineKeyboardButton {
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: Some(data.into()),
            url: None,
        }
    }

    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: None,
            url: Some(url.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "is_false")]
    pub request_contact: bool,
}

impl KeyboardButton {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            request_contact: false,
        }
    }

    pub fn contact(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            request_contact: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
    pub contact: Option<Contact>,
    pub photo: Option<Vec<PhotoSize>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl User {
    /// Display name as the platform reports it.
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    pub phone_number: String,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub data: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_joins_first_and_last() {
        let user = User {
            id: 1,
            first_name: "Ali".to_string(),
            last_name: Some("Valiyev".to_string()),
            username: None,
        };
        assert_eq!(user.display_name(), "Ali Valiyev");
    }

    #[test]
    fn keyboard_button_omits_unset_contact_flag() {
        let json = serde_json::to_string(&KeyboardButton::plain("Help")).unwrap();
        assert_eq!(json, r#"{"text":"Help"}"#);

        let json = serde_json::to_string(&KeyboardButton::contact("Share phone")).unwrap();
        assert!(json.contains("\"request_contact\":true"));
    }

    #[test]
    fn update_with_callback_decodes() {
        let raw = r#"{
            "update_id": 10,
            "callback_query": {
                "id": "abc",
                "from": {"id": 99, "first_name": "Op"},
                "data": "approve:5"
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        let query = update.callback_query.unwrap();
        assert_eq!(query.from.id, 99);
        assert_eq!(query.data.as_deref(), Some("approve:5"));
    }

    #[test]
    fn error_response_surfaces_description() {
        let raw = r#"{"ok": false, "description": "Bad Request: chat not found"}"#;
        let body: ApiResponse<Message> = serde_json::from_str(raw).unwrap();
        let err = body.into_result("sendMessage").unwrap_err();
        assert!(err.to_string().contains("chat not found"));
    }
}
