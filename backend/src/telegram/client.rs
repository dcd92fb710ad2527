//! `reqwest` based Bot API client.
//!
//! Every method is a JSON `POST` to `{api_url}/bot{token}/{method}`. Telegram
//! reports failures inside the body (`ok: false`) with a non-2xx status, so the
//! envelope is decoded regardless of the HTTP status.

use super::error::{BotApiError, MembershipFailure};
use super::types::{ApiResponse, ChatMember, OutgoingMessage, Update};
use super::{MembershipChecker, Messenger};
use async_trait::async_trait;
use common::model::membership::MembershipStatus;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

/// Long polling wait passed to `getUpdates`, in seconds.
pub const POLL_TIMEOUT_SECS: u64 = 30;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(POLL_TIMEOUT_SECS + 30);

#[derive(Debug, Clone)]
pub struct BotApi {
    client: Client,
    base_url: String,
}

impl BotApi {
    pub fn new(api_url: &str, token: &str) -> Result<Self, BotApiError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(BotApi {
            client,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        body: Value,
    ) -> Result<T, BotApiError> {
        debug!("Calling Bot API method {}", method);
        let response: ApiResponse<T> = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            return Err(BotApiError::Rejected {
                method,
                code: response.error_code.unwrap_or_default(),
                description: response.description.unwrap_or_default(),
            });
        }
        response.result.ok_or(BotApiError::EmptyResult(method))
    }

    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, BotApiError> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": POLL_TIMEOUT_SECS,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }

    pub async fn set_webhook(&self, url: &str, secret_token: &str) -> Result<(), BotApiError> {
        let _: bool = self
            .call(
                "setWebhook",
                json!({
                    "url": url,
                    "secret_token": secret_token,
                    "allowed_updates": ["message", "callback_query"],
                }),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_webhook(&self) -> Result<(), BotApiError> {
        let _: bool = self.call("deleteWebhook", json!({})).await?;
        Ok(())
    }
}

fn message_body(message: &OutgoingMessage) -> Value {
    let mut body = json!({
        "chat_id": message.chat_id,
        "text": message.text,
    });
    if let Some(mode) = message.parse_mode {
        body["parse_mode"] = json!(mode);
    }
    if let Some(button) = &message.button {
        body["reply_markup"] = json!({
            "inline_keyboard": [[{
                "text": button.text,
                "callback_data": button.callback_data,
            }]]
        });
    }
    body
}

#[async_trait]
impl Messenger for BotApi {
    async fn send_message(&self, message: OutgoingMessage) -> Result<(), BotApiError> {
        let _: Value = self.call("sendMessage", message_body(&message)).await?;
        Ok(())
    }

    async fn send_document(&self, chat_id: i64, file_id: &str) -> Result<(), BotApiError> {
        let _: Value = self
            .call(
                "sendDocument",
                json!({ "chat_id": chat_id, "document": file_id }),
            )
            .await?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<(), BotApiError> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                json!({ "callback_query_id": callback_id, "text": text }),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl MembershipChecker for BotApi {
    async fn check_membership(
        &self,
        channel: &str,
        user_id: i64,
    ) -> Result<MembershipStatus, MembershipFailure> {
        let member: ChatMember = self
            .call(
                "getChatMember",
                json!({ "chat_id": channel, "user_id": user_id }),
            )
            .await?;
        Ok(MembershipStatus::from_api(&member.status))
    }
}
