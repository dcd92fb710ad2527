//! # Telegram Bot API Binding
//!
//! The decision logic never talks HTTP itself. It goes through two narrow traits:
//!
//! - `Messenger`: send a text (optionally HTML with one inline button), send a stored
//!   document by `file_id`, acknowledge a button press.
//! - `MembershipChecker`: ask for a user's status in the gating channel.
//!
//! `client::BotApi` implements both against the real API. Tests swap in recorders.

pub mod client;
pub mod error;
pub mod types;

use async_trait::async_trait;
use common::model::membership::MembershipStatus;
pub use error::{BotApiError, MembershipFailure};
use types::OutgoingMessage;

#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(&self, message: OutgoingMessage) -> Result<(), BotApiError>;

    async fn send_document(&self, chat_id: i64, file_id: &str) -> Result<(), BotApiError>;

    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<(), BotApiError>;
}

#[async_trait]
pub trait MembershipChecker: Send + Sync {
    async fn check_membership(
        &self,
        channel: &str,
        user_id: i64,
    ) -> Result<MembershipStatus, MembershipFailure>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory stand-ins for the Bot API.

    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Sent {
        Message(OutgoingMessage),
        Document { chat_id: i64, file_id: String },
        CallbackAnswer { callback_id: String, text: String },
    }

    /// Records every outbound call. Documents whose id is in `broken_files` fail,
    /// and so does every message to `failing_chat`.
    #[derive(Default)]
    pub struct RecordingMessenger {
        pub sent: Mutex<Vec<Sent>>,
        pub broken_files: Vec<String>,
        pub failing_chat: Option<i64>,
    }

    impl RecordingMessenger {
        pub fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }

        pub fn messages(&self) -> Vec<OutgoingMessage> {
            self.sent()
                .into_iter()
                .filter_map(|s| match s {
                    Sent::Message(m) => Some(m),
                    _ => None,
                })
                .collect()
        }

        pub fn texts(&self) -> Vec<String> {
            self.messages().into_iter().map(|m| m.text).collect()
        }

        pub fn documents(&self) -> Vec<(i64, String)> {
            self.sent()
                .into_iter()
                .filter_map(|s| match s {
                    Sent::Document { chat_id, file_id } => Some((chat_id, file_id)),
                    _ => None,
                })
                .collect()
        }
    }

    fn rejected(method: &'static str, description: &str) -> BotApiError {
        BotApiError::Rejected {
            method,
            code: 400,
            description: description.to_string(),
        }
    }

    #[async_trait]
    impl Messenger for RecordingMessenger {
        async fn send_message(&self, message: OutgoingMessage) -> Result<(), BotApiError> {
            if self.failing_chat == Some(message.chat_id) {
                return Err(rejected("sendMessage", "Bad Request: chat not found"));
            }
            self.sent.lock().unwrap().push(Sent::Message(message));
            Ok(())
        }

        async fn send_document(&self, chat_id: i64, file_id: &str) -> Result<(), BotApiError> {
            if self.broken_files.iter().any(|f| f == file_id) {
                return Err(rejected("sendDocument", "Bad Request: wrong file identifier"));
            }
            self.sent.lock().unwrap().push(Sent::Document {
                chat_id,
                file_id: file_id.to_string(),
            });
            Ok(())
        }

        async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<(), BotApiError> {
            self.sent.lock().unwrap().push(Sent::CallbackAnswer {
                callback_id: callback_id.to_string(),
                text: text.to_string(),
            });
            Ok(())
        }
    }

    /// Answers from a fixed table; unknown users get `UserNotFound`.
    #[derive(Default)]
    pub struct FixedMembership {
        pub answers: HashMap<i64, Result<MembershipStatus, MembershipFailure>>,
        pub calls: Mutex<Vec<(String, i64)>>,
    }

    impl FixedMembership {
        pub fn with(user_id: i64, answer: Result<MembershipStatus, MembershipFailure>) -> Self {
            let mut answers = HashMap::new();
            answers.insert(user_id, answer);
            FixedMembership {
                answers,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MembershipChecker for FixedMembership {
        async fn check_membership(
            &self,
            channel: &str,
            user_id: i64,
        ) -> Result<MembershipStatus, MembershipFailure> {
            self.calls.lock().unwrap().push((channel.to_string(), user_id));
            self.answers
                .get(&user_id)
                .cloned()
                .unwrap_or(Err(MembershipFailure::UserNotFound))
        }
    }
}
