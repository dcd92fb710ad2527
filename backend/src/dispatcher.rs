//! Turns raw Telegram updates into decider events.
//!
//! This is the outermost boundary for update handling: an error escaping a handler
//! is logged, the user who triggered it gets a generic apology, and every admin gets
//! the full diagnostic split into Telegram-sized messages. Nothing here can take the
//! process down.

use crate::delivery::{
    Attachment, DeliveryDecider, GuidePayload, SetGuideRequest, VerificationRequest,
    VERIFY_CALLBACK,
};
use crate::telegram::types::{CallbackQuery, Document, Message, OutgoingMessage, Update};
use crate::telegram::{BotApiError, Messenger};
use futures_util::future::join_all;
use log::{debug, error, warn};
use std::sync::Arc;

/// Telegram rejects text messages longer than this many characters.
pub const MESSAGE_LIMIT: usize = 4096;

#[derive(Clone)]
pub struct Dispatcher {
    decider: Arc<DeliveryDecider>,
    messenger: Arc<dyn Messenger>,
}

impl Dispatcher {
    pub fn new(decider: Arc<DeliveryDecider>, messenger: Arc<dyn Messenger>) -> Self {
        Dispatcher { decider, messenger }
    }

    pub async fn dispatch(&self, update: Update) {
        if let Err(e) = self.route(&update).await {
            error!("Error while handling update {}: {}", update.update_id, e);
            self.report(&update, &e).await;
        }
    }

    async fn route(&self, update: &Update) -> Result<(), BotApiError> {
        let out = self.messenger.as_ref();

        if let Some(query) = &update.callback_query {
            return self.on_callback(query).await;
        }

        let Some(message) = &update.message else {
            debug!("Ignoring update {} without message", update.update_id);
            return Ok(());
        };
        let Some(from) = &message.from else {
            debug!("Ignoring message {} without sender", message.message_id);
            return Ok(());
        };
        let command = message
            .text
            .as_deref()
            .or(message.caption.as_deref())
            .and_then(parse_command);

        match command {
            Some(("start", _)) => {
                self.decider
                    .on_start(out, message.chat.id, from.id, from.username.as_deref())
                    .await
            }
            Some(("setguide", arg)) => {
                let request = SetGuideRequest {
                    chat_id: message.chat.id,
                    requester_id: from.id,
                    payload: guide_payload(message, arg),
                };
                self.decider.on_set_guide_requested(out, request).await?;
                Ok(())
            }
            _ => {
                debug!("Ignoring message {}", message.message_id);
                Ok(())
            }
        }
    }

    async fn on_callback(&self, query: &CallbackQuery) -> Result<(), BotApiError> {
        let out = self.messenger.as_ref();
        match query.data.as_deref() {
            Some(VERIFY_CALLBACK) => {
                let request = VerificationRequest {
                    callback_id: query.id.clone(),
                    chat_id: query
                        .message
                        .as_ref()
                        .map(|m| m.chat.id)
                        .unwrap_or(query.from.id),
                    user_id: query.from.id,
                    username: query.from.username.clone(),
                };
                self.decider.on_verification_requested(out, &request).await?;
                Ok(())
            }
            other => self.decider.on_unknown_callback(out, &query.id, other).await,
        }
    }

    async fn report(&self, update: &Update, err: &BotApiError) {
        let catalog = self.decider.catalog();
        if let Some(chat_id) = reply_chat(update) {
            if let Err(e) = self
                .messenger
                .send_message(OutgoingMessage::plain(chat_id, catalog.unexpected_error))
                .await
            {
                warn!("Could not tell chat {} about the failure: {}", chat_id, e);
            }
        }

        let update_json = serde_json::to_string_pretty(update).unwrap_or_default();
        let diagnostic = format!(
            "⚠️ Error while handling update {}:\n{}\n\nupdate = {}",
            update.update_id, err, update_json
        );
        let chunks = chunk_text(&diagnostic, MESSAGE_LIMIT);

        let admins = self.decider.admins().chat_ids();
        join_all(admins.into_iter().map(|admin| {
            let chunks = &chunks;
            async move {
                for chunk in chunks {
                    if let Err(e) = self
                        .messenger
                        .send_message(OutgoingMessage::plain(admin, chunk.clone()))
                        .await
                    {
                        warn!("Could not forward diagnostic to admin {}: {}", admin, e);
                        break;
                    }
                }
            }
        }))
        .await;
    }
}

/// Splits `/name@bot arg ...` into `("name", Some("arg"))`.
fn parse_command(text: &str) -> Option<(&str, Option<&str>)> {
    let mut words = text.split_whitespace();
    let head = words.next()?.strip_prefix('/')?;
    let name = head.split('@').next().unwrap_or(head);
    Some((name, words.next()))
}

fn attachment(document: &Document) -> Attachment {
    Attachment {
        file_id: document.file_id.clone(),
        file_name: document.file_name.clone(),
        mime_type: document.mime_type.clone(),
    }
}

fn guide_payload(message: &Message, arg: Option<&str>) -> GuidePayload {
    if let Some(document) = &message.document {
        return GuidePayload::Attachment(attachment(document));
    }
    if let Some(reply) = &message.reply_to_message {
        return match &reply.document {
            Some(document) => GuidePayload::Attachment(attachment(document)),
            None => GuidePayload::NotADocument,
        };
    }
    match arg {
        Some(arg) => GuidePayload::Argument(arg.to_string()),
        None => GuidePayload::Missing,
    }
}

fn reply_chat(update: &Update) -> Option<i64> {
    if let Some(query) = &update.callback_query {
        return Some(
            query
                .message
                .as_ref()
                .map(|m| m.chat.id)
                .unwrap_or(query.from.id),
        );
    }
    update.message.as_ref().map(|m| m.chat.id)
}

/// Splits `text` into pieces of at most `limit` characters, on char boundaries.
pub fn chunk_text(text: &str, limit: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(limit.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::test_support::*;
    use crate::telegram::testing::{RecordingMessenger, Sent};
    use common::model::guide::Guide;
    use tempfile::TempDir;

    fn dispatcher(guide: Guide, messenger: Arc<RecordingMessenger>) -> (TempDir, Dispatcher) {
        let Fixture { dir, decider } = open_decider(guide);
        (dir, Dispatcher::new(Arc::new(decider), messenger))
    }

    fn stored(dir: &TempDir) -> Guide {
        crate::guide_store::file::load(&dir.path().join("guide_config.json"))
    }

    fn update(json: serde_json::Value) -> Update {
        serde_json::from_value(json).unwrap()
    }

    fn text_message(from: i64, text: &str) -> Update {
        update(serde_json::json!({
            "update_id": 1,
            "message": {
                "message_id": 3,
                "from": {"id": from, "first_name": "X"},
                "chat": {"id": from},
                "text": text
            }
        }))
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("/start"), Some(("start", None)));
        assert_eq!(
            parse_command("/setguide@GuideBot https://x.y  extra"),
            Some(("setguide", Some("https://x.y")))
        );
        assert_eq!(parse_command("hello"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn chunks_respect_limit_and_char_boundaries() {
        let text = "é".repeat(10_000);
        let chunks = chunk_text(&text, MESSAGE_LIMIT);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= MESSAGE_LIMIT));
        assert_eq!(chunks.concat(), text);
        assert!(chunk_text("", MESSAGE_LIMIT).is_empty());
    }

    #[actix_web::test]
    async fn start_command_sends_welcome() {
        let out = Arc::new(RecordingMessenger::default());
        let (_fx, dispatcher) = dispatcher(Guide::Unset, out.clone());
        dispatcher.dispatch(text_message(USER, "/start")).await;
        let messages = out.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].button.is_some());
    }

    #[actix_web::test]
    async fn setguide_with_link_argument() {
        let out = Arc::new(RecordingMessenger::default());
        let (dir, dispatcher) = dispatcher(Guide::Unset, out.clone());
        dispatcher
            .dispatch(text_message(ADMIN, "/setguide https://example.com/g"))
            .await;
        assert_eq!(
            stored(&dir),
            Guide::Url {
                link: "https://example.com/g".to_string()
            }
        );
    }

    #[actix_web::test]
    async fn setguide_reply_to_pdf() {
        let out = Arc::new(RecordingMessenger::default());
        let (dir, dispatcher) = dispatcher(Guide::Unset, out.clone());
        dispatcher
            .dispatch(update(serde_json::json!({
                "update_id": 2,
                "message": {
                    "message_id": 4,
                    "from": {"id": ADMIN, "first_name": "A"},
                    "chat": {"id": ADMIN},
                    "text": "/setguide",
                    "reply_to_message": {
                        "message_id": 3,
                        "chat": {"id": ADMIN},
                        "document": {"file_id": "PDF1", "file_name": "g.pdf"}
                    }
                }
            })))
            .await;
        assert_eq!(
            stored(&dir),
            Guide::File {
                file_id: "PDF1".to_string()
            }
        );
    }

    #[test]
    fn reply_without_document_is_not_a_document() {
        let message: Message = serde_json::from_value(serde_json::json!({
            "message_id": 4,
            "chat": {"id": 1},
            "text": "/setguide https://ignored.example.com",
            "reply_to_message": {"message_id": 3, "chat": {"id": 1}, "text": "hi"}
        }))
        .unwrap();
        assert_eq!(
            guide_payload(&message, Some("https://ignored.example.com")),
            GuidePayload::NotADocument
        );
    }

    #[actix_web::test]
    async fn verification_callback_delivers_guide() {
        let out = Arc::new(RecordingMessenger::default());
        let (_fx, dispatcher) = dispatcher(
            Guide::File {
                file_id: "F1".to_string(),
            },
            out.clone(),
        );
        dispatcher
            .dispatch(update(serde_json::json!({
                "update_id": 5,
                "callback_query": {
                    "id": "cb",
                    "from": {"id": USER, "first_name": "U"},
                    "message": {"message_id": 1, "chat": {"id": USER}},
                    "data": "check_subscription"
                }
            })))
            .await;
        assert_eq!(out.documents(), vec![(USER, "F1".to_string())]);
    }

    #[actix_web::test]
    async fn handler_error_is_reported_to_admins() {
        let out = Arc::new(RecordingMessenger {
            failing_chat: Some(USER),
            ..Default::default()
        });
        let (_fx, dispatcher) = dispatcher(Guide::Unset, out.clone());

        dispatcher.dispatch(text_message(USER, "/start")).await;

        let sent = out.sent();
        assert!(!sent.is_empty());
        for s in &sent {
            match s {
                Sent::Message(m) => assert_eq!(m.chat_id, ADMIN),
                other => panic!("unexpected {:?}", other),
            }
        }
        assert!(out.texts()[0].starts_with("⚠️ Error while handling update 1"));
    }
}
