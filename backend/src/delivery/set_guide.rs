use super::DeliveryDecider;
use crate::telegram::types::OutgoingMessage;
use crate::telegram::{BotApiError, Messenger};
use common::model::guide::Guide;
use log::{error, info};

const PDF_MIME: &str = "application/pdf";

/// A document offered as the new guide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

impl Attachment {
    /// Declared `application/pdf`, or a file name that maps to it.
    pub fn is_pdf(&self) -> bool {
        let declared = self
            .mime_type
            .as_deref()
            .and_then(|m| m.split(';').next())
            .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(PDF_MIME));
        let by_name = self
            .file_name
            .as_deref()
            .and_then(|name| mime_guess::from_path(name.to_ascii_lowercase()).first())
            .is_some_and(|m| m.essence_str() == PDF_MIME);
        declared || by_name
    }
}

/// What came with the `/setguide` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuidePayload {
    /// A document attached to, or replied to by, the command.
    Attachment(Attachment),
    /// The command replied to a message without a document.
    NotADocument,
    /// First command argument.
    Argument(String),
    Missing,
}

#[derive(Debug, Clone)]
pub struct SetGuideRequest {
    pub chat_id: i64,
    pub requester_id: i64,
    pub payload: GuidePayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetGuideOutcome {
    /// Requester is not an admin. Nothing changed.
    Denied,
    InvalidAttachment,
    InvalidLink,
    Usage,
    Updated(Guide),
    /// Valid request, but the store could not be written. The old guide stays.
    PersistFailed,
}

fn is_link(arg: &str) -> bool {
    arg.starts_with("http://") || arg.starts_with("https://")
}

impl DeliveryDecider {
    pub async fn on_set_guide_requested(
        &self,
        out: &dyn Messenger,
        req: SetGuideRequest,
    ) -> Result<SetGuideOutcome, BotApiError> {
        if !self.admins.is_admin(req.requester_id) {
            info!("User {} tried /setguide without admin rights", req.requester_id);
            self.reply(out, req.chat_id, self.catalog.admin_only).await?;
            return Ok(SetGuideOutcome::Denied);
        }

        let (guide, confirmation) = match req.payload {
            GuidePayload::Attachment(attachment) if attachment.is_pdf() => (
                Guide::File {
                    file_id: attachment.file_id,
                },
                self.catalog.file_updated,
            ),
            GuidePayload::Attachment(_) | GuidePayload::NotADocument => {
                self.reply(out, req.chat_id, self.catalog.not_a_pdf).await?;
                return Ok(SetGuideOutcome::InvalidAttachment);
            }
            GuidePayload::Argument(link) if is_link(&link) => {
                (Guide::Url { link }, self.catalog.link_updated)
            }
            GuidePayload::Argument(_) => {
                self.reply(out, req.chat_id, self.catalog.invalid_link).await?;
                return Ok(SetGuideOutcome::InvalidLink);
            }
            GuidePayload::Missing => {
                self.reply(out, req.chat_id, self.catalog.usage).await?;
                return Ok(SetGuideOutcome::Usage);
            }
        };

        if let Err(e) = self.store.replace(guide.clone()).await {
            error!("Error saving guide config to {}: {}", self.store.path().display(), e);
            self.reply(out, req.chat_id, self.catalog.save_failed).await?;
            return Ok(SetGuideOutcome::PersistFailed);
        }

        match &guide {
            Guide::File { file_id } => {
                info!("Admin {} set guide to file_id: {}", req.requester_id, file_id)
            }
            Guide::Url { link } => info!("Admin {} set guide to URL: {}", req.requester_id, link),
            Guide::Unset => {}
        }
        self.reply(out, req.chat_id, confirmation).await?;
        Ok(SetGuideOutcome::Updated(guide))
    }

    async fn reply(&self, out: &dyn Messenger, chat_id: i64, text: &str) -> Result<(), BotApiError> {
        out.send_message(OutgoingMessage::plain(chat_id, text)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::test_support::*;
    use crate::delivery::verify::DeliveryOutcome;
    use crate::delivery::VerificationRequest;
    use crate::guide_store::file;
    use crate::telegram::testing::RecordingMessenger;
    use std::fs;

    fn pdf(file_id: &str) -> GuidePayload {
        GuidePayload::Attachment(Attachment {
            file_id: file_id.to_string(),
            file_name: Some("guide.pdf".to_string()),
            mime_type: Some("application/pdf".to_string()),
        })
    }

    fn request(requester_id: i64, payload: GuidePayload) -> SetGuideRequest {
        SetGuideRequest {
            chat_id: requester_id,
            requester_id,
            payload,
        }
    }

    #[test]
    fn pdf_detection() {
        let by_mime = Attachment {
            file_id: "a".into(),
            file_name: None,
            mime_type: Some("application/pdf".into()),
        };
        let by_name = Attachment {
            file_id: "b".into(),
            file_name: Some("Guide.PDF".into()),
            mime_type: Some("application/octet-stream".into()),
        };
        let neither = Attachment {
            file_id: "c".into(),
            file_name: Some("guide.docx".into()),
            mime_type: None,
        };
        assert!(by_mime.is_pdf());
        assert!(by_name.is_pdf());
        assert!(!neither.is_pdf());
    }

    #[actix_web::test]
    async fn non_admin_cannot_change_the_guide() {
        let original = Guide::Url {
            link: "https://old.example.com".to_string(),
        };
        let fx = open_decider(original.clone());
        let out = RecordingMessenger::default();

        let outcome = fx
            .decider
            .on_set_guide_requested(&out, request(USER, pdf("NEW")))
            .await
            .unwrap();

        assert_eq!(outcome, SetGuideOutcome::Denied);
        assert_eq!(file::load(&fx.store_path()), original);
        assert_eq!(fx.decider.store().current().await, original);

        let click = VerificationRequest {
            callback_id: "cb".to_string(),
            chat_id: USER,
            user_id: USER,
            username: None,
        };
        let outcome = fx.decider.on_verification_requested(&out, &click).await.unwrap();
        assert_eq!(outcome, DeliveryOutcome::LinkSent);
        assert!(out.texts().iter().any(|t| t.contains("https://old.example.com")));
    }

    #[actix_web::test]
    async fn invalid_payloads_leave_store_untouched() {
        let fx = open_decider(Guide::Unset);
        let out = RecordingMessenger::default();
        let before = fs::read(fx.store_path()).unwrap();

        let docx = GuidePayload::Attachment(Attachment {
            file_id: "D".to_string(),
            file_name: Some("guide.docx".to_string()),
            mime_type: Some("application/msword".to_string()),
        });
        let cases = [
            (docx, SetGuideOutcome::InvalidAttachment),
            (GuidePayload::NotADocument, SetGuideOutcome::InvalidAttachment),
            (
                GuidePayload::Argument("ftp://example.com".to_string()),
                SetGuideOutcome::InvalidLink,
            ),
            (
                GuidePayload::Argument("example.com".to_string()),
                SetGuideOutcome::InvalidLink,
            ),
            (GuidePayload::Missing, SetGuideOutcome::Usage),
        ];
        for (payload, expected) in cases {
            let outcome = fx
                .decider
                .on_set_guide_requested(&out, request(ADMIN, payload))
                .await
                .unwrap();
            assert_eq!(outcome, expected);
        }

        assert_eq!(fs::read(fx.store_path()).unwrap(), before);
        assert_eq!(fx.decider.store().current().await, Guide::Unset);
        assert_eq!(out.texts().len(), 5);
        assert!(out.texts()[4].starts_with("Usage:"));
    }

    #[actix_web::test]
    async fn admin_sets_link_then_file() {
        let fx = open_decider(Guide::Unset);
        let out = RecordingMessenger::default();

        let outcome = fx
            .decider
            .on_set_guide_requested(
                &out,
                request(ADMIN, GuidePayload::Argument("https://example.com/g".to_string())),
            )
            .await
            .unwrap();
        assert_eq!(
            outcome,
            SetGuideOutcome::Updated(Guide::Url {
                link: "https://example.com/g".to_string()
            })
        );

        let outcome = fx
            .decider
            .on_set_guide_requested(&out, request(ADMIN, pdf("F2")))
            .await
            .unwrap();
        let file_guide = Guide::File {
            file_id: "F2".to_string(),
        };
        assert_eq!(outcome, SetGuideOutcome::Updated(file_guide.clone()));

        assert_eq!(file::load(&fx.store_path()), file_guide);
        assert_eq!(fx.decider.store().current().await, file_guide);
        assert_eq!(
            out.texts(),
            vec![
                "✅ Guide link updated successfully. I will now send this link to verified subscribers.",
                "✅ Guide updated successfully. I will now send this PDF to verified subscribers.",
            ]
        );
    }

    #[actix_web::test]
    async fn new_guide_is_served_without_rereading_storage() {
        let fx = open_decider(Guide::Unset);
        let out = RecordingMessenger::default();
        fx.decider
            .on_set_guide_requested(&out, request(ADMIN, pdf("F3")))
            .await
            .unwrap();
        fs::remove_file(fx.store_path()).unwrap();

        let click = VerificationRequest {
            callback_id: "cb".to_string(),
            chat_id: USER,
            user_id: USER,
            username: None,
        };
        let outcome = fx.decider.on_verification_requested(&out, &click).await.unwrap();
        assert_eq!(outcome, DeliveryOutcome::FileSent);
        assert_eq!(out.documents(), vec![(USER, "F3".to_string())]);
    }

    #[actix_web::test]
    async fn save_failure_keeps_previous_guide() {
        let fx = open_decider(Guide::Unset);
        let out = RecordingMessenger::default();
        let path = fx.store_path();
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        let outcome = fx
            .decider
            .on_set_guide_requested(
                &out,
                request(ADMIN, GuidePayload::Argument("https://example.com".to_string())),
            )
            .await
            .unwrap();

        assert_eq!(outcome, SetGuideOutcome::PersistFailed);
        assert_eq!(fx.decider.store().current().await, Guide::Unset);
        assert!(out.texts()[0].contains("could not be saved"));
    }
}
