use super::{DeliveryDecider, MembershipGate};
use crate::telegram::types::OutgoingMessage;
use crate::telegram::{BotApiError, MembershipFailure, Messenger};
use common::model::guide::Guide;
use common::model::membership::MembershipStatus;
use log::{error, info};

/// A user pressed the verification button.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    pub callback_id: String,
    pub chat_id: i64,
    pub user_id: i64,
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Membership check said no. The guide was not revealed.
    NotSubscribed,
    /// Membership could not be checked because the deployment is misconfigured.
    Misconfigured,
    /// No guide is configured.
    Unavailable,
    FileSent,
    /// Telegram refused the stored `file_id`.
    FileFailed,
    LinkSent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subscription {
    Granted,
    Denied,
    Broken,
}

fn classify(result: Result<MembershipStatus, MembershipFailure>) -> Subscription {
    match result {
        Ok(status) if status.is_subscribed() => Subscription::Granted,
        Ok(_) | Err(MembershipFailure::UserNotFound) => Subscription::Denied,
        Err(MembershipFailure::ChatNotFound)
        | Err(MembershipFailure::BotLacksAccess(_))
        | Err(MembershipFailure::Other(_)) => Subscription::Broken,
    }
}

impl DeliveryDecider {
    pub async fn on_verification_requested(
        &self,
        out: &dyn Messenger,
        req: &VerificationRequest,
    ) -> Result<DeliveryOutcome, BotApiError> {
        info!(
            "Verification requested by user {} ({})",
            req.user_id,
            req.username.as_deref().unwrap_or("-")
        );
        out.answer_callback(&req.callback_id, self.catalog.checking)
            .await?;

        if let Some(gate) = &self.gate {
            match self.check(gate, req.user_id).await {
                Subscription::Granted => {}
                Subscription::Denied => {
                    info!("User {} is not subscribed to {}", req.user_id, gate.channel);
                    out.send_message(OutgoingMessage::html(
                        req.chat_id,
                        self.catalog.denial(&gate.channel),
                    ))
                    .await?;
                    return Ok(DeliveryOutcome::NotSubscribed);
                }
                Subscription::Broken => {
                    out.send_message(OutgoingMessage::plain(
                        req.chat_id,
                        self.catalog.check_failed,
                    ))
                    .await?;
                    return Ok(DeliveryOutcome::Misconfigured);
                }
            }
        }

        self.deliver(out, req).await
    }

    async fn check(&self, gate: &MembershipGate, user_id: i64) -> Subscription {
        let result = gate.checker.check_membership(&gate.channel, user_id).await;
        if let Err(failure) = &result {
            match failure {
                MembershipFailure::UserNotFound => {}
                MembershipFailure::ChatNotFound | MembershipFailure::BotLacksAccess(_) => error!(
                    "Membership check for {} is misconfigured: {}. Is the bot an admin of the channel?",
                    gate.channel, failure
                ),
                MembershipFailure::Other(_) => {
                    error!("Membership check for user {} failed: {}", user_id, failure)
                }
            }
        }
        classify(result)
    }

    async fn deliver(
        &self,
        out: &dyn Messenger,
        req: &VerificationRequest,
    ) -> Result<DeliveryOutcome, BotApiError> {
        match self.store.current().await {
            Guide::Unset => {
                info!("No guide has been set yet.");
                out.send_message(OutgoingMessage::plain(req.chat_id, self.catalog.unavailable))
                    .await?;
                Ok(DeliveryOutcome::Unavailable)
            }
            Guide::File { file_id } => {
                out.send_message(OutgoingMessage::plain(req.chat_id, self.catalog.thanks))
                    .await?;
                match out.send_document(req.chat_id, &file_id).await {
                    Ok(()) => Ok(DeliveryOutcome::FileSent),
                    Err(e) => {
                        error!("Error sending document to user {}: {}", req.user_id, e);
                        out.send_message(OutgoingMessage::plain(
                            req.chat_id,
                            self.catalog.delivery_failed,
                        ))
                        .await?;
                        Ok(DeliveryOutcome::FileFailed)
                    }
                }
            }
            Guide::Url { link } => {
                out.send_message(OutgoingMessage::plain(req.chat_id, self.catalog.thanks))
                    .await?;
                out.send_message(OutgoingMessage::html(req.chat_id, self.catalog.link(&link)))
                    .await?;
                Ok(DeliveryOutcome::LinkSent)
            }
        }
    }
}
