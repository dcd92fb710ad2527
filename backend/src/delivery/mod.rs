//! # Guide Delivery
//!
//! `DeliveryDecider` owns every decision the bot makes:
//!
//! - `verify`: a user pressed the button. Optionally check channel membership, then
//!   send the configured guide (document or link) or explain why not.
//! - `set_guide`: an admin sent `/setguide`. Validate the payload and replace the
//!   stored guide.
//!
//! Outbound effects go through `telegram::Messenger`; the decider itself holds no
//! transport state and performs no retries.

pub mod messages;
mod set_guide;
mod verify;

pub use set_guide::{Attachment, GuidePayload, SetGuideRequest};
pub use verify::VerificationRequest;

use crate::guide_store::GuideStore;
use crate::telegram::types::{CallbackButton, OutgoingMessage};
use crate::telegram::{BotApiError, MembershipChecker, Messenger};
use common::model::admin::AdminIdentity;
use log::{info, warn};
use messages::{Catalog, Locale};
use std::sync::Arc;

/// Callback payload carried by the welcome button.
pub const VERIFY_CALLBACK: &str = "check_subscription";

/// Channel whose members may receive the guide, and who to ask.
#[derive(Clone)]
pub struct MembershipGate {
    pub channel: String,
    pub checker: Arc<dyn MembershipChecker>,
}

pub struct DeliveryDecider {
    store: GuideStore,
    admins: AdminIdentity,
    catalog: &'static Catalog,
    topic: Option<String>,
    gate: Option<MembershipGate>,
}

impl DeliveryDecider {
    pub fn new(store: GuideStore, admins: AdminIdentity, locale: Locale) -> Self {
        DeliveryDecider {
            store,
            admins,
            catalog: locale.catalog(),
            topic: None,
            gate: None,
        }
    }

    pub fn with_topic(mut self, topic: Option<String>) -> Self {
        self.topic = topic;
        self
    }

    /// Enables membership verification against `gate.channel`.
    pub fn with_membership_gate(mut self, gate: MembershipGate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    pub fn admins(&self) -> &AdminIdentity {
        &self.admins
    }

    #[cfg(test)]
    pub fn store(&self) -> &GuideStore {
        &self.store
    }

    /// Sends the welcome text with the verification button.
    pub async fn on_start(
        &self,
        out: &dyn Messenger,
        chat_id: i64,
        user_id: i64,
        username: Option<&str>,
    ) -> Result<(), BotApiError> {
        info!(
            "User {} ({}) started the bot.",
            user_id,
            username.unwrap_or("-")
        );
        let text = self.catalog.welcome(
            self.topic.as_deref(),
            self.gate.as_ref().map(|g| g.channel.as_str()),
        );
        let button = CallbackButton {
            text: self.catalog.verify_button.to_string(),
            callback_data: VERIFY_CALLBACK.to_string(),
        };
        out.send_message(OutgoingMessage::html(chat_id, text).with_button(button))
            .await
    }

    /// Button press carrying data this bot never produced.
    pub async fn on_unknown_callback(
        &self,
        out: &dyn Messenger,
        callback_id: &str,
        data: Option<&str>,
    ) -> Result<(), BotApiError> {
        warn!("Received unknown callback data: {:?}", data);
        out.answer_callback(callback_id, self.catalog.unknown_action)
            .await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::telegram::testing::FixedMembership;
    use common::model::guide::Guide;
    use tempfile::TempDir;

    pub const ADMIN: i64 = 1;
    pub const USER: i64 = 77;

    pub struct Fixture {
        pub dir: TempDir,
        pub decider: DeliveryDecider,
    }

    impl Fixture {
        pub fn store_path(&self) -> std::path::PathBuf {
            self.dir.path().join("guide_config.json")
        }
    }

    fn decider_with(guide: Guide, gate: Option<MembershipGate>) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide_config.json");
        crate::guide_store::file::save(&path, &guide).unwrap();
        let mut decider =
            DeliveryDecider::new(GuideStore::open(&path), AdminIdentity::parse("1"), Locale::En);
        if let Some(gate) = gate {
            decider = decider.with_membership_gate(gate);
        }
        Fixture { dir, decider }
    }

    /// Decider that hands the guide to every click.
    pub fn open_decider(guide: Guide) -> Fixture {
        decider_with(guide, None)
    }

    /// Decider that verifies membership of `@guides` through `checker`.
    pub fn gated_decider(guide: Guide, checker: Arc<FixedMembership>) -> Fixture {
        decider_with(
            guide,
            Some(MembershipGate {
                channel: "@guides".to_string(),
                checker,
            }),
        )
    }
}
