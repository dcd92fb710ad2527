//! # Webhook Service Module
//!
//! Push delivery of Telegram updates. Telegram `POST`s each update as JSON to the
//! URL registered with `setWebhook`, carrying the shared secret in the
//! `X-Telegram-Bot-Api-Secret-Token` header.
//!
//! ## Registered Routes:
//!
//! *   **`POST /telegram/webhook`**:
//!     - **Handler**: `receive::process`
//!     - **Responses**: `403` when the secret header is missing or wrong, `400` when the
//!       body is not an update, `200` once the update has been dispatched.

mod receive;

use crate::dispatcher::Dispatcher;
use actix_web::web::{post, scope};
use actix_web::Scope;

/// The base path for the webhook endpoint.
const API_PATH: &str = "/telegram";

/// Full path to append to the public URL when registering the webhook.
pub const WEBHOOK_ROUTE: &str = "/telegram/webhook";

/// Shared state for the webhook handler, registered as `web::Data` in `main.rs`.
#[derive(Clone)]
pub struct WebhookState {
    pub secret: String,
    pub dispatcher: Dispatcher,
}

/// Configures and returns the Actix `Scope` for the webhook route.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/webhook", post().to(receive::process))
}
