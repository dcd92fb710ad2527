use super::WebhookState;
use crate::telegram::types::Update;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use log::{debug, warn};
use thiserror::Error;

pub const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("secret token header missing or wrong")]
    BadSecret,
    #[error("malformed update body: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

impl ResponseError for WebhookError {
    fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::BadSecret => StatusCode::FORBIDDEN,
            WebhookError::MalformedBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    // Bodies stay generic; details only go to the log.
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            WebhookError::BadSecret => "Forbidden",
            WebhookError::MalformedBody(_) => "Bad Request",
        };
        HttpResponse::build(self.status_code()).body(body)
    }
}

/// Actix handler for `POST /telegram/webhook`.
pub async fn process(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<WebhookState>,
) -> Result<HttpResponse, WebhookError> {
    let token = req
        .headers()
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok());
    if token != Some(state.secret.as_str()) {
        warn!(
            "Rejected webhook call from {:?}: bad secret token",
            req.peer_addr()
        );
        return Err(WebhookError::BadSecret);
    }

    let update: Update = serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejected webhook call: {}", e);
        WebhookError::from(e)
    })?;
    debug!("Webhook update {}", update.update_id);

    state.dispatcher.dispatch(update).await;
    Ok(HttpResponse::Ok().finish())
}
