use thiserror::Error;

/// Failure talking to the Bot API.
#[derive(Debug, Error)]
pub enum BotApiError {
    /// Request never produced a usable response (network, TLS, timeout, bad JSON).
    #[error("bot api transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Telegram answered with `ok: false`.
    #[error("bot api rejected {method}: {description} (code {code})")]
    Rejected {
        method: &'static str,
        code: i32,
        description: String,
    },

    /// `ok: true` but no `result` field.
    #[error("bot api returned no result for {0}")]
    EmptyResult(&'static str),
}

/// Why a membership lookup could not produce a status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MembershipFailure {
    /// The user is unknown to the channel. Same outcome as not being subscribed.
    #[error("user not found in channel")]
    UserNotFound,
    /// The configured channel does not exist or is misspelled.
    #[error("channel not found")]
    ChatNotFound,
    /// The bot is not an admin of the channel and cannot see its members.
    #[error("bot cannot read channel members: {0}")]
    BotLacksAccess(String),
    #[error("membership check failed: {0}")]
    Other(String),
}

impl MembershipFailure {
    /// Maps a Bot API error description onto a failure class.
    pub fn classify(code: i32, description: &str) -> Self {
        let lower = description.to_ascii_lowercase();
        if lower.contains("user not found") || lower.contains("participant_id_invalid") {
            MembershipFailure::UserNotFound
        } else if lower.contains("chat not found") {
            MembershipFailure::ChatNotFound
        } else if code == 403
            || lower.contains("not a member")
            || lower.contains("inaccessible")
            || lower.contains("not enough rights")
            || lower.contains("administrator")
        {
            MembershipFailure::BotLacksAccess(description.to_string())
        } else {
            MembershipFailure::Other(description.to_string())
        }
    }
}

impl From<BotApiError> for MembershipFailure {
    fn from(err: BotApiError) -> Self {
        match err {
            BotApiError::Rejected {
                code, description, ..
            } => MembershipFailure::classify(code, &description),
            other => MembershipFailure::Other(other.to_string()),
        }
    }
}
