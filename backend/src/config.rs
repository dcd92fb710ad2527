//! # Process Configuration
//!
//! Everything the bot needs is read once from the environment at startup. A `.env`
//! file next to the binary is loaded first (see `main`), so local runs do not need
//! exported variables.
//!
//! Only the bot token is mandatory. Missing optional values switch features off:
//! no channel means no membership verification, no webhook URL means long polling.

use crate::delivery::messages::Locale;
use common::model::admin::AdminIdentity;
use log::warn;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

const DEFAULT_GUIDE_CONFIG_FILE: &str = "guide_config.json";
const DEFAULT_API_URL: &str = "https://api.telegram.org";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Webhook delivery settings. Present only when `WEBHOOK_URL` is set.
#[derive(Debug, Clone)]
pub struct WebhookSettings {
    pub public_url: String,
    pub secret: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bot_token: String,
    pub api_url: String,
    pub admins: AdminIdentity,
    pub channel: Option<String>,
    pub topic: Option<String>,
    pub verify_membership: bool,
    pub locale: Locale,
    pub guide_config_file: PathBuf,
    pub webhook: Option<WebhookSettings>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from any name -> value source. Blank values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bot_token = get("TELEGRAM_BOT_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let admins = AdminIdentity::parse(&get("ADMIN_USER_IDS").unwrap_or_default());
        if admins.is_empty() {
            warn!("ADMIN_USER_IDS is empty, nobody will be able to use /setguide");
        }

        let channel = get("TARGET_CHANNEL_USERNAME");
        let verify_flag = match get("VERIFY_SUBSCRIPTION") {
            Some(value) => parse_bool("VERIFY_SUBSCRIPTION", &value)?,
            None => true,
        };
        if verify_flag && channel.is_none() {
            warn!("TARGET_CHANNEL_USERNAME is not set, subscription verification is disabled");
        }

        let locale = match get("BOT_LANGUAGE") {
            Some(code) => Locale::from_code(&code).unwrap_or_else(|| {
                warn!("Unsupported BOT_LANGUAGE {:?}, falling back to English", code);
                Locale::En
            }),
            None => Locale::En,
        };

        let webhook = match get("WEBHOOK_URL") {
            Some(public_url) => {
                let port = match get("PORT") {
                    Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                        name: "PORT",
                        value,
                    })?,
                    None => DEFAULT_PORT,
                };
                Some(WebhookSettings {
                    public_url,
                    secret: get("WEBHOOK_SECRET").unwrap_or_else(|| Uuid::new_v4().simple().to_string()),
                    host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                    port,
                })
            }
            None => None,
        };

        Ok(Settings {
            bot_token,
            api_url: get("TELEGRAM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            admins,
            verify_membership: verify_flag && channel.is_some(),
            channel,
            topic: get("GUIDE_TOPIC"),
            locale,
            guide_config_file: get("GUIDE_CONFIG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_GUIDE_CONFIG_FILE)),
            webhook,
        })
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        }),
    }
}
