mod config;
mod delivery;
mod dispatcher;
mod guide_store;
mod services;
mod telegram;

use crate::config::{Settings, WebhookSettings};
use crate::delivery::{DeliveryDecider, MembershipGate};
use crate::dispatcher::Dispatcher;
use crate::guide_store::GuideStore;
use crate::services::webhook::{WebhookState, WEBHOOK_ROUTE};
use crate::telegram::client::BotApi;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info, warn};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(
        Env::default().default_filter_or("info,reqwest=warn,hyper=warn,hyper_util=warn"),
    );

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let api = match BotApi::new(&settings.api_url, &settings.bot_token) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            error!("Could not create Bot API client: {}", e);
            std::process::exit(1);
        }
    };

    let store = GuideStore::open(settings.guide_config_file.clone());
    info!(
        "Guide config {} loaded, guide set: {}",
        store.path().display(),
        store.current().await.is_set()
    );

    let mut decider = DeliveryDecider::new(store, settings.admins.clone(), settings.locale)
        .with_topic(settings.topic.clone());
    match (&settings.channel, settings.verify_membership) {
        (Some(channel), true) => {
            info!("Verifying subscription to {}", channel);
            decider = decider.with_membership_gate(MembershipGate {
                channel: channel.clone(),
                checker: api.clone(),
            });
        }
        _ => info!("Subscription verification is disabled, every click receives the guide"),
    }

    let dispatcher = Dispatcher::new(Arc::new(decider), api.clone());

    match settings.webhook {
        Some(webhook) => serve_webhook(api, dispatcher, webhook).await,
        None => {
            if let Err(e) = api.delete_webhook().await {
                warn!("Could not remove a previously registered webhook: {}", e);
            }
            tokio::select! {
                _ = services::polling::run(api.as_ref(), dispatcher) => {}
                _ = tokio::signal::ctrl_c() => info!("Shutting down"),
            }
            Ok(())
        }
    }
}

async fn serve_webhook(
    api: Arc<BotApi>,
    dispatcher: Dispatcher,
    webhook: WebhookSettings,
) -> std::io::Result<()> {
    let url = format!(
        "{}{}",
        webhook.public_url.trim_end_matches('/'),
        WEBHOOK_ROUTE
    );
    if let Err(e) = api.set_webhook(&url, &webhook.secret).await {
        error!("Could not register webhook {}: {}", url, e);
        std::process::exit(1);
    }
    info!("Webhook registered at {}", url);

    let state = web::Data::new(WebhookState {
        secret: webhook.secret,
        dispatcher,
    });

    info!("Server running at http://{}:{}", webhook.host, webhook.port);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(services::webhook::configure_routes())
    })
    .bind((webhook.host.as_str(), webhook.port))?
    .run()
    .await
}
