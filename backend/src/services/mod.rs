//! Update transports. Both feed the same `Dispatcher`.
//!
//! - `webhook`: actix-web endpoint Telegram pushes updates to.
//! - `polling`: `getUpdates` loop for deployments without a public URL.

pub mod polling;
pub mod webhook;
