//! HTTP handlers for the fake server.
//!
//! Each module covers one area of the webmail surface. `router` wires
//! them up behind the session middleware.

mod login;

use super::server::{SharedState, require_session};
use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(mailbox::home))
        .route("/login", get(login::login_page).post(login::login_submit))
        .route("/language", get(login::language))
        .route(
            "/compose",
            get(compose::new_message_id).post(compose::submit),
        )
        .route("/mailbox/{name}", get(mailbox::show))
        .route("/new-mailbox", post(mailbox::create))
        .route("/message/{mailbox}/delete", post(message::delete))
        .route("/message/{mailbox}/flag", post(message::flag))
        .route("/message/{mailbox}/move", post(message::move_messages))
        .route("/message/{mailbox}/{uid}", get(message::show))
        .route("/message/{mailbox}/{uid}/reply", post(compose::submit))
        .route(
            "/message/{mailbox}/{uid}/forward",
            get(message::forward_listing).post(compose::submit),
        )
        .route(
            "/user-settings",
            get(settings::load).post(settings::save),
        )
        .layer(from_fn_with_state(state.clone(), require_session))
        .with_state(state)
}

/// Collect every `uids` field as a number, skipping malformed values.
fn uids(fields: &[(String, String)]) -> Vec<u32> {
    fields
        .iter()
        .filter(|(k, _)| k == "uids")
        .filter_map(|(_, v)| v.parse().ok())
        .collect()
}

/// First value recorded under `key`.
fn field<'a>(fields: &'a [(String, String)], key: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}
