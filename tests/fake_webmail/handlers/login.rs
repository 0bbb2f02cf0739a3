//! Login page and form submission.
//!
//! A correct username and password issues a fresh session token and
//! redirects to the inbox. Anything else redirects back to the login
//! page with `?error=1`, which is still the login page as far as the
//! client is concerned.
//!
//! `/language` is reachable without a session too. The first visit
//! stores a `lang` cookie and reloads the same page.

use crate::fake_webmail::server::{SharedState, has_session};
use axum::Form;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;

const LOGIN_FORM: &str = "<form method=\"post\" action=\"/login\">\
    <input name=\"username\"><input name=\"password\" type=\"password\">\
    </form>";

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// Show the login form, or skip straight to the inbox when the request
/// already carries the live session.
pub async fn login_page(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if has_session(&state.lock().unwrap(), &headers) {
        return Redirect::to("/mailbox/INBOX").into_response();
    }
    Html(LOGIN_FORM).into_response()
}

pub async fn login_submit(
    State(state): State<SharedState>,
    Form(form): Form<LoginForm>,
) -> Response {
    let mut state = state.lock().unwrap();
    if form.username != state.username || form.password != state.password {
        return Redirect::to("/login?error=1").into_response();
    }

    state.sessions_issued += 1;
    let token = format!("token-{}", state.sessions_issued);
    state.live_sessions.push(token.clone());

    (
        [(SET_COOKIE, format!("session={token}; Path=/; HttpOnly"))],
        Redirect::to("/mailbox/INBOX"),
    )
        .into_response()
}

pub async fn language(headers: HeaderMap) -> Response {
    let chosen = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .any(|pair| pair.trim().starts_with("lang="));
    if chosen {
        return Html("en").into_response();
    }
    (
        [(SET_COOKIE, "lang=en; Path=/")],
        Redirect::to("/language"),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_webmail::ServerStateBuilder;
    use axum::http::StatusCode;
    use axum::http::header::LOCATION;
    use std::sync::{Arc, Mutex};

    fn shared() -> SharedState {
        Arc::new(Mutex::new(
            ServerStateBuilder::new().account("alice", "secret").build(),
        ))
    }

    fn form(username: &str, password: &str) -> Form<LoginForm> {
        Form(LoginForm {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    #[tokio::test]
    async fn correct_credentials_issue_session() {
        let state = shared();
        let resp = login_submit(State(state.clone()), form("alice", "secret")).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[LOCATION], "/mailbox/INBOX");
        assert_eq!(
            resp.headers()[SET_COOKIE],
            "session=token-1; Path=/; HttpOnly"
        );
        assert_eq!(state.lock().unwrap().live_sessions, vec!["token-1"]);
    }

    #[tokio::test]
    async fn wrong_password_goes_back_to_login() {
        let state = shared();
        let resp = login_submit(State(state.clone()), form("alice", "nope")).await;

        assert_eq!(resp.headers()[LOCATION], "/login?error=1");
        assert!(resp.headers().get(SET_COOKIE).is_none());
        assert!(state.lock().unwrap().live_sessions.is_empty());
    }

    #[tokio::test]
    async fn page_without_session_shows_form() {
        let resp = login_page(State(shared()), HeaderMap::new()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn first_language_visit_reloads_itself() {
        let resp = language(HeaderMap::new()).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[LOCATION], "/language");
        assert_eq!(resp.headers()[SET_COOKIE], "lang=en; Path=/");

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "lang=en".parse().unwrap());
        let resp = language(headers).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
