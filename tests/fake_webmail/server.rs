//! In-process fake webmail server for integration testing
//!
//! # How the session works
//!
//! ```text
//!   Client requests /compose without a cookie
//!       |
//!   303 See Other -> /login?next=/compose
//!       |
//!   GET /login answers 200 with the login form
//!       |
//!   Client posts username and password to /login
//!       |
//!   303 See Other -> /mailbox/INBOX, Set-Cookie: session=<token>
//! ```
//!
//! Every successful login adds a live token. `expire_session` forgets
//! all of them, so the next request from any client lands on the login
//! page again.
//!
//! Every request is appended to the state's log before the session
//! check, which lets tests assert on the exact sequence of requests a
//! client made.

use super::handlers;
use super::state::{LoggedRequest, ServerState};
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::{CACHE_CONTROL, COOKIE, PRAGMA};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::net::TcpListener;

pub type SharedState = Arc<Mutex<ServerState>>;

/// A fake webmail server on localhost with an OS-assigned port.
pub struct FakeWebmailServer {
    addr: SocketAddr,
    state: SharedState,
    /// Handle to the background task so it lives as long as the server.
    handle: tokio::task::JoinHandle<()>,
}

impl FakeWebmailServer {
    /// Start a new fake server with the given state.
    ///
    /// The server runs until the `FakeWebmailServer` is dropped.
    pub async fn start(state: ServerState) -> Self {
        let state = Arc::new(Mutex::new(state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind to ephemeral port");
        let addr = listener.local_addr().unwrap();

        let app = handlers::router(state.clone());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve fake webmail");
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL of the server, with a trailing slash.
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Lock the server state for inspection.
    pub fn state(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().unwrap()
    }

    /// Invalidate every live session, as a server-side timeout would.
    pub fn expire_session(&self) {
        self.state().live_sessions.clear();
    }

    /// Number of login form submissions the server has seen.
    pub fn login_posts(&self) -> usize {
        self.state()
            .log
            .iter()
            .filter(|r| r.method == "POST" && r.target.starts_with("/login"))
            .count()
    }
}

impl Drop for FakeWebmailServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Value of the `session` cookie, if the request carries one.
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| pair.trim().strip_prefix("session="))
        .map(str::to_string)
}

/// Whether the request carries a live session token.
pub fn has_session(state: &ServerState, headers: &HeaderMap) -> bool {
    session_cookie(headers).is_some_and(|token| state.live_sessions.contains(&token))
}

/// Log the request, then bounce it to the login page unless it carries
/// the live session or targets a page served before login.
pub async fn require_session(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let allowed = {
        let mut state = state.lock().unwrap();
        let target = request
            .uri()
            .path_and_query()
            .map_or_else(|| path.clone(), ToString::to_string);
        let header = |name| {
            request
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        state.log.push(LoggedRequest {
            method: request.method().to_string(),
            target,
            cache_control: header(CACHE_CONTROL),
            pragma: header(PRAGMA),
        });
        path == "/login" || path == "/language" || has_session(&state, request.headers())
    };

    if allowed {
        next.run(request).await
    } else {
        Redirect::to(&format!("/login?next={path}")).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_webmail::ServerStateBuilder;
    use axum::http::HeaderValue;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn finds_session_among_cookies() {
        let found = session_cookie(&headers("lang=en; session=abc; theme=dark"));
        assert_eq!(found.as_deref(), Some("abc"));
    }

    #[test]
    fn missing_session_cookie() {
        assert!(session_cookie(&headers("lang=en")).is_none());
        assert!(session_cookie(&HeaderMap::new()).is_none());
    }

    #[test]
    fn stale_token_is_not_a_session() {
        let mut state = ServerStateBuilder::new().build();
        state.live_sessions.push("fresh".to_string());

        assert!(has_session(&state, &headers("session=fresh")));
        assert!(!has_session(&state, &headers("session=stale")));

        state.live_sessions.clear();
        assert!(!has_session(&state, &headers("session=fresh")));
    }
}
