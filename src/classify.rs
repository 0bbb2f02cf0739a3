//! Login-redirect detection
//!
//! The server answers any request made with an expired session by
//! redirecting to its login page. A response is an auth-expiry event
//! when a redirect happened and the final URL, with its query string
//! removed, ends with `/login`.

use crate::http::Response;

const LOGIN_SUFFIX: &str = "/login";

/// Whether `response` is the login page reached through a redirect.
#[must_use]
pub fn is_auth_expiry(response: &Response) -> bool {
    response.redirected && is_login_path(response.url.as_str())
}

/// Whether `url`, with its query string removed, ends with `/login`.
///
/// Works on raw strings, so anything that is not a URL simply fails
/// the suffix test.
#[must_use]
pub fn is_login_path(url: &str) -> bool {
    let without_query = url.split('?').next().unwrap_or_default();
    without_query.ends_with(LOGIN_SUFFIX)
}
