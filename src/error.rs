//! Error types for webmail-client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The request was retried after a completed login and the server
    /// redirected it to the login page again.
    #[error("Too many redirects from {url}")]
    TooManyRedirects { url: String },

    #[error("Session expired again after re-authentication: {url}")]
    SessionExpired { url: String },
}

pub type Result<T> = std::result::Result<T, Error>;
