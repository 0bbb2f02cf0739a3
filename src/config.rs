//! Webmail connection configuration

use crate::error::{Error, Result};
use std::env;
use url::Url;

const DEFAULT_URL: &str = "http://127.0.0.1:8080";

/// Connection settings for a webmail server
#[derive(Debug, Clone)]
pub struct WebmailConfig {
    pub base_url: Url,
    pub username: Option<String>,
    pub password: Option<String>,
    pub user_agent: Option<String>,
}

impl WebmailConfig {
    /// Configuration for a server at `base_url` with no stored credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            username: None,
            password: None,
            user_agent: None,
        })
    }

    /// Load configuration from environment variables
    ///
    /// Reads from `.env` file if present. All variables are optional:
    /// - `WEBMAIL_URL` (default: `http://127.0.0.1:8080`)
    /// - `WEBMAIL_USERNAME`
    /// - `WEBMAIL_PASSWORD`
    /// - `WEBMAIL_USER_AGENT`
    ///
    /// # Errors
    ///
    /// Returns an error if `WEBMAIL_URL` is not a valid absolute URL.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let raw_url = env::var("WEBMAIL_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());

        Ok(Self {
            base_url: parse_base_url(&raw_url)?,
            username: env::var("WEBMAIL_USERNAME").ok(),
            password: env::var("WEBMAIL_PASSWORD").ok(),
            user_agent: env::var("WEBMAIL_USER_AGENT").ok(),
        })
    }

    /// The stored username and password, when both are present.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}

/// Parse and normalize a base URL so relative joins keep its path.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url =
        Url::parse(raw).map_err(|e| Error::Config(format!("Invalid WEBMAIL_URL '{raw}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(Error::Config(format!("WEBMAIL_URL '{raw}' cannot be a base")));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
