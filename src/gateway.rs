//! Session-aware request gateway
//!
//! Every request goes through [`Gateway::get`] or [`Gateway::post`].
//! When the server answers with a login redirect the call suspends on
//! the [`ReauthPrompt`], then issues the same request once more. Callers
//! see either a genuine response to what they asked for or an error,
//! never the login page.

use crate::classify::is_auth_expiry;
use crate::error::{Error, Result};
use crate::http::{CachePolicy, FormBody, Request, Response, Transport};
use crate::reauth::ReauthPrompt;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

/// Retries allowed after a completed login.
const MAX_RETRIES: usize = 1;

pub struct Gateway<T> {
    transport: T,
    reauth: Arc<dyn ReauthPrompt>,
}

impl<T: Transport> Gateway<T> {
    #[must_use]
    pub fn new(transport: T, reauth: Arc<dyn ReauthPrompt>) -> Self {
        Self { transport, reauth }
    }

    /// GET `url`. A retry after re-authentication always uses the
    /// default cache policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if either attempt fails at the transport
    /// level, or [`Error::SessionExpired`] if the retry is redirected to
    /// the login page again.
    pub async fn get(&self, url: Url, cache: CachePolicy) -> Result<Response> {
        self.send(Request::get(url, cache)).await
    }

    /// POST `form` to `url`.
    ///
    /// # Errors
    ///
    /// Same as [`Gateway::get`].
    pub async fn post(&self, url: Url, form: FormBody) -> Result<Response> {
        self.send(Request::post(url, form)).await
    }

    async fn send(&self, mut request: Request) -> Result<Response> {
        for attempt in 0..=MAX_RETRIES {
            let response = self.transport.execute(&request).await?;
            if !is_auth_expiry(&response) {
                return Ok(response);
            }
            if attempt == MAX_RETRIES {
                break;
            }

            info!(
                "{} {} redirected to login, waiting for re-authentication",
                request.method, request.url
            );
            self.reauth.prompt_reauth().await;
            request.cache = CachePolicy::Default;
        }

        warn!(
            "{} {} still redirected to login after re-authentication",
            request.method, request.url
        );
        Err(Error::SessionExpired {
            url: request.url.to_string(),
        })
    }
}
