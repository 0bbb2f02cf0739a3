//! HTTP request/response descriptors and the transport seam
//!
//! The gateway speaks in plain-data [`Request`] and [`Response`] values
//! and hands the actual round-trip to a [`Transport`]. The production
//! transport is [`HttpTransport`], a reqwest client with a cookie jar so
//! that a session established by the login surface is shared with every
//! later request.
//!
//! `HttpTransport` follows redirects itself rather than leaving them to
//! reqwest, so a chain that ends on the URL it started from still
//! counts as redirected.

use crate::config::WebmailConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{CACHE_CONTROL, HeaderValue, LOCATION, PRAGMA};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// Whether a request may be answered from a local cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CachePolicy {
    #[default]
    Default,
    /// Bypass every cache between the client and the server.
    NoStore,
}

/// Ordered form fields. Keys may repeat (`uids=1&uids=2`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    fields: Vec<(String, String)>,
}

impl FormBody {
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Append a field, keeping any earlier field with the same key.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Append one field per value under the same key.
    pub fn append_all<I, V>(&mut self, key: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        for value in values {
            self.fields.push((key.to_string(), value.to_string()));
        }
        self
    }

    /// All values recorded under `key`, in insertion order.
    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// The first value recorded under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

/// A request described as plain data. Immutable once issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub body: Option<FormBody>,
    pub cache: CachePolicy,
}

impl Request {
    #[must_use]
    pub const fn get(url: Url, cache: CachePolicy) -> Self {
        Self {
            method: Method::Get,
            url,
            body: None,
            cache,
        }
    }

    #[must_use]
    pub const fn post(url: Url, body: FormBody) -> Self {
        Self {
            method: Method::Post,
            url,
            body: Some(body),
            cache: CachePolicy::Default,
        }
    }
}

/// The outcome of one request attempt, after redirects were followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Final URL after following redirects.
    pub url: Url,
    /// At least one redirect was followed.
    pub redirected: bool,
    pub status: u16,
    pub body: String,
}

impl Response {
    /// Status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// The response body as text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.body
    }
}

/// Executes one request attempt. Redirects are followed by the
/// transport; the gateway inspects the outcome.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a single round-trip.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the body cannot
    /// be read.
    async fn execute(&self, request: &Request) -> Result<Response>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: &Request) -> Result<Response> {
        (**self).execute(request).await
    }
}

/// Hops followed before a request fails with [`Error::TooManyRedirects`].
const MAX_REDIRECTS: usize = 10;

/// reqwest-backed transport with a shared cookie jar.
///
/// Cloning is cheap and clones share the same connection pool and
/// cookies.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &WebmailConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none());
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    async fn send(
        &self,
        method: Method,
        url: &Url,
        body: Option<&FormBody>,
        cache: CachePolicy,
    ) -> Result<reqwest::Response> {
        let mut builder = match method {
            Method::Get => self.client.get(url.clone()),
            Method::Post => self.client.post(url.clone()),
        };

        if cache == CachePolicy::NoStore {
            builder = builder
                .header(CACHE_CONTROL, HeaderValue::from_static("no-store"))
                .header(PRAGMA, HeaderValue::from_static("no-cache"));
        }

        if let Some(body) = body {
            builder = builder.form(body.fields());
        }

        Ok(builder.send().await?)
    }
}

/// Where a redirect response points, resolved against the URL that
/// produced it. `None` for anything that is not a usable redirect.
fn redirect_target(response: &reqwest::Response, from: &Url) -> Option<Url> {
    let redirect = matches!(
        response.status(),
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    );
    if !redirect {
        return None;
    }
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    from.join(location).ok()
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &Request) -> Result<Response> {
        debug!("{} {}", request.method, request.url);

        let mut method = request.method;
        let mut url = request.url.clone();
        let mut body = request.body.as_ref();
        let mut hops = 0;

        let response = loop {
            let response = self.send(method, &url, body, request.cache).await?;
            let Some(next) = redirect_target(&response, &url) else {
                break response;
            };

            hops += 1;
            if hops > MAX_REDIRECTS {
                return Err(Error::TooManyRedirects {
                    url: request.url.to_string(),
                });
            }
            debug!("{} {} -> {} {}", method, url, response.status().as_u16(), next);

            // 307 and 308 repeat the request as is; the rest become a GET.
            if !matches!(
                response.status(),
                StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT
            ) {
                method = Method::Get;
                body = None;
            }
            url = next;
        };

        let status = response.status().as_u16();
        let body = response.text().await?;
        let redirected = hops > 0;

        debug!(
            "{} {} -> {} {}{}",
            request.method,
            request.url,
            status,
            url,
            if redirected { " (redirected)" } else { "" }
        );

        Ok(Response {
            url,
            redirected,
            status,
            body,
        })
    }
}
