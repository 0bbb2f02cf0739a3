//! Re-authentication surface
//!
//! When the gateway sees a login redirect it suspends the in-flight call
//! on [`ReauthPrompt::prompt_reauth`]. The production prompt is
//! [`LoginSurface`], which walks the server's own login page:
//!
//! ```text
//!   mount: GET /login
//!       |
//!   still on /login? --no--> Completed
//!       | yes
//!   ask CredentialSource, POST /login  <----+
//!       |                                   |
//!   still on /login? --yes------------------+
//!       | no
//!   Completed: unmount, refresh views, resolve
//! ```
//!
//! There is no failure path. A surface whose credentials never arrive
//! keeps the caller suspended; wrap the call in `tokio::time::timeout`
//! for bounded waiting. Concurrent prompts are not deduplicated, each
//! one mounts its own surface.

use crate::error::Result;
use crate::http::{CachePolicy, FormBody, Request, Response, Transport};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Suspends a caller until the user has logged in again.
#[async_trait]
pub trait ReauthPrompt: Send + Sync {
    /// Resolves once authentication succeeded. Never resolves otherwise.
    async fn prompt_reauth(&self);
}

/// Reloads all application state after a session was restored.
#[async_trait]
pub trait ViewRefresh: Send + Sync {
    async fn refresh_all(&self);
}

/// A [`ViewRefresh`] for callers with nothing to reload.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRefresh;

#[async_trait]
impl ViewRefresh for NoRefresh {
    async fn refresh_all(&self) {
        debug!("Session restored, no views to refresh");
    }
}

/// Username and password typed into the login surface.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Supplies credentials to a mounted login surface.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Credentials for the `attempt`-th submission on the current
    /// surface, counting from zero. Pending forever means the user
    /// walked away.
    async fn credentials(&self, attempt: usize) -> Credentials;
}

/// Fixed credentials, offered once per surface.
///
/// If the server rejects them there is nothing else to offer, so later
/// attempts on the same surface never resolve.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    credentials: Credentials,
}

impl StaticCredentials {
    #[must_use]
    pub const fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl CredentialSource for StaticCredentials {
    async fn credentials(&self, attempt: usize) -> Credentials {
        if attempt == 0 {
            return self.credentials.clone();
        }
        warn!(
            "Stored credentials for {} were rejected, waiting indefinitely",
            self.credentials.username
        );
        futures::future::pending().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceState {
    Showing,
    Completed,
}

/// Outcome of posting the login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Submission {
    Accepted,
    /// The server answered with the login page again.
    Rejected,
    /// The request never got an answer.
    Failed,
}

/// Pause before resubmitting after a failed login request.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Keeps the open-surface count accurate even if the prompt future is
/// dropped mid-login.
struct MountedSurface<'a> {
    open: &'a AtomicUsize,
}

impl<'a> MountedSurface<'a> {
    fn mount(open: &'a AtomicUsize) -> Self {
        let now_open = open.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Session expired, showing login surface ({now_open} open)");
        Self { open }
    }
}

impl Drop for MountedSurface<'_> {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// [`ReauthPrompt`] that logs in through the server's `/login` form.
pub struct LoginSurface<T> {
    transport: T,
    login_url: Url,
    credentials: Arc<dyn CredentialSource>,
    refresh: Arc<dyn ViewRefresh>,
    retry_delay: Duration,
    open: AtomicUsize,
}

impl<T: Transport> LoginSurface<T> {
    /// Build a surface for the server at `base_url`.
    ///
    /// The transport must share its session cookies with the transport
    /// used by the gateway, or the restored session will not be seen by
    /// the retried request.
    ///
    /// # Errors
    ///
    /// Returns an error if the login URL cannot be derived from
    /// `base_url`.
    pub fn new(
        transport: T,
        base_url: &Url,
        credentials: Arc<dyn CredentialSource>,
        refresh: Arc<dyn ViewRefresh>,
    ) -> Result<Self> {
        Ok(Self {
            transport,
            login_url: base_url.join("login")?,
            credentials,
            refresh,
            retry_delay: DEFAULT_RETRY_DELAY,
            open: AtomicUsize::new(0),
        })
    }

    /// Set the pause between resubmissions when the login request
    /// itself fails. Defaults to one second.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Number of surfaces currently mounted.
    #[must_use]
    pub fn open_surfaces(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    fn state_of(&self, response: &Response) -> SurfaceState {
        if response.url.path().starts_with(self.login_url.path()) {
            SurfaceState::Showing
        } else {
            SurfaceState::Completed
        }
    }

    /// Load the login page. A session restored elsewhere in the meantime
    /// makes the server send us straight past it.
    async fn load(&self) -> SurfaceState {
        let request = Request::get(self.login_url.clone(), CachePolicy::NoStore);
        match self.transport.execute(&request).await {
            Ok(response) => self.state_of(&response),
            Err(e) => {
                warn!("Failed to load login page: {e}");
                SurfaceState::Showing
            }
        }
    }

    async fn submit(&self, credentials: &Credentials) -> Submission {
        let mut form = FormBody::new();
        form.append("username", credentials.username.as_str())
            .append("password", credentials.password.as_str());

        let request = Request::post(self.login_url.clone(), form);
        match self.transport.execute(&request).await {
            Ok(response) => match self.state_of(&response) {
                SurfaceState::Completed => Submission::Accepted,
                SurfaceState::Showing => {
                    warn!("Login rejected for {}", credentials.username);
                    Submission::Rejected
                }
            },
            Err(e) => {
                warn!("Login request failed: {e}");
                Submission::Failed
            }
        }
    }
}

#[async_trait]
impl<T: Transport> ReauthPrompt for LoginSurface<T> {
    async fn prompt_reauth(&self) {
        let surface = MountedSurface::mount(&self.open);

        let mut state = self.load().await;
        let mut attempt = 0;
        while state == SurfaceState::Showing {
            let credentials = self.credentials.credentials(attempt).await;
            state = loop {
                match self.submit(&credentials).await {
                    Submission::Accepted => break SurfaceState::Completed,
                    Submission::Rejected => {
                        attempt += 1;
                        break SurfaceState::Showing;
                    }
                    // Only a rejection counts as an attempt; the same
                    // credentials go out again once the page loads.
                    Submission::Failed => {
                        tokio::time::sleep(self.retry_delay).await;
                        if self.load().await == SurfaceState::Completed {
                            break SurfaceState::Completed;
                        }
                    }
                }
            };
        }

        drop(surface);
        info!("Login completed, refreshing views");
        self.refresh.refresh_all().await;
    }
}
