//! Webmail operations
//!
//! Every operation is a form submission or page fetch through the
//! [`Gateway`], so an expired session is handled before results reach
//! this module. The server reports most outcomes through where it
//! redirects or through the status code, not through the body; each
//! operation returns `Ok(false)` (or an empty value) when the server
//! did not confirm success.

use crate::compose::OutgoingMail;
use crate::config::WebmailConfig;
use crate::confirm::{Answer, Confirm};
use crate::error::{Error, Result};
use crate::flag::{Flag, FlagAction};
use crate::gateway::Gateway;
use crate::http::{CachePolicy, FormBody, HttpTransport, Transport};
use crate::mailbox::Mailbox;
use crate::parse::{AttachmentRecord, MessageId, extract_message_id, parse_previous_attachments};
use crate::reauth::{CredentialSource, LoginSurface, ViewRefresh};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Client for a form-driven webmail server
pub struct WebmailClient<T = HttpTransport> {
    gateway: Gateway<T>,
    base_url: Url,
}

impl WebmailClient<HttpTransport> {
    /// Build a client whose expired sessions are restored through the
    /// server's login page using `credentials`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the login
    /// URL cannot be derived from the configured base URL.
    pub fn new(
        config: &WebmailConfig,
        credentials: Arc<dyn CredentialSource>,
        refresh: Arc<dyn ViewRefresh>,
    ) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        let surface = LoginSurface::new(transport.clone(), &config.base_url, credentials, refresh)?;
        let gateway = Gateway::new(transport, Arc::new(surface));
        Ok(Self::with_gateway(gateway, config.base_url.clone()))
    }
}

impl<T: Transport> WebmailClient<T> {
    #[must_use]
    pub const fn with_gateway(gateway: Gateway<T>, base_url: Url) -> Self {
        Self { gateway, base_url }
    }

    /// List the attachments of a message that can be carried into a
    /// forward.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails at the transport level.
    pub async fn previous_attachments(
        &self,
        mailbox: &Mailbox,
        uid: u32,
        text_part: &str,
    ) -> Result<Vec<AttachmentRecord>> {
        let uid = uid.to_string();
        let mut url = self.endpoint(&["message", mailbox.as_str(), &uid, "forward"])?;
        url.query_pairs_mut().append_pair("part", text_part);

        let response = self.gateway.get(url, CachePolicy::Default).await?;
        Ok(parse_previous_attachments(response.text()))
    }

    /// Ask the server for a fresh message id.
    ///
    /// Returns `None` if the server did not answer with a 2xx status or
    /// the body does not contain an id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails at the transport level.
    pub async fn generate_message_id(&self) -> Result<Option<MessageId>> {
        let url = self.endpoint(&["compose"])?;
        let response = self.gateway.get(url, CachePolicy::Default).await?;
        if !response.is_success() {
            warn!("Message id request returned {}", response.status);
            return Ok(None);
        }
        Ok(extract_message_id(response.text()))
    }

    /// Send `mail`, or save it when `save_as_draft` is set.
    ///
    /// Nothing is submitted if no message id could be generated.
    ///
    /// # Errors
    ///
    /// Returns an error if a request fails at the transport level.
    pub async fn send_mail(&self, mail: &OutgoingMail) -> Result<bool> {
        let Some(message_id) = self.generate_message_id().await? else {
            warn!("Could not generate a message id, not sending");
            return Ok(false);
        };

        let segments = mail.target_segments();
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
        let url = self.endpoint(&segments)?;

        let response = self.gateway.post(url, mail.to_form(&message_id)).await?;

        // The compose endpoint answers 200 even on failure; only the
        // redirect target tells.
        let final_url = response.url.as_str();
        let sent = response.redirected && final_url.ends_with("/mailbox/INBOX");
        let drafted = mail.save_as_draft && final_url.contains("/message/Drafts/");

        if sent || drafted {
            info!("Submitted {message_id}");
        } else {
            warn!("Submitting {message_id} was not confirmed (landed on {final_url})");
        }
        Ok(sent || drafted)
    }

    /// Delete messages after the user confirms.
    ///
    /// Returns `false` without contacting the server unless the answer is
    /// [`Answer::Yes`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails at the transport level.
    pub async fn remove_mail(
        &self,
        uids: &[u32],
        mailbox: &Mailbox,
        confirm: &dyn Confirm,
    ) -> Result<bool> {
        let answer = confirm
            .show_yes_no(
                "Delete Mail",
                "Are you sure you want to delete this mail?",
                true,
            )
            .await;
        if answer != Answer::Yes {
            debug!("Delete in {mailbox} not confirmed ({answer:?})");
            return Ok(false);
        }

        let mut form = FormBody::new();
        form.append_all("uids", uids);

        let url = self.endpoint(&["message", mailbox.as_str(), "delete"])?;
        let response = self.gateway.post(url, form).await?;
        Ok(response.status == 200)
    }

    /// Add or remove `flag` on messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails at the transport level.
    pub async fn set_flag(
        &self,
        uids: &[u32],
        mailbox: &Mailbox,
        action: FlagAction,
        flag: &Flag,
    ) -> Result<bool> {
        let mut form = FormBody::new();
        form.append_all("uids", uids)
            .append("action", action.as_form_value())
            .append("flags", flag.as_form_value());

        let url = self.endpoint(&["message", mailbox.as_str(), "flag"])?;
        let response = self.gateway.post(url, form).await?;
        if response.status != 200 {
            warn!(
                "Flag {flag} ({}) in {mailbox} returned {}",
                action.as_form_value(),
                response.status
            );
        }
        Ok(response.status == 200)
    }

    /// Mark messages read or unread.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails at the transport level.
    pub async fn mark_read(&self, uids: &[u32], mailbox: &Mailbox, read: bool) -> Result<bool> {
        self.set_flag(uids, mailbox, FlagAction::from_bool(read), &Flag::Seen)
            .await
    }

    /// Create a new mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails at the transport level.
    pub async fn create_mailbox(&self, name: &str) -> Result<bool> {
        let mut form = FormBody::new();
        form.append("name", name);

        let url = self.endpoint(&["new-mailbox"])?;
        let response = self.gateway.post(url, form).await?;
        Ok(response.status == 200)
    }

    /// Move messages from `current` to `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails at the transport level.
    pub async fn move_to_mailbox(
        &self,
        uids: &[u32],
        current: &Mailbox,
        target: &Mailbox,
    ) -> Result<bool> {
        let mut form = FormBody::new();
        form.append_all("uids", uids).append("to", target.as_str());

        let url = self.endpoint(&["message", current.as_str(), "move"])?;
        let response = self.gateway.post(url, form).await?;
        Ok(response.status == 200)
    }

    /// Fetch the user's settings, bypassing caches.
    ///
    /// Returns an empty object when the server has none or answers with
    /// something other than JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails at the transport level.
    pub async fn settings(&self) -> Result<serde_json::Value> {
        let empty = serde_json::Value::Object(serde_json::Map::new());

        let url = self.endpoint(&["user-settings"])?;
        let response = self.gateway.get(url, CachePolicy::NoStore).await?;
        if response.status != 200 || response.text().is_empty() {
            return Ok(empty);
        }

        match serde_json::from_str(response.text()) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                warn!("Ignoring unparseable settings: {e}");
                Ok(empty)
            }
        }
    }

    /// Replace the user's settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `settings` cannot be serialized or the request
    /// fails at the transport level.
    pub async fn set_settings<S: Serialize + Sync + ?Sized>(&self, settings: &S) -> Result<bool> {
        let mut form = FormBody::new();
        form.append("json", serde_json::to_string(settings)?);

        let url = self.endpoint(&["user-settings"])?;
        let response = self.gateway.post(url, form).await?;
        Ok(response.status == 200)
    }

    /// Resolve path segments against the base URL, percent-encoding each.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
