//! Session-aware client library for form-driven webmail servers
//!
//! Talks to a webmail server that reports outcomes through redirects
//! rather than status codes. Every request passes through a
//! [`Gateway`] that notices when the server bounced it to the login
//! page, suspends the call until the user has logged in again through a
//! [`ReauthPrompt`], and then retries it once.
//!
//! [`WebmailClient`] builds the mail operations (send, delete, flag,
//! move, create mailbox, settings) on top of the gateway.

mod classify;
mod client;
mod compose;
mod config;
mod confirm;
mod error;
mod flag;
mod gateway;
mod http;
mod mailbox;
mod parse;
mod reauth;

#[cfg(test)]
mod test_support;

pub use classify::{is_auth_expiry, is_login_path};
pub use client::WebmailClient;
pub use compose::OutgoingMail;
pub use config::WebmailConfig;
pub use confirm::{Answer, AssumeYes, Confirm};
pub use error::{Error, Result};
pub use flag::{Flag, FlagAction};
pub use gateway::Gateway;
pub use http::{CachePolicy, FormBody, HttpTransport, Method, Request, Response, Transport};
pub use mailbox::{Mailbox, MessageRef};
pub use parse::{AttachmentRecord, MessageId, extract_message_id, parse_previous_attachments};
pub use reauth::{
    CredentialSource, Credentials, LoginSurface, NoRefresh, ReauthPrompt, StaticCredentials,
    ViewRefresh,
};
