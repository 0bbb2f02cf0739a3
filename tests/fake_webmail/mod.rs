//! Fake webmail server for integration testing
//!
//! An in-process axum server that behaves like the form-driven webmail
//! backend `WebmailClient` talks to: outcomes are reported through
//! redirects, and any request without a live session cookie is bounced
//! to the login page.
//!
//! ## Module layout
//!
//! - `server` -- listener, session middleware, and request log
//! - `handlers/` -- one file per area (login, compose, message, ...)
//! - `state` -- test data model (mailboxes, attachments, builder)

mod handlers;
mod server;

pub use server::FakeWebmailServer;
pub use state::ServerStateBuilder;
