//! Mailbox names
//!
//! The server addresses mailboxes by their IMAP names. The inbox is
//! shown to users as `Inbox` but must be sent as `INBOX`; every other
//! mailbox uses the same name on both sides.

use std::fmt;

/// A mailbox on the webmail server.
///
/// # Examples
///
/// ```
/// use webmail_client::Mailbox;
///
/// assert_eq!(Mailbox::from("Inbox").as_str(), "INBOX");
/// assert_eq!(Mailbox::custom("Receipts").as_str(), "Receipts");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mailbox {
    Inbox,
    Drafts,
    Sent,
    Trash,
    Custom(String),
}

impl Mailbox {
    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    /// The name the server expects in paths and form fields.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Inbox => "INBOX",
            Self::Drafts => "Drafts",
            Self::Sent => "Sent",
            Self::Trash => "Trash",
            Self::Custom(name) => name,
        }
    }

    /// The name shown in a mailbox list.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Inbox => "Inbox",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Mailbox {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("inbox") {
            return Self::Inbox;
        }
        match s {
            "Drafts" => Self::Drafts,
            "Sent" => Self::Sent,
            "Trash" => Self::Trash,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for Mailbox {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

/// A message addressed by mailbox and UID, as used in reply and forward
/// URLs (`/message/<mailbox>/<uid>/reply`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub mailbox: Mailbox,
    pub uid: u32,
}

impl MessageRef {
    #[must_use]
    pub fn new(mailbox: impl Into<Mailbox>, uid: u32) -> Self {
        Self {
            mailbox: mailbox.into(),
            uid,
        }
    }
}

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.mailbox, self.uid)
    }
}

impl std::str::FromStr for MessageRef {
    type Err = String;

    /// Parse `MAILBOX/UID`. The mailbox part may itself contain `/`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mailbox, uid) = s
            .rsplit_once('/')
            .ok_or_else(|| format!("Expected MAILBOX/UID, got '{s}'"))?;
        if mailbox.is_empty() {
            return Err(format!("Missing mailbox in '{s}'"));
        }
        let uid = uid
            .parse()
            .map_err(|e| format!("Invalid UID in '{s}': {e}"))?;
        Ok(Self::new(mailbox, uid))
    }
}
