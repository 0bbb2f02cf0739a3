//! Parsers for the server's plain-text responses
//!
//! `/compose` answers a GET with a freshly generated message id wrapped
//! in four characters of padding on each side. The forward endpoint
//! lists a message's attachments as alternating lines: a MIME part
//! string, then the attachment's file name.

use serde::Serialize;
use std::fmt;

/// Padding the server puts around a generated message id.
const MESSAGE_ID_PADDING: usize = 4;

/// An RFC 5322 message id, including its angle brackets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An attachment of an existing message that can be re-attached when
/// forwarding.
///
/// `name` is `None` when the listing ended right after the part line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentRecord {
    pub part_string: String,
    pub name: Option<String>,
}

/// Extract the message id from a `/compose` response body.
///
/// Returns `None` when the trimmed body is too short to hold the
/// padding on both sides.
#[must_use]
pub fn extract_message_id(body: &str) -> Option<MessageId> {
    let text = body.trim();
    let len = text.chars().count();
    if len < MESSAGE_ID_PADDING * 2 {
        return None;
    }

    let inner: String = text
        .chars()
        .skip(MESSAGE_ID_PADDING)
        .take(len - MESSAGE_ID_PADDING * 2)
        .collect();

    Some(MessageId(format!("<{inner}>")))
}

enum LineState {
    AwaitingPart,
    AwaitingName,
}

/// Parse the previous-attachments listing.
///
/// Blank lines are ignored. Content lines alternate between opening a
/// record with its part string and closing it with a name.
#[must_use]
pub fn parse_previous_attachments(body: &str) -> Vec<AttachmentRecord> {
    let mut records: Vec<AttachmentRecord> = Vec::new();
    let mut state = LineState::AwaitingPart;

    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        state = match state {
            LineState::AwaitingPart => {
                records.push(AttachmentRecord {
                    part_string: line.to_string(),
                    name: None,
                });
                LineState::AwaitingName
            }
            LineState::AwaitingName => {
                if let Some(open) = records.last_mut() {
                    open.name = Some(line.to_string());
                }
                LineState::AwaitingPart
            }
        };
    }

    records
}
