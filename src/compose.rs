//! Outgoing mail and its form encoding

use crate::http::FormBody;
use crate::mailbox::MessageRef;
use crate::parse::MessageId;

/// A message to send or save as a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
    /// Uploads already staged on the server.
    pub attachment_uuids: Vec<String>,
    /// Part strings of attachments carried over from the original
    /// message when forwarding.
    pub prev_attachments: Vec<String>,
    pub save_as_draft: bool,
    pub reply_to: Option<MessageRef>,
    pub forward_of: Option<MessageRef>,
}

impl OutgoingMail {
    /// Path segments of the endpoint this mail is submitted to.
    ///
    /// Replies win over forwards when both are set.
    #[must_use]
    pub fn target_segments(&self) -> Vec<String> {
        let (message, action) = match (&self.reply_to, &self.forward_of) {
            (Some(message), _) => (message, "reply"),
            (None, Some(message)) => (message, "forward"),
            (None, None) => return vec!["compose".to_string()],
        };
        vec![
            "message".to_string(),
            message.mailbox.as_str().to_string(),
            message.uid.to_string(),
            action.to_string(),
        ]
    }

    /// Encode the mail as the compose form.
    #[must_use]
    pub fn to_form(&self, message_id: &MessageId) -> FormBody {
        let mut form = FormBody::new();
        form.append("from", self.from.as_str())
            .append("to", self.to.as_str())
            .append("subject", self.subject.as_str())
            .append("text", self.text.as_str())
            .append("html", self.html.as_str())
            .append("attachment-uuids", self.attachment_uuids.join(","))
            .append("content_type", "text/html")
            .append_all("prev_attachments", &self.prev_attachments);

        if self.save_as_draft {
            form.append("save_as_draft", "1");
        }

        form.append("message_id", message_id.as_str());
        form
    }
}
