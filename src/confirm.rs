//! Confirmation dialog seam
//!
//! Destructive operations ask before touching the server. The library
//! only sees the answer; how the question is shown is up to the caller.

use async_trait::async_trait;

/// The user's response to a yes/no question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    /// The dialog was closed without choosing.
    Dismissed,
}

#[async_trait]
pub trait Confirm: Send + Sync {
    /// Ask a yes/no question. `destructive` marks the "yes" choice as
    /// dangerous.
    async fn show_yes_no(&self, title: &str, message: &str, destructive: bool) -> Answer;
}

/// Answers every question with yes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

#[async_trait]
impl Confirm for AssumeYes {
    async fn show_yes_no(&self, _title: &str, _message: &str, _destructive: bool) -> Answer {
        Answer::Yes
    }
}
