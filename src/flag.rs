//! Message flags for the `/flag` endpoint
//!
//! The endpoint takes an `action` (`add` or `remove`) and the flag in
//! its IMAP spelling, e.g. `\Seen`.

use std::fmt;

/// A message flag.
///
/// # Examples
///
/// ```
/// use webmail_client::Flag;
///
/// assert_eq!(Flag::Seen.as_form_value(), "\\Seen");
/// assert_eq!(Flag::Keyword("$Todo".into()).as_form_value(), "$Todo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Flag {
    Seen,
    Answered,
    Flagged,
    Deleted,
    Draft,
    /// A user-defined keyword, sent without a backslash.
    Keyword(String),
}

impl Flag {
    /// The value sent in the `flags` form field.
    #[must_use]
    pub fn as_form_value(&self) -> &str {
        match self {
            Self::Seen => "\\Seen",
            Self::Answered => "\\Answered",
            Self::Flagged => "\\Flagged",
            Self::Deleted => "\\Deleted",
            Self::Draft => "\\Draft",
            Self::Keyword(kw) => kw,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_form_value())
    }
}

/// Whether to set or clear a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagAction {
    Add,
    Remove,
}

impl FlagAction {
    /// The value sent in the `action` form field.
    #[must_use]
    pub const fn as_form_value(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }

    /// `Add` when `set` is true.
    #[must_use]
    pub const fn from_bool(set: bool) -> Self {
        if set { Self::Add } else { Self::Remove }
    }
}
