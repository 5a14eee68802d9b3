//! Session errors
//!
//! Three classes reach the user and must stay distinguishable: transport
//! failures, application rejections (server text shown verbatim), and
//! preconditions caught before any request is issued.

use std::fmt;

use inkfont_net::NetError;

/// User action guarded against re-entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SetActiveFont,
    Upload,
    SaveMapping,
    Generate,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::SetActiveFont => "Font selection",
            Action::Upload => "Upload",
            Action::SaveMapping => "Saving the mapping",
            Action::Generate => "Generation",
            Action::Delete => "Deletion",
        })
    }
}

/// Local checks that stop an action before it reaches the network
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Precondition {
    #[error("Please select a handwriting image to upload.")]
    NoFile,

    #[error("The selected image is empty.")]
    EmptyFile,

    #[error("Please enter a name for your new font.")]
    MissingFontName,

    #[error("Please enter some text to generate.")]
    EmptyText,

    #[error("No active font selected. Please select or upload one first.")]
    NoActiveFont,

    #[error("Please select a font first.")]
    NoSelection,

    #[error("Deletion cancelled.")]
    NotConfirmed,

    #[error("Unknown glyph {0}.")]
    UnknownGlyph(String),

    #[error("{filename} must map to exactly one character, got {value:?}.")]
    InvalidGlyphValue { filename: String, value: String },
}

/// Error class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Application,
    Precondition,
    Busy,
    Detached,
}

/// Session error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Connection problem: {0}")]
    Transport(#[from] NetError),

    #[error("{message}")]
    Rejected { message: String, code: Option<String> },

    #[error("{0}")]
    Precondition(#[from] Precondition),

    #[error("{0} is already in progress.")]
    Busy(Action),

    #[error("The page was closed before the response arrived.")]
    Detached,
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::Rejected { .. } => ErrorKind::Application,
            Self::Precondition(_) => ErrorKind::Precondition,
            Self::Busy(_) => ErrorKind::Busy,
            Self::Detached => ErrorKind::Detached,
        }
    }

    /// Server failure code, if the server sent one
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
