use thiserror::Error;

pub const UPLOAD_FAILED: &str = "Upload failed";
pub const CHAT_FAILED: &str = "Chat failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transport,
    Server,
}

/// Client-side precondition failures. Raised before any request is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please choose a PDF file first.")]
    MissingFile,
    #[error("Upload a PDF first.")]
    MissingSession,
    #[error("Please type a heading/topic.")]
    EmptyHeading,
    #[error("Minutes must be a whole number between 10 and 240.")]
    MinutesOutOfRange,
    #[error("Wait for the upload to finish.")]
    UploadInProgress,
    #[error("Wait for the current study plan to finish.")]
    QueryInProgress,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("server responded with status {status}")]
    Server { status: u16, detail: Option<String> },
}

impl WorkflowError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn server(status: u16, detail: Option<String>) -> Self {
        Self::Server { status, detail }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Server { .. } => ErrorKind::Server,
        }
    }

    /// Collapses the error into the single line shown to the user: the server's `detail` when
    /// it sent one, otherwise the transport message, otherwise `generic`.
    pub fn display_message(&self, generic: &str) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Server {
                detail: Some(detail),
                ..
            } if !detail.is_empty() => detail.clone(),
            Self::Server { status, .. } => format!("Request failed with status code {status}"),
            Self::Transport(message) if !message.trim().is_empty() => message.clone(),
            Self::Transport(_) => generic.to_string(),
        }
    }
}
