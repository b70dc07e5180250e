use crate::status::StatusCode;

/// Top-level error type for the robochat client.
///
/// Each variant corresponds to one failure class of the question-answering
/// protocol. Only [`RobochatError::SessionExpired`] is ever recovered
/// internally; everything else reaches the caller.
#[derive(Debug, thiserror::Error)]
pub enum RobochatError {
    /// The request never produced a usable response (connect error,
    /// timeout, undecodable body).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("Application error [{status}]: {msg}")]
    Application {
        /// Status code reported by the service.
        status: StatusCode,
        /// Human readable description sent along with the status.
        msg: String,
    },

    /// The service no longer knows the session id that was sent.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// A session id could not be obtained from the service.
    #[error("Session acquisition failed: {0}")]
    AcquisitionFailed(String),

    /// The rendering collaborator refused an update.
    #[error("Render error: {0}")]
    Render(String),

    /// Invalid or missing configuration.
    #[error("Config error: {0}")]
    Config(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RobochatError {
    /// Builds an [`RobochatError::Application`] from a raw status and message.
    pub fn application(status: impl Into<StatusCode>, msg: impl Into<String>) -> Self {
        Self::Application {
            status: status.into(),
            msg: msg.into(),
        }
    }

    /// Status code carried by the error, if any.
    pub fn status(&self) -> Option<&StatusCode> {
        match self {
            Self::Application { status, .. } => Some(status),
            _ => None,
        }
    }
}

/// A convenience `Result` alias using [`RobochatError`].
pub type RobochatResult<T> = Result<T, RobochatError>;
