use reqwest::StatusCode;

/// Error type for every dashboard operation.
///
/// The taxonomy mirrors how failures reach the user: backend rejections carry the
/// server's message verbatim, client-side validation failures never produce a
/// request, and empty result sets are not errors at all (pages render them as
/// informational rows).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The backend answered with a non-2xx status. `message` is the body's
    /// `error` field, passed through untouched.
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    /// The request never completed (connect, timeout, TLS, ...).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 2xx response whose body did not match the expected envelope.
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    /// Input rejected before any request was issued.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The current role is not allowed to perform the action.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Filesystem failure while writing an export file.
    #[error("Export error: {0}")]
    Export(#[from] std::io::Error),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ClientError::Forbidden(message.into())
    }

    /// True when the failure was produced locally, without any network traffic.
    pub fn is_client_side(&self) -> bool {
        matches!(self, ClientError::Validation(_) | ClientError::Forbidden(_))
    }

    /// Returns the message shown in the error region of the page.
    /// This is the single source of truth for error presentation.
    pub fn user_message(&self) -> String {
        match self {
            // Backend messages are surfaced verbatim
            ClientError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
