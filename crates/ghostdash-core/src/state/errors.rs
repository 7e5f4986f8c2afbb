use crate::client::ClientError;
use crate::errors::GhostdashError;
use crate::export::ExportError;

/// Failure of a user-initiated mutation.
///
/// The `Display` output is the human-readable reason; for [`Remote`] it is
/// the server's message exactly as sent.
///
/// [`Remote`]: MutationError::Remote
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MutationError {
    /// Input rejected before anything was sent.
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    Transport { message: String },

    #[error("{detail}")]
    Remote { status: u16, detail: String },

    /// The payload was downloaded but could not be saved.
    #[error("Export failed: {message}")]
    Export { message: String },
}

impl MutationError {
    pub fn validation(message: impl Into<String>) -> Self {
        MutationError::Validation {
            message: message.into(),
        }
    }
}

impl From<ClientError> for MutationError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Transport { message } => MutationError::Transport { message },
            ClientError::Remote { status, detail } => MutationError::Remote { status, detail },
            ClientError::Decode { .. } => MutationError::Transport {
                message: err.to_string(),
            },
        }
    }
}

impl From<ExportError> for MutationError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::InvalidFileName { .. } => MutationError::Validation {
                message: err.to_string(),
            },
            _ => MutationError::Export {
                message: err.to_string(),
            },
        }
    }
}

impl GhostdashError for MutationError {
    fn error_code(&self) -> &'static str {
        match self {
            MutationError::Validation { .. } => "VALIDATION_ERROR",
            MutationError::Transport { .. } => "TRANSPORT_ERROR",
            MutationError::Remote { .. } => "REMOTE_ERROR",
            MutationError::Export { .. } => "EXPORT_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            MutationError::Validation { .. } => true,
            MutationError::Remote { status, .. } => (400..500).contains(status),
            MutationError::Transport { .. } | MutationError::Export { .. } => false,
        }
    }
}
