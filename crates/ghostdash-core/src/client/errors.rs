use crate::errors::GhostdashError;

/// Failure of a single remote call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// Network failure, timeout, or non-2xx without a parseable reason.
    #[error("{message}")]
    Transport { message: String },

    /// Non-2xx carrying a server-supplied reason, kept verbatim.
    #[error("{detail}")]
    Remote { status: u16, detail: String },

    /// 2xx whose body did not match the expected shape.
    #[error("Unexpected response body: {message}")]
    Decode { message: String },
}

impl ClientError {
    pub fn transport(message: impl Into<String>) -> Self {
        ClientError::Transport {
            message: message.into(),
        }
    }

    pub fn remote(status: u16, detail: impl Into<String>) -> Self {
        ClientError::Remote {
            status,
            detail: detail.into(),
        }
    }
}

impl GhostdashError for ClientError {
    fn error_code(&self) -> &'static str {
        match self {
            ClientError::Transport { .. } => "TRANSPORT_ERROR",
            ClientError::Remote { .. } => "REMOTE_ERROR",
            ClientError::Decode { .. } => "DECODE_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, ClientError::Remote { status, .. } if (400..500).contains(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_displays_detail_verbatim() {
        let error = ClientError::remote(422, "Invalid URL: missing scheme");
        assert_eq!(error.to_string(), "Invalid URL: missing scheme");
        assert_eq!(error.error_code(), "REMOTE_ERROR");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_server_side_remote_error_is_not_user_error() {
        let error = ClientError::remote(500, "scraper crashed");
        assert!(!error.is_user_error());
    }

    #[test]
    fn test_transport_error() {
        let error = ClientError::transport("connection refused");
        assert_eq!(error.to_string(), "connection refused");
        assert_eq!(error.error_code(), "TRANSPORT_ERROR");
        assert!(!error.is_user_error());
    }
}
