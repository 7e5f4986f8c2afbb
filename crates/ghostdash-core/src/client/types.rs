use serde::{Deserialize, Serialize};

use crate::sessions::types::Session;

/// Body of `POST /scrape`.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeRequest<'a> {
    pub url: &'a str,
}

/// Response of `POST /scrape`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeStarted {
    pub message: String,
    pub session_id: String,
}

/// Response of `GET /sessions`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionsResponse {
    pub sessions: Vec<Session>,
}

/// Response of `DELETE /session/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body the remote API attaches to non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// The reason string, if the server supplied one.
    ///
    /// Validation failures come back with `detail` as a list of objects; those
    /// are rendered as JSON rather than dropped.
    pub fn reason(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Null => None,
            serde_json::Value::String(_) => None,
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_string_detail() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail":"Session not found"}"#).unwrap();
        assert_eq!(body.reason().as_deref(), Some("Session not found"));
    }

    #[test]
    fn test_error_body_structured_detail() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"detail":[{"loc":["body","url"],"msg":"invalid"}]}"#)
                .unwrap();
        assert!(body.reason().unwrap().contains("invalid"));
    }

    #[test]
    fn test_error_body_without_detail() {
        let body: ErrorBody = serde_json::from_str(r#"{"error":"x"}"#).unwrap();
        assert!(body.reason().is_none());
    }
}
