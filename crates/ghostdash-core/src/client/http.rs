use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::errors::ClientError;
use super::types::{ErrorBody, MessageResponse, ScrapeRequest, ScrapeStarted, SessionsResponse};
use super::RemoteClient;
use crate::config::GhostdashConfig;
use crate::sessions::types::{Session, SessionDetail};

/// reqwest-backed client for the remote job API.
///
/// Constructed explicitly and injected into the cache and coordinator; there
/// is no global instance.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            ClientError::transport(format!("Invalid base URL '{base_url}': {e}"))
        })?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &GhostdashConfig) -> Result<Self, ClientError> {
        Self::new(config.base_url(), config.request_timeout())
    }

    /// Join path segments onto the base URL, escaping each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request.send().await.map_err(transport_error)?;
        debug!(
            event = "core.client.response_received",
            url = %response.url(),
            status = response.status().as_u16()
        );
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        serde_json::from_slice(&body).map_err(|e| ClientError::Decode {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl RemoteClient for HttpClient {
    async fn list_sessions(&self) -> Result<Vec<Session>, ClientError> {
        let url = self.endpoint(&["sessions"]);
        let response: SessionsResponse = self.send_json(self.client.get(url)).await?;
        Ok(response.sessions)
    }

    async fn get_session(&self, id: &str) -> Result<SessionDetail, ClientError> {
        let url = self.endpoint(&["session", id]);
        self.send_json(self.client.get(url)).await
    }

    async fn start_scraping(&self, url: &str) -> Result<ScrapeStarted, ClientError> {
        let endpoint = self.endpoint(&["scrape"]);
        self.send_json(self.client.post(endpoint).json(&ScrapeRequest { url }))
            .await
    }

    async fn delete_session(&self, id: &str) -> Result<String, ClientError> {
        let url = self.endpoint(&["session", id]);
        let response: MessageResponse = self.send_json(self.client.delete(url)).await?;
        Ok(response.message)
    }

    async fn export_session(&self, id: &str) -> Result<Bytes, ClientError> {
        let url = self.endpoint(&["session", id, "export"]);
        let response = self.send(self.client.get(url)).await?;
        let status = response.status();

        // Export failures carry the status text, not a JSON reason
        if !status.is_success() {
            return Err(ClientError::transport(format!(
                "Export failed: {}",
                status_text(status)
            )));
        }

        response.bytes().await.map_err(transport_error)
    }
}

fn transport_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::transport("Request timed out")
    } else {
        ClientError::transport(e.to_string())
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Map a non-2xx body to a [`ClientError`].
///
/// A server-supplied `detail` becomes [`ClientError::Remote`]; anything else
/// is a transport-class failure named after the status code.
pub(crate) fn error_from_body(status: StatusCode, body: &[u8]) -> ClientError {
    match serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.reason())
    {
        Some(detail) => ClientError::remote(status.as_u16(), detail),
        None => ClientError::transport(format!("HTTP {}", status.as_u16())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpClient {
        HttpClient::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_onto_base_path() {
        let client = client("https://api.example.com/api");
        assert_eq!(
            client.endpoint(&["sessions"]).as_str(),
            "https://api.example.com/api/sessions"
        );
        assert_eq!(
            client.endpoint(&["session", "s1", "export"]).as_str(),
            "https://api.example.com/api/session/s1/export"
        );
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let client = client("https://api.example.com/api/");
        assert_eq!(
            client.endpoint(&["sessions"]).as_str(),
            "https://api.example.com/api/sessions"
        );
    }

    #[test]
    fn test_endpoint_escapes_ids() {
        let client = client("https://api.example.com/api");
        assert_eq!(
            client.endpoint(&["session", "a/b c"]).as_str(),
            "https://api.example.com/api/session/a%2Fb%20c"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(HttpClient::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_error_from_body_with_detail() {
        let error = error_from_body(StatusCode::BAD_REQUEST, br#"{"detail":"URL already queued"}"#);
        assert_eq!(error, ClientError::remote(400, "URL already queued"));
    }

    #[test]
    fn test_error_from_body_without_json() {
        let error = error_from_body(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>");
        assert_eq!(error, ClientError::transport("HTTP 502"));
    }

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(StatusCode::NOT_FOUND), "Not Found");
    }
}
