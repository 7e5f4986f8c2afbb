//! Remote Resource Client: typed bindings to the remote job API.
//!
//! [`RemoteClient`] is the seam the cache and mutation coordinator are built
//! on. [`HttpClient`] is the production implementation; tests substitute a
//! scripted double.

mod errors;
mod http;
#[cfg(test)]
pub(crate) mod mock;
mod types;

use async_trait::async_trait;
use bytes::Bytes;

pub use errors::ClientError;
pub use http::HttpClient;
pub use types::{ErrorBody, MessageResponse, ScrapeRequest, ScrapeStarted, SessionsResponse};

use crate::sessions::types::{Session, SessionDetail};

/// Read/write contract of the remote job API.
///
/// Timeouts are the implementation's responsibility and surface as
/// [`ClientError::Transport`].
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// `GET /sessions`
    async fn list_sessions(&self) -> Result<Vec<Session>, ClientError>;

    /// `GET /session/{id}`
    async fn get_session(&self, id: &str) -> Result<SessionDetail, ClientError>;

    /// `POST /scrape {url}`
    async fn start_scraping(&self, url: &str) -> Result<ScrapeStarted, ClientError>;

    /// `DELETE /session/{id}`, returning the server's message.
    async fn delete_session(&self, id: &str) -> Result<String, ClientError>;

    /// `GET /session/{id}/export`, returning the raw payload.
    async fn export_session(&self, id: &str) -> Result<Bytes, ClientError>;
}
