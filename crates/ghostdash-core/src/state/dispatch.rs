use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheKey, EntityCache};
use crate::client::RemoteClient;
use crate::export::{ExportPipeline, SavedExport, validate_file_name};
use crate::state::errors::MutationError;
use crate::state::events::Event;
use crate::state::store::Store;
use crate::state::types::Command;

/// Runs mutations against the remote system and reconciles the cache
/// afterwards.
///
/// Failed operations never touch the cache, and nothing is retried.
pub struct MutationCoordinator {
    client: Arc<dyn RemoteClient>,
    cache: EntityCache,
    exporter: ExportPipeline,
}

impl MutationCoordinator {
    pub fn new(client: Arc<dyn RemoteClient>, cache: EntityCache, exporter: ExportPipeline) -> Self {
        Self {
            client,
            cache,
            exporter,
        }
    }

    /// Start a scrape job for `url`. On success the session list is
    /// invalidated so the new session shows up on the next read.
    pub async fn start_scraping(&self, url: &str) -> Result<Event, MutationError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(MutationError::validation("Please enter a URL"));
        }

        info!(event = "core.mutation.start_started", url = url);
        let started = self.client.start_scraping(url).await.map_err(|e| {
            error!(event = "core.mutation.start_failed", url = url, error = %e);
            MutationError::from(e)
        })?;

        self.cache.invalidate(&CacheKey::Sessions);
        info!(
            event = "core.mutation.start_completed",
            session_id = %started.session_id
        );
        Ok(Event::ScrapeStarted {
            session_id: started.session_id,
            message: started.message,
        })
    }

    /// Delete a session. Once the server confirms, the session is gone from
    /// every cached view.
    pub async fn delete_session(&self, id: &str) -> Result<Event, MutationError> {
        if id.trim().is_empty() {
            return Err(MutationError::validation("Session id cannot be empty"));
        }

        info!(event = "core.mutation.delete_started", session_id = id);
        let message = self.client.delete_session(id).await.map_err(|e| {
            error!(event = "core.mutation.delete_failed", session_id = id, error = %e);
            MutationError::from(e)
        })?;

        self.cache.remove_session(id);
        info!(event = "core.mutation.delete_completed", session_id = id);
        Ok(Event::SessionDeleted {
            id: id.to_string(),
            message,
        })
    }

    /// Download a session's export and hand it to the save target.
    /// Read-only with respect to the cache.
    pub async fn export_session(&self, id: &str, file_name: &str) -> Result<Event, MutationError> {
        validate_file_name(file_name)?;

        info!(
            event = "core.mutation.export_started",
            session_id = id,
            file_name = file_name
        );
        let payload = self.client.export_session(id).await.map_err(|e| {
            error!(event = "core.mutation.export_failed", session_id = id, error = %e);
            MutationError::from(e)
        })?;

        let SavedExport { path, bytes } =
            self.exporter.deliver(&payload, file_name).map_err(|e| {
                error!(event = "core.mutation.export_save_failed", session_id = id, error = %e);
                MutationError::from(e)
            })?;

        info!(
            event = "core.mutation.export_completed",
            session_id = id,
            path = %path.display(),
            bytes = bytes
        );
        Ok(Event::SessionExported {
            id: id.to_string(),
            path,
            bytes,
        })
    }

    /// Refetch the session list. Never fails; a failed fetch is reported as
    /// a stale list.
    pub async fn refresh_sessions(&self) -> Event {
        let snapshot = self.cache.refresh(&CacheKey::Sessions).await;
        let count = snapshot.sessions().map_or(0, <[_]>::len);
        if let Some(warning) = &snapshot.warning {
            warn!(
                event = "core.mutation.refresh_stale",
                reason = %warning.reason,
                count = count
            );
        }
        Event::SessionsRefreshed {
            count,
            stale: snapshot.is_stale,
        }
    }
}

#[async_trait]
impl Store for MutationCoordinator {
    type Error = MutationError;

    async fn dispatch(&self, cmd: Command) -> Result<Vec<Event>, MutationError> {
        debug!(event = "core.state.dispatch_started", command = ?cmd);

        let result = match cmd {
            Command::StartScraping { url } => self.start_scraping(&url).await,
            Command::DeleteSession { id } => self.delete_session(&id).await,
            Command::ExportSession { id, file_name } => {
                self.export_session(&id, &file_name).await
            }
            Command::RefreshSessions => Ok(self.refresh_sessions().await),
        };

        match &result {
            Ok(event) => debug!(event = "core.state.dispatch_completed", result = ?event),
            Err(e) => debug!(event = "core.state.dispatch_failed", error = %e),
        }
        result.map(|event| vec![event])
    }
}
