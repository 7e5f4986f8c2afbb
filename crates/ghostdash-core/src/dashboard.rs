//! Wiring of client, cache, scheduler and coordinator behind the calls
//! presentation layers make.

use std::sync::Arc;

use crate::cache::{CacheKey, CacheSnapshot, ChangeCallback, EntityCache, SubscriptionId};
use crate::client::{ClientError, HttpClient, RemoteClient};
use crate::config::GhostdashConfig;
use crate::export::{DirectorySaveTarget, ExportPipeline, SaveTarget};
use crate::polling::{PollHandle, PollPolicy, PollingScheduler};
use crate::state::{Event, MutationCoordinator, MutationError};

pub struct Dashboard {
    cache: EntityCache,
    scheduler: PollingScheduler,
    coordinator: MutationCoordinator,
}

impl Dashboard {
    pub fn new(client: Arc<dyn RemoteClient>, policy: PollPolicy, target: Arc<dyn SaveTarget>) -> Self {
        let cache = EntityCache::new(Arc::clone(&client));
        let scheduler = PollingScheduler::new(cache.clone(), policy);
        let coordinator = MutationCoordinator::new(client, cache.clone(), ExportPipeline::new(target));
        Self {
            cache,
            scheduler,
            coordinator,
        }
    }

    /// HTTP client against `base_url`, exports saved into the configured
    /// export directory.
    pub fn from_config(config: &GhostdashConfig) -> Result<Self, ClientError> {
        let client = HttpClient::from_config(config)?;
        Ok(Self::new(
            Arc::new(client),
            PollPolicy::from_config(config),
            Arc::new(DirectorySaveTarget::new(config.export_directory())),
        ))
    }

    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    pub fn coordinator(&self) -> &MutationCoordinator {
        &self.coordinator
    }

    pub async fn list_sessions(&self) -> CacheSnapshot {
        self.cache.read(&CacheKey::Sessions).await
    }

    pub async fn get_session(&self, id: &str) -> CacheSnapshot {
        self.cache.read(&CacheKey::session(id)).await
    }

    pub async fn start_scraping(&self, url: &str) -> Result<Event, MutationError> {
        self.coordinator.start_scraping(url).await
    }

    pub async fn delete_session(&self, id: &str) -> Result<Event, MutationError> {
        self.coordinator.delete_session(id).await
    }

    pub async fn export_session(&self, id: &str, file_name: &str) -> Result<Event, MutationError> {
        self.coordinator.export_session(id, file_name).await
    }

    /// Be told whenever the cached value of `key` changes.
    pub fn subscribe(&self, key: &CacheKey, callback: ChangeCallback) -> SubscriptionId {
        self.cache.subscribe(key, callback)
    }

    pub fn unsubscribe(&self, key: &CacheKey, id: SubscriptionId) {
        self.cache.unsubscribe(key, id);
    }

    /// Keep `key` fresh until the returned handle is dropped.
    pub fn watch(&self, key: CacheKey) -> PollHandle {
        self.scheduler.subscribe(key)
    }
}
