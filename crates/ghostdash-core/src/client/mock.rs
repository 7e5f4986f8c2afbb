//! Scripted in-memory [`RemoteClient`] used by the crate's tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use super::{ClientError, RemoteClient, ScrapeStarted};
use crate::sessions::types::{Session, SessionDetail};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CallCounts {
    pub list: usize,
    pub detail: usize,
    pub start: usize,
    pub delete: usize,
    pub export: usize,
}

struct Script {
    sessions: Result<Vec<Session>, ClientError>,
    details: HashMap<String, Result<SessionDetail, ClientError>>,
    start: Result<ScrapeStarted, ClientError>,
    delete: Result<String, ClientError>,
    export: Result<Bytes, ClientError>,
    calls: CallCounts,
    detail_calls: HashMap<String, usize>,
    delay: Duration,
}

pub(crate) struct ScriptedClient {
    script: Mutex<Script>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script {
                sessions: Ok(Vec::new()),
                details: HashMap::new(),
                start: Err(ClientError::transport("start not scripted")),
                delete: Ok("Session deleted".to_string()),
                export: Err(ClientError::transport("export not scripted")),
                calls: CallCounts::default(),
                detail_calls: HashMap::new(),
                delay: Duration::from_millis(10),
            }),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Script) -> R) -> R {
        let mut script = self.script.lock().unwrap();
        f(&mut script)
    }

    pub fn set_sessions(&self, sessions: Vec<Session>) {
        self.with(|s| s.sessions = Ok(sessions));
    }

    pub fn fail_sessions(&self, error: ClientError) {
        self.with(|s| s.sessions = Err(error));
    }

    pub fn set_detail(&self, detail: SessionDetail) {
        self.with(|s| {
            s.details.insert(detail.id().to_string(), Ok(detail));
        });
    }

    pub fn fail_detail(&self, id: &str, error: ClientError) {
        self.with(|s| {
            s.details.insert(id.to_string(), Err(error));
        });
    }

    pub fn set_start(&self, result: Result<ScrapeStarted, ClientError>) {
        self.with(|s| s.start = result);
    }

    pub fn set_delete(&self, result: Result<String, ClientError>) {
        self.with(|s| s.delete = result);
    }

    pub fn set_export(&self, result: Result<Bytes, ClientError>) {
        self.with(|s| s.export = result);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.with(|s| s.delay = delay);
    }

    pub fn calls(&self) -> CallCounts {
        self.with(|s| s.calls)
    }

    pub fn detail_calls(&self, id: &str) -> usize {
        self.with(|s| s.detail_calls.get(id).copied().unwrap_or(0))
    }

    fn delay(&self) -> Duration {
        self.with(|s| s.delay)
    }
}

#[async_trait]
impl RemoteClient for ScriptedClient {
    async fn list_sessions(&self) -> Result<Vec<Session>, ClientError> {
        self.with(|s| s.calls.list += 1);
        tokio::time::sleep(self.delay()).await;
        self.with(|s| s.sessions.clone())
    }

    async fn get_session(&self, id: &str) -> Result<SessionDetail, ClientError> {
        self.with(|s| {
            s.calls.detail += 1;
            *s.detail_calls.entry(id.to_string()).or_default() += 1;
        });
        tokio::time::sleep(self.delay()).await;
        self.with(|s| {
            s.details
                .get(id)
                .cloned()
                .unwrap_or_else(|| Err(ClientError::remote(404, "Session not found")))
        })
    }

    async fn start_scraping(&self, _url: &str) -> Result<ScrapeStarted, ClientError> {
        self.with(|s| s.calls.start += 1);
        tokio::time::sleep(self.delay()).await;
        self.with(|s| s.start.clone())
    }

    async fn delete_session(&self, id: &str) -> Result<String, ClientError> {
        self.with(|s| s.calls.delete += 1);
        tokio::time::sleep(self.delay()).await;
        self.with(|s| {
            let result = s.delete.clone();
            if result.is_ok() {
                // Server-side removal
                if let Ok(sessions) = &mut s.sessions {
                    sessions.retain(|session| session.id != id);
                }
                s.details.remove(id);
            }
            result
        })
    }

    async fn export_session(&self, _id: &str) -> Result<Bytes, ClientError> {
        self.with(|s| s.calls.export += 1);
        tokio::time::sleep(self.delay()).await;
        self.with(|s| s.export.clone())
    }
}
