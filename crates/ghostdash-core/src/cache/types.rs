use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sessions::types::{Session, SessionDetail, SessionStatus};

/// Key of one cache entry: the session list, or one session's detail.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheKey {
    Sessions,
    Session(String),
}

impl CacheKey {
    pub fn session(id: impl Into<String>) -> Self {
        CacheKey::Session(id.into())
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            CacheKey::Sessions => None,
            CacheKey::Session(id) => Some(id),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Sessions => f.write_str("sessions"),
            CacheKey::Session(id) => write!(f, "session:{id}"),
        }
    }
}

/// A value held by the cache, always a wholesale copy of a server record.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Sessions(Vec<Session>),
    Detail(Box<SessionDetail>),
}

impl CachedValue {
    pub fn as_sessions(&self) -> Option<&[Session]> {
        match self {
            CachedValue::Sessions(sessions) => Some(sessions),
            CachedValue::Detail(_) => None,
        }
    }

    pub fn as_detail(&self) -> Option<&SessionDetail> {
        match self {
            CachedValue::Detail(detail) => Some(detail),
            CachedValue::Sessions(_) => None,
        }
    }

    /// Status of a detail value; lists have no single status.
    pub fn status(&self) -> Option<SessionStatus> {
        self.as_detail().map(SessionDetail::status)
    }
}

/// A read failed while an older value (or nothing) is still being shown.
#[derive(Debug, Clone, PartialEq)]
pub struct StaleDataWarning {
    pub reason: String,
    pub failed_at: DateTime<Utc>,
}

/// Last known state of a key, as handed to readers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CacheSnapshot {
    pub value: Option<CachedValue>,
    /// True when the next read must go to the remote system.
    pub is_stale: bool,
    pub fetched_at: Option<DateTime<Utc>>,
    pub warning: Option<StaleDataWarning>,
}

impl CacheSnapshot {
    pub fn sessions(&self) -> Option<&[Session]> {
        self.value.as_ref().and_then(CachedValue::as_sessions)
    }

    pub fn detail(&self) -> Option<&SessionDetail> {
        self.value.as_ref().and_then(CachedValue::as_detail)
    }
}

/// What happened to a key, passed to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheChange {
    Updated,
    Invalidated,
    Evicted,
    FetchFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

pub type ChangeCallback = Arc<dyn Fn(&CacheKey, CacheChange) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display() {
        assert_eq!(CacheKey::Sessions.to_string(), "sessions");
        assert_eq!(CacheKey::session("abc").to_string(), "session:abc");
        assert_eq!(CacheKey::session("abc").session_id(), Some("abc"));
        assert_eq!(CacheKey::Sessions.session_id(), None);
    }
}
