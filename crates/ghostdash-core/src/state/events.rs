use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What changed as the result of a dispatched command.
///
/// Only successful operations produce events; failures travel through
/// `Err(MutationError)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// The remote system accepted a scrape job.
    ScrapeStarted { session_id: String, message: String },
    /// A session was deleted remotely and dropped from the cache.
    SessionDeleted { id: String, message: String },
    /// A session export was saved by the host.
    SessionExported {
        id: String,
        path: PathBuf,
        bytes: usize,
    },
    /// The session list was refetched. `stale` is set when the fetch failed
    /// and the previous list is still being shown.
    SessionsRefreshed { count: usize, stale: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serde_roundtrip() {
        let event = Event::ScrapeStarted {
            session_id: "abc123".to_string(),
            message: "Scraping started".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deserialized);
    }

    #[test]
    fn test_exported_event_carries_path() {
        let event = Event::SessionExported {
            id: "s1".to_string(),
            path: PathBuf::from("/tmp/store_products.csv"),
            bytes: 42,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json["SessionExported"]["path"],
            serde_json::json!("/tmp/store_products.csv")
        );
    }
}
