//! Wire records served by the remote job API.
//!
//! The remote system is authoritative for every field here; the client only
//! ever replaces these values wholesale with freshly fetched copies.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lifecycle state of a scrape session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    Canceled,
}

impl SessionStatus {
    /// Terminal states never change server-side again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Failed | SessionStatus::Canceled
        )
    }

    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Queued => "queued",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
            SessionStatus::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary record for one scrape job, as returned by `GET /sessions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub name: String,
    pub url: String,
    pub status: SessionStatus,
    #[serde(default)]
    pub total_pages: u64,
    #[serde(default)]
    pub scraped_pages: u64,
    /// Timestamp as sent by the server (kept verbatim, not reparsed).
    pub started_at: String,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub product_count: u64,
}

impl Session {
    /// Pages scraped as a percentage of the total, 0 when the total is unknown.
    pub fn page_progress(&self) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        let scraped = self.scraped_pages.min(self.total_pages);
        (scraped as f64 / self.total_pages as f64) * 100.0
    }
}

/// A session plus its fine-grained progress and extracted products,
/// as returned by `GET /session/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: Session,
    /// 0-100, non-decreasing while the session is in progress.
    #[serde(default)]
    pub progress: f64,
    /// Present only when the session failed.
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub total_products: u64,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl SessionDetail {
    pub fn id(&self) -> &str {
        &self.session.id
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status
    }
}

/// One extracted product record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Display string exactly as scraped, e.g. "$12.99".
    #[serde(default)]
    pub current_price: Option<String>,
    #[serde(default)]
    pub original_price: Option<String>,
    #[serde(default)]
    pub unit_size: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub dietary_tags: BTreeSet<String>,
}

/// Per-status tallies over a session list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionCounts {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub failed: usize,
    pub canceled: usize,
    pub products: u64,
}

impl SessionCounts {
    pub fn from_sessions(sessions: &[Session]) -> Self {
        sessions.iter().fold(Self::default(), |mut counts, session| {
            counts.total += 1;
            counts.products += session.product_count;
            match session.status {
                SessionStatus::Queued | SessionStatus::InProgress => counts.active += 1,
                SessionStatus::Completed => counts.completed += 1,
                SessionStatus::Failed => counts.failed += 1,
                SessionStatus::Canceled => counts.canceled += 1,
            }
            counts
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn session(id: &str, status: SessionStatus, product_count: u64) -> Session {
        Session {
            id: id.to_string(),
            name: format!("Store {id}"),
            url: format!("https://{id}.example.com"),
            status,
            total_pages: 10,
            scraped_pages: if status.is_terminal() { 10 } else { 3 },
            started_at: "2025-06-01T12:00:00".to_string(),
            completed_at: status
                .is_terminal()
                .then(|| "2025-06-01T12:30:00".to_string()),
            product_count,
        }
    }

    pub fn detail(id: &str, status: SessionStatus) -> SessionDetail {
        SessionDetail {
            session: session(id, status, 1),
            progress: if status.is_terminal() { 100.0 } else { 30.0 },
            error: (status == SessionStatus::Failed).then(|| "crawl blocked".to_string()),
            total_products: 1,
            products: vec![product("p1", "Oat Milk", Some("Dairy Alternatives"))],
        }
    }

    pub fn product(id: &str, name: &str, category: Option<&str>) -> Product {
        Product {
            id: id.to_string(),
            name: Some(name.to_string()),
            current_price: Some("$3.49".to_string()),
            original_price: None,
            unit_size: Some("1L".to_string()),
            category: category.map(str::to_string),
            url: format!("https://shop.example.com/p/{id}"),
            image_url: None,
            dietary_tags: BTreeSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminal_classification() {
        assert!(!SessionStatus::Queued.is_terminal());
        assert!(!SessionStatus::InProgress.is_terminal());
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Failed.is_terminal());
        assert!(SessionStatus::Canceled.is_terminal());
    }

    #[test]
    fn test_detail_deserializes_from_flat_json() {
        let json = r#"{
            "id": "s1",
            "name": "Fresh Grocer",
            "url": "https://freshgrocer.example",
            "status": "in_progress",
            "total_pages": 40,
            "scraped_pages": 12,
            "started_at": "2025-06-01T12:00:00",
            "completed_at": null,
            "product_count": 7,
            "progress": 30,
            "error": null,
            "total_products": 7,
            "products": [{
                "id": "p1",
                "name": "Greek Yogurt",
                "current_price": "$4.99",
                "original_price": null,
                "unit_size": "500g",
                "category": "Dairy",
                "url": "https://freshgrocer.example/p1",
                "image_url": null,
                "dietary_tags": ["vegetarian", "gluten-free", "vegetarian"]
            }]
        }"#;

        let detail: SessionDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.id(), "s1");
        assert_eq!(detail.status(), SessionStatus::InProgress);
        assert_eq!(detail.progress, 30.0);
        assert_eq!(detail.products.len(), 1);
        // Tags are a set: duplicates collapse, order is irrelevant
        assert_eq!(detail.products[0].dietary_tags.len(), 2);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let json = r#"{"id":"s1","name":"n","url":"u","status":"paused","started_at":"t"}"#;
        assert!(serde_json::from_str::<Session>(json).is_err());
    }

    #[test]
    fn test_page_progress() {
        let mut session = fixtures::session("a", SessionStatus::InProgress, 0);
        session.total_pages = 0;
        assert_eq!(session.page_progress(), 0.0);

        session.total_pages = 4;
        session.scraped_pages = 1;
        assert_eq!(session.page_progress(), 25.0);
    }

    #[test]
    fn test_session_counts() {
        let sessions = vec![
            fixtures::session("a", SessionStatus::Queued, 0),
            fixtures::session("b", SessionStatus::InProgress, 5),
            fixtures::session("c", SessionStatus::Completed, 12),
            fixtures::session("d", SessionStatus::Failed, 0),
        ];
        let counts = SessionCounts::from_sessions(&sessions);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.active, 2);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.canceled, 0);
        assert_eq!(counts.products, 17);
    }
}
