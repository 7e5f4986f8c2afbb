use serde::{Deserialize, Serialize};

/// Every user-initiated operation the coordinator can run.
///
/// Commands own their data so they can be serialized, queued, and sent
/// across boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Ask the remote system to scrape a store URL.
    StartScraping { url: String },
    /// Delete a session. Confirmation is the caller's job.
    DeleteSession { id: String },
    /// Download a session's products and save them under `file_name`.
    ExportSession { id: String, file_name: String },
    /// Refetch the session list.
    RefreshSessions,
}
