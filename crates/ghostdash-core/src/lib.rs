//! ghostdash-core: live sync of remote scrape sessions
//!
//! Keeps a client-local cache of scrape sessions in step with a remote job
//! API and coordinates the mutations a user can run against it.
//!
//! # Main Entry Points
//!
//! - [`cache`] - Entity cache with read de-duplication and stale-while-error
//! - [`polling`] - Per-key polling that stops on terminal sessions
//! - [`selection`] - Which session is "current"
//! - [`state`] - Start, delete and export, reconciled against the cache
//! - [`dashboard`] - All of the above wired together
//! - [`config`] - Configuration management

pub mod cache;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod events;
pub mod export;
pub mod logging;
pub mod polling;
pub mod selection;
pub mod sessions;
pub mod state;

// Re-export commonly used types at crate root for convenience
pub use cache::{CacheChange, CacheKey, CacheSnapshot, EntityCache, StaleDataWarning};
pub use client::{ClientError, HttpClient, RemoteClient};
pub use config::GhostdashConfig;
pub use dashboard::Dashboard;
pub use export::{DirectorySaveTarget, ExportPipeline, SaveTarget};
pub use polling::{PollHandle, PollPolicy, PollingScheduler};
pub use selection::{SelectionState, resolve};
pub use sessions::{Product, Session, SessionCounts, SessionDetail, SessionStatus};
pub use state::{Command, Event, MutationCoordinator, MutationError, Store};

pub use logging::init_logging;
