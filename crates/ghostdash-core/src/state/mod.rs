//! Mutation Coordinator: start, delete and export against the remote
//! system, each followed by reconciling the entity cache.

pub mod dispatch;
pub mod errors;
pub mod events;
pub mod store;
pub mod types;

pub use dispatch::MutationCoordinator;
pub use errors::MutationError;
pub use events::Event;
pub use store::Store;
pub use types::Command;
