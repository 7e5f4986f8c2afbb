pub mod search;
pub mod types;

pub use search::{default_export_filename, filter_products};
pub use types::{Product, Session, SessionCounts, SessionDetail, SessionStatus};
