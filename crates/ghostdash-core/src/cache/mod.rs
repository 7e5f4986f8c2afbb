//! Entity Cache: keyed, time-stamped store of sessions and session details.
//!
//! Reads for the same key are de-duplicated; failed reads keep the last good
//! value and attach a [`StaleDataWarning`]. Subscribers are told whenever a
//! key changes.

mod store;
mod types;

pub use store::EntityCache;
pub use types::{
    CacheChange, CacheKey, CacheSnapshot, CachedValue, ChangeCallback, StaleDataWarning,
    SubscriptionId,
};
