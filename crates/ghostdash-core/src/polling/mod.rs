//! Polling Scheduler: per-key revalidation driven by entity lifecycle.

mod policy;
mod scheduler;

pub use policy::PollPolicy;
pub use scheduler::{PollHandle, PollingScheduler};
