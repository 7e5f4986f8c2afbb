use std::time::Duration;

use crate::cache::{CacheKey, CacheSnapshot, CachedValue};
use crate::config::GhostdashConfig;

/// How long to wait before the next read of a key, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub list_interval: Duration,
    pub active_interval: Duration,
}

impl PollPolicy {
    pub fn from_config(config: &GhostdashConfig) -> Self {
        Self {
            list_interval: config.list_interval(),
            active_interval: config.active_interval(),
        }
    }

    /// Evaluated after every read of `key`, successful or not.
    ///
    /// The list is polled unconditionally. A detail stops once its last
    /// observed status is terminal; with nothing observed yet it keeps the
    /// short interval.
    pub fn next_delay(&self, key: &CacheKey, snapshot: &CacheSnapshot) -> Option<Duration> {
        match key {
            CacheKey::Sessions => Some(self.list_interval),
            CacheKey::Session(_) => match snapshot.value.as_ref().and_then(CachedValue::status) {
                Some(status) if status.is_terminal() => None,
                _ => Some(self.active_interval),
            },
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from_config(&GhostdashConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::types::SessionStatus;
    use crate::sessions::types::fixtures::detail;

    fn detail_snapshot(status: SessionStatus) -> CacheSnapshot {
        CacheSnapshot {
            value: Some(CachedValue::Detail(Box::new(detail("s1", status)))),
            ..CacheSnapshot::default()
        }
    }

    #[test]
    fn test_list_always_polls() {
        let policy = PollPolicy::default();
        assert_eq!(
            policy.next_delay(&CacheKey::Sessions, &CacheSnapshot::default()),
            Some(Duration::from_millis(2000))
        );
    }

    #[test]
    fn test_active_details_poll_fast() {
        let policy = PollPolicy::default();
        let key = CacheKey::session("s1");
        for status in [SessionStatus::Queued, SessionStatus::InProgress] {
            assert_eq!(
                policy.next_delay(&key, &detail_snapshot(status)),
                Some(Duration::from_millis(1000))
            );
        }
    }

    #[test]
    fn test_terminal_details_stop() {
        let policy = PollPolicy::default();
        let key = CacheKey::session("s1");
        for status in [
            SessionStatus::Completed,
            SessionStatus::Failed,
            SessionStatus::Canceled,
        ] {
            assert_eq!(policy.next_delay(&key, &detail_snapshot(status)), None);
        }
    }

    #[test]
    fn test_detail_without_value_keeps_polling() {
        let policy = PollPolicy::default();
        assert!(
            policy
                .next_delay(&CacheKey::session("s1"), &CacheSnapshot::default())
                .is_some()
        );
    }
}
