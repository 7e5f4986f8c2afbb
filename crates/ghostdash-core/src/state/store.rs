use async_trait::async_trait;

use super::events::Event;
use super::types::Command;

/// Dispatches commands and reports what changed.
///
/// # Semantics
///
/// - **Ordering**: commands run in the order they are awaited. Nothing is
///   batched or retried; a retry is a new dispatch.
/// - **Errors**: a failed command leaves the cache as it was.
/// - **Events**: on success, dispatch returns a non-empty `Vec<Event>`.
///   Every command currently produces exactly one event.
#[async_trait]
pub trait Store: Send + Sync {
    type Error;
    async fn dispatch(&self, cmd: Command) -> Result<Vec<Event>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_trait_is_implementable() {
        struct TestStore;
        #[async_trait]
        impl Store for TestStore {
            type Error = String;
            async fn dispatch(&self, _cmd: Command) -> Result<Vec<Event>, String> {
                Ok(vec![Event::SessionsRefreshed {
                    count: 0,
                    stale: false,
                }])
            }
        }

        let store = TestStore;
        let events = store.dispatch(Command::RefreshSessions).await.unwrap();
        assert_eq!(events.len(), 1);
    }
}
