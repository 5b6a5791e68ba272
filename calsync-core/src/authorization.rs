//! Access to a calendar store is granted once per run through a one-shot
//! request. The store answers exactly once, from any thread; the caller
//! waits for that answer with a deadline.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::timeout;

use crate::error::{CalSyncError, CalSyncResult};
use crate::store::CalendarStore;

pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    Denied,
}

/// Single-use answer handle given to a store. Consumed on use.
#[derive(Debug)]
pub struct AccessResponder(oneshot::Sender<AccessDecision>);

impl AccessResponder {
    pub fn grant(self) {
        self.respond(AccessDecision::Granted);
    }

    pub fn deny(self) {
        self.respond(AccessDecision::Denied);
    }

    pub fn respond(self, decision: AccessDecision) {
        if self.0.send(decision).is_err() {
            tracing::debug!(?decision, "access answer arrived after the requester gave up");
        }
    }
}

/// Ask `store` for access and wait at most `wait` for its answer.
///
/// A responder dropped without answering counts as a denial.
pub async fn request_access<S>(store: &S, wait: Duration) -> CalSyncResult<()>
where
    S: CalendarStore + ?Sized,
{
    let (tx, rx) = oneshot::channel();
    store.request_access(AccessResponder(tx));

    match timeout(wait, rx).await {
        Ok(Ok(AccessDecision::Granted)) => {
            tracing::debug!("calendar access granted");
            Ok(())
        }
        Ok(Ok(AccessDecision::Denied)) => Err(CalSyncError::AuthorizationDenied),
        Ok(Err(_)) => {
            tracing::warn!("store dropped the access request without answering");
            Err(CalSyncError::AuthorizationDenied)
        }
        Err(_) => Err(CalSyncError::AuthorizationTimeout(whole_seconds(wait))),
    }
}

/// Seconds rounded up, so a sub-second wait never reports as zero.
fn whole_seconds(wait: Duration) -> u64 {
    wait.as_secs() + u64::from(wait.subsec_nanos() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{AccessBehavior, MemoryStore};

    #[tokio::test]
    async fn test_granted() {
        let store = MemoryStore::new();

        assert!(request_access(&store, Duration::from_secs(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_denied() {
        let store = MemoryStore::new().with_access(AccessBehavior::Deny);

        let err = request_access(&store, Duration::from_secs(1)).await.unwrap_err();

        assert!(matches!(err, CalSyncError::AuthorizationDenied));
        assert_eq!(err.to_string(), "Access to calendar was denied.");
    }

    #[tokio::test]
    async fn test_dropped_responder_is_denial() {
        let store = MemoryStore::new().with_access(AccessBehavior::Drop);

        let err = request_access(&store, Duration::from_secs(1)).await.unwrap_err();

        assert!(matches!(err, CalSyncError::AuthorizationDenied));
    }

    #[tokio::test]
    async fn test_silent_store_times_out() {
        let store = MemoryStore::new().with_access(AccessBehavior::Ignore);

        let err = request_access(&store, Duration::from_millis(20)).await.unwrap_err();

        assert!(matches!(err, CalSyncError::AuthorizationTimeout(1)));
        assert_eq!(
            err.to_string(),
            "No answer to calendar access request after 1s."
        );
        assert!(err.is_fatal());
    }

    #[test]
    fn test_timeout_seconds_round_up() {
        assert_eq!(whole_seconds(Duration::from_millis(20)), 1);
        assert_eq!(whole_seconds(Duration::from_secs(30)), 30);
        assert_eq!(whole_seconds(Duration::from_millis(1500)), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_answer_from_another_thread() {
        let store = MemoryStore::new().with_access(AccessBehavior::GrantFromThread);

        assert!(request_access(&store, Duration::from_secs(1)).await.is_ok());
    }
}
