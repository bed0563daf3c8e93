//! Fan-out capability invoked by the endpoint poller.

use crate::error::TrackerError;
use async_trait::async_trait;

/// Receives decoded snapshot bodies whenever the polled endpoint changes.
///
/// Listeners are notified sequentially in registration order; a failure
/// aborts the current notification round and fails the poll cycle that
/// triggered it.
#[async_trait]
pub trait SnapshotListener: Send + Sync {
    /// Called with the polled URL and the UTF-8 decoded response body.
    async fn on_change(&self, url: &str, payload: &str) -> Result<(), TrackerError>;
}
