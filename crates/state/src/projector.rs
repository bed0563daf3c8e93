//! Live-state projection over the feed.

use async_trait::async_trait;
use livematch_core::{MappedMatch, OddsSnapshot, SnapshotListener, TrackerError};
use livematch_feed::MatchDecoder;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Maintains the public view of matches currently PRE or LIVE.
///
/// The view is rebuilt from scratch on every snapshot and swapped in
/// wholesale once the whole snapshot decoded cleanly; a failure mid-snapshot
/// leaves the previous view untouched.
pub struct LiveStateProjector {
    decoder: Arc<MatchDecoder>,
    view: RwLock<HashMap<String, MappedMatch>>,
}

impl LiveStateProjector {
    pub fn new(decoder: Arc<MatchDecoder>) -> Self {
        Self {
            decoder,
            view: RwLock::new(HashMap::new()),
        }
    }

    /// Returns a detached copy of the current view, keyed by match id.
    pub async fn current(&self) -> HashMap<String, MappedMatch> {
        self.view.read().await.clone()
    }
}

#[async_trait]
impl SnapshotListener for LiveStateProjector {
    async fn on_change(&self, _url: &str, payload: &str) -> Result<(), TrackerError> {
        let snapshot: OddsSnapshot = serde_json::from_str(payload)
            .map_err(|err| TrackerError::InvalidResponse(err.to_string()))?;

        let mut next = HashMap::new();
        for line in snapshot.odds.split('\n').filter(|line| !line.is_empty()) {
            let mapped = self.decoder.parse(line).await?;
            if mapped.is_tracked() {
                next.insert(mapped.id.clone(), mapped);
            }
        }

        debug!(matches = next.len(), "live view rebuilt");
        *self.view.write().await = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{line, snapshot_payload, Fixture, MATCH_A, MATCH_B};
    use livematch_core::MatchStatus;

    #[tokio::test]
    async fn builds_view_from_snapshot() {
        let fixture = Fixture::start().await;
        let projector = LiveStateProjector::new(fixture.decoder());

        let payload = snapshot_payload(&[
            line(MATCH_A, MatchStatus::Live, ""),
            line(MATCH_B, MatchStatus::Pre, ""),
        ]);
        projector.on_change("test", &payload).await.unwrap();

        let view = projector.current().await;
        assert_eq!(view.len(), 2);
        assert_eq!(view[MATCH_A].status, "LIVE");
        assert_eq!(view[MATCH_B].status, "PRE");
    }

    #[tokio::test]
    async fn untracked_statuses_are_filtered_out() {
        let fixture = Fixture::start().await;
        let projector = LiveStateProjector::new(fixture.decoder());

        let payload = snapshot_payload(&[
            line(MATCH_A, MatchStatus::Live, ""),
            line(MATCH_B, MatchStatus::Removed, ""),
        ]);
        projector.on_change("test", &payload).await.unwrap();

        let view = projector.current().await;
        assert_eq!(view.len(), 1);
        assert!(view.contains_key(MATCH_A));
    }

    #[tokio::test]
    async fn view_is_replaced_wholesale() {
        let fixture = Fixture::start().await;
        let projector = LiveStateProjector::new(fixture.decoder());

        projector
            .on_change("test", &snapshot_payload(&[line(MATCH_A, MatchStatus::Live, "")]))
            .await
            .unwrap();
        projector
            .on_change("test", &snapshot_payload(&[line(MATCH_B, MatchStatus::Pre, "")]))
            .await
            .unwrap();

        let view = projector.current().await;
        assert_eq!(view.len(), 1);
        assert!(view.contains_key(MATCH_B));
    }

    #[tokio::test]
    async fn failure_preserves_previous_view() {
        let fixture = Fixture::start().await;
        let projector = LiveStateProjector::new(fixture.decoder());

        projector
            .on_change("test", &snapshot_payload(&[line(MATCH_A, MatchStatus::Live, "")]))
            .await
            .unwrap();

        let bad = snapshot_payload(&["only,three,fields".to_string()]);
        let err = projector.on_change("test", &bad).await.unwrap_err();
        assert!(matches!(err, TrackerError::InvalidRecord(_)));

        let view = projector.current().await;
        assert_eq!(view.len(), 1);
        assert!(view.contains_key(MATCH_A));
    }

    #[tokio::test]
    async fn malformed_payload_is_invalid_response() {
        let fixture = Fixture::start().await;
        let projector = LiveStateProjector::new(fixture.decoder());

        let err = projector.on_change("test", "not json").await.unwrap_err();
        assert!(matches!(err, TrackerError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn empty_lines_are_skipped() {
        let fixture = Fixture::start().await;
        let projector = LiveStateProjector::new(fixture.decoder());

        let payload = serde_json::to_string(&serde_json::json!({
            "odds": format!("\n{}\n\n", line(MATCH_A, MatchStatus::Live, ""))
        }))
        .unwrap();
        projector.on_change("test", &payload).await.unwrap();

        assert_eq!(projector.current().await.len(), 1);
    }

    #[tokio::test]
    async fn current_returns_detached_copy() {
        let fixture = Fixture::start().await;
        let projector = LiveStateProjector::new(fixture.decoder());

        projector
            .on_change("test", &snapshot_payload(&[line(MATCH_A, MatchStatus::Live, "")]))
            .await
            .unwrap();

        let mut copy = projector.current().await;
        copy.clear();
        assert_eq!(projector.current().await.len(), 1);
    }
}
