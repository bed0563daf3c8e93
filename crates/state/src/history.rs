//! Append-only per-match history with synthetic terminal entries.
//!
//! Every distinct raw record a match has ever shown is kept in insertion
//! order. When a previously LIVE match vanishes from a snapshot, the store
//! manufactures a terminal REMOVED entry so consumers can observe the exit.

use async_trait::async_trait;
use livematch_core::{
    is_canonical_uuid, time, MatchStatus, OddsSnapshot, SnapshotListener, TrackerError,
};
use livematch_feed::MatchDecoder;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Raw-line marker for entries the store manufactured itself.
pub const GENERATED_LINE: &str = "(Generated)";

/// One observed (or synthesized) state of a match. Never mutated once
/// inserted.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    /// Wall-clock milliseconds at insertion.
    pub timestamp_ms: i64,
    /// The exact feed line, or [`GENERATED_LINE`] for synthetic entries.
    pub raw_line: String,
    /// Denormalization of the line at insertion time.
    pub rendered: serde_json::Value,
    /// Resolved status the entry was inserted with.
    pub status: String,
}

impl HistoryEntry {
    /// Insertion instant as an ISO-8601 UTC string.
    #[must_use]
    pub fn timestamp_iso(&self) -> String {
        time::millis_to_iso(self.timestamp_ms).unwrap_or_default()
    }
}

pub struct MatchHistoryStore {
    decoder: Arc<MatchDecoder>,
    entries: RwLock<HashMap<String, Vec<HistoryEntry>>>,
}

impl MatchHistoryStore {
    pub fn new(decoder: Arc<MatchDecoder>) -> Self {
        Self {
            decoder,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// All entries for `id` in insertion order; empty when unknown.
    pub async fn history(&self, id: &str) -> Vec<HistoryEntry> {
        self.entries.read().await.get(id).cloned().unwrap_or_default()
    }

    /// The most recent entry for `id`.
    pub async fn current(&self, id: &str) -> Option<HistoryEntry> {
        self.entries
            .read()
            .await
            .get(id)
            .and_then(|history| history.last())
            .cloned()
    }

    /// All known match ids, order unspecified.
    pub async fn all_ids(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }

    /// Ids whose most recent entry carries `status`.
    pub async fn ids_with_status(&self, status: &str) -> Vec<String> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|(_, history)| {
                history.last().is_some_and(|entry| entry.status == status)
            })
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Drops all entries.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    async fn append(&self, id: &str, entry: HistoryEntry) {
        self.entries
            .write()
            .await
            .entry(id.to_string())
            .or_default()
            .push(entry);
    }

    /// Most recent raw line for `id`, if any.
    async fn latest_raw_line(&self, id: &str) -> Option<String> {
        self.entries
            .read()
            .await
            .get(id)
            .and_then(|history| history.last())
            .map(|entry| entry.raw_line.clone())
    }

    /// Appends a synthetic terminal entry for every LIVE match absent from
    /// the snapshot. PRE matches that disappear are simply forgotten.
    async fn sweep_removed(&self, present: &HashSet<String>) -> Result<(), TrackerError> {
        let vanished: Vec<String> = self
            .ids_with_status(MatchStatus::Live.as_str())
            .await
            .into_iter()
            .filter(|id| !present.contains(id))
            .collect();

        for id in vanished {
            // Known LIVE ids always have an entry; an empty history here
            // means the index and the entries diverged.
            let raw_line = self
                .latest_raw_line(&id)
                .await
                .ok_or(TrackerError::NotInitialized)?;

            let mut mapped = self.decoder.parse(&raw_line).await?;
            mapped.status = MatchStatus::Removed.as_str().to_string();

            let rendered = serde_json::to_value(&mapped)
                .map_err(|err| TrackerError::InvalidRecord(err.to_string()))?;

            debug!(id = %id, "synthesizing terminal entry for vanished match");
            self.append(
                &id,
                HistoryEntry {
                    timestamp_ms: time::now_ms(),
                    raw_line: GENERATED_LINE.to_string(),
                    rendered,
                    status: mapped.status,
                },
            )
            .await;
        }

        Ok(())
    }
}

#[async_trait]
impl SnapshotListener for MatchHistoryStore {
    /// Absorbs one snapshot: deduplicated append per line, then the REMOVED
    /// sweep. A line with a non-UUID match id aborts the snapshot without
    /// rolling back lines already applied.
    async fn on_change(&self, _url: &str, payload: &str) -> Result<(), TrackerError> {
        let snapshot: OddsSnapshot = serde_json::from_str(payload)
            .map_err(|err| TrackerError::InvalidResponse(err.to_string()))?;

        let mut present: HashSet<String> = HashSet::new();

        for line in snapshot.odds.split('\n').filter(|line| !line.is_empty()) {
            let match_id = line.split(',').next().unwrap_or_default();
            if !is_canonical_uuid(match_id) {
                return Err(TrackerError::InvalidMatchId(match_id.to_string()));
            }
            present.insert(match_id.to_string());

            // Dedup rule: byte-identical to the latest entry means no append.
            if self.latest_raw_line(match_id).await.as_deref() == Some(line) {
                continue;
            }

            let mapped = self.decoder.parse(line).await?;
            let rendered = serde_json::to_value(&mapped)
                .map_err(|err| TrackerError::InvalidRecord(err.to_string()))?;

            self.append(
                match_id,
                HistoryEntry {
                    timestamp_ms: time::now_ms(),
                    raw_line: line.to_string(),
                    rendered,
                    status: mapped.status,
                },
            )
            .await;
        }

        self.sweep_removed(&present).await
    }
}
