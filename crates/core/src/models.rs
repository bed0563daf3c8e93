//! Denormalized match models and wire shapes.
//!
//! `MappedMatch` is the fixed-shape record served to clients; only `scores`
//! is a true dynamic mapping, keyed by the resolved period name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot body returned by the odds endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsSnapshot {
    /// Newline-delimited raw match records.
    pub odds: String,
}

/// Match lifecycle states the tracker distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Pre,
    Live,
    Removed,
}

impl MatchStatus {
    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pre => "PRE",
            MatchStatus::Live => "LIVE",
            MatchStatus::Removed => "REMOVED",
        }
    }

    /// Parses a resolved status name, if it is one the tracker tracks.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "PRE" => Some(Self::Pre),
            "LIVE" => Some(Self::Live),
            "REMOVED" => Some(Self::Removed),
            _ => None,
        }
    }
}

/// Side of a fixture a competitor plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompetitorSide {
    #[serde(rename = "HOME")]
    Home,
    #[serde(rename = "AWAY")]
    Away,
}

/// A denormalized competitor entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competitor {
    #[serde(rename = "type")]
    pub side: CompetitorSide,
    pub name: String,
}

/// Fixed HOME/AWAY competitor pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competitors {
    #[serde(rename = "HOME")]
    pub home: Competitor,
    #[serde(rename = "AWAY")]
    pub away: Competitor,
}

/// Score line for one period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorePeriod {
    /// Resolved period name, repeated from the `scores` key.
    #[serde(rename = "type")]
    pub period: String,
    pub home: i64,
    pub away: i64,
}

/// A fully denormalized view of one match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedMatch {
    pub id: String,
    /// Resolved status name, e.g. `PRE`, `LIVE`, `REMOVED`.
    pub status: String,
    /// Period name to score line; empty when the record carried no periods.
    pub scores: BTreeMap<String, ScorePeriod>,
    /// ISO-8601 UTC instant with millisecond precision.
    pub start_time: String,
    pub sport: String,
    pub competitors: Competitors,
    pub competition: String,
}

impl MappedMatch {
    /// True when the match belongs in the public live view.
    #[must_use]
    pub fn is_tracked(&self) -> bool {
        matches!(
            MatchStatus::from_name(&self.status),
            Some(MatchStatus::Pre | MatchStatus::Live)
        )
    }
}
