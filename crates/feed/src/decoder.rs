//! Feed record decoder.
//!
//! Parses one comma-delimited snapshot record and denormalizes every opaque
//! identifier through the mapping resolver. The decoder does not filter by
//! status; it renders whatever status the dictionary resolves.

use crate::resolver::MappingResolver;
use livematch_core::models::{Competitor, CompetitorSide, Competitors, MappedMatch, ScorePeriod};
use livematch_core::{is_canonical_uuid, time, TrackerError};
use std::collections::BTreeMap;
use std::sync::Arc;

// Field positions of one raw feed record.
const MATCH_ID: usize = 0;
const SPORT_ID: usize = 1;
const COMPETITION_ID: usize = 2;
const START_TIME: usize = 3;
const HOME_ID: usize = 4;
const AWAY_ID: usize = 5;
const STATUS_ID: usize = 6;
const SCORES: usize = 7;

pub struct MatchDecoder {
    resolver: Arc<MappingResolver>,
}

impl MatchDecoder {
    pub fn new(resolver: Arc<MappingResolver>) -> Self {
        Self { resolver }
    }

    /// Parses and denormalizes one feed record.
    ///
    /// # Errors
    ///
    /// `InvalidRecord` on any grammar violation; resolver errors pass
    /// through unchanged.
    pub async fn parse(&self, line: &str) -> Result<MappedMatch, TrackerError> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 7 && fields.len() != 8 {
            return Err(TrackerError::InvalidRecord(format!(
                "expected 7 or 8 fields, got {}",
                fields.len()
            )));
        }

        for position in [MATCH_ID, SPORT_ID, COMPETITION_ID, HOME_ID, AWAY_ID, STATUS_ID] {
            if !is_canonical_uuid(fields[position]) {
                return Err(TrackerError::InvalidRecord(format!(
                    "field {position} is not a UUID: {:?}",
                    fields[position]
                )));
            }
        }

        let start_ms: i64 = fields[START_TIME].parse().map_err(|_| {
            TrackerError::InvalidRecord(format!("bad start time: {:?}", fields[START_TIME]))
        })?;
        let start_time = time::millis_to_iso(start_ms).ok_or_else(|| {
            TrackerError::InvalidRecord(format!("start time out of range: {start_ms}"))
        })?;

        let raw_periods = parse_score_periods(fields.get(SCORES).copied().unwrap_or(""))?;

        let sport = self.resolver.get(fields[SPORT_ID]).await?;
        let competition = self.resolver.get(fields[COMPETITION_ID]).await?;
        let status = self.resolver.get(fields[STATUS_ID]).await?;
        let home = self.resolver.get(fields[HOME_ID]).await?;
        let away = self.resolver.get(fields[AWAY_ID]).await?;

        let mut scores = BTreeMap::new();
        for raw in raw_periods {
            let period = self.resolver.get(&raw.period_id).await?;
            scores.insert(
                period.clone(),
                ScorePeriod {
                    period,
                    home: raw.home,
                    away: raw.away,
                },
            );
        }

        Ok(MappedMatch {
            id: fields[MATCH_ID].to_string(),
            status,
            scores,
            start_time,
            sport,
            competitors: Competitors {
                home: Competitor {
                    side: CompetitorSide::Home,
                    name: home,
                },
                away: Competitor {
                    side: CompetitorSide::Away,
                    name: away,
                },
            },
            competition,
        })
    }
}

struct RawScorePeriod {
    period_id: String,
    home: i64,
    away: i64,
}

/// Parses the optional `period_id@home:away|…` sub-grammar. An absent or
/// empty field means no periods.
fn parse_score_periods(field: &str) -> Result<Vec<RawScorePeriod>, TrackerError> {
    if field.is_empty() {
        return Ok(Vec::new());
    }

    let mut periods = Vec::new();
    for segment in field.split('|') {
        let Some((period_id, scores)) = segment.split_once('@') else {
            return Err(TrackerError::InvalidRecord(format!(
                "bad score segment: {segment:?}"
            )));
        };
        if !is_canonical_uuid(period_id) {
            return Err(TrackerError::InvalidRecord(format!(
                "score period id is not a UUID: {period_id:?}"
            )));
        }
        let Some((home, away)) = scores.split_once(':') else {
            return Err(TrackerError::InvalidRecord(format!(
                "bad score pair: {scores:?}"
            )));
        };
        let home = home.parse().map_err(|_| {
            TrackerError::InvalidRecord(format!("bad home score: {home:?}"))
        })?;
        let away = away.parse().map_err(|_| {
            TrackerError::InvalidRecord(format!("bad away score: {away:?}"))
        })?;

        periods.push(RawScorePeriod {
            period_id: period_id.to_string(),
            home,
            away,
        });
    }

    Ok(periods)
}
