pub mod config;
pub mod config_loader;
pub mod error;
pub mod ids;
pub mod listener;
pub mod models;
pub mod time;

pub use config::AppConfig;
pub use config_loader::ConfigLoader;
pub use error::TrackerError;
pub use ids::is_canonical_uuid;
pub use listener::SnapshotListener;
pub use models::{
    Competitor, CompetitorSide, Competitors, MappedMatch, MatchStatus, OddsSnapshot, ScorePeriod,
};
