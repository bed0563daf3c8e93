pub mod decoder;
pub mod poller;
pub mod resolver;

pub use decoder::MatchDecoder;
pub use poller::{FeedPoller, PollerStats, PollerStatus};
pub use resolver::MappingResolver;

use livematch_core::TrackerError;

/// Maps a reqwest failure onto the tracker taxonomy.
pub(crate) fn fetch_error(err: reqwest::Error) -> TrackerError {
    if err.is_timeout() {
        TrackerError::Timeout
    } else {
        TrackerError::FetchFailed(err.to_string())
    }
}
