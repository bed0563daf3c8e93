pub mod history;
pub mod projector;

#[cfg(test)]
mod test_support;

pub use history::{HistoryEntry, MatchHistoryStore, GENERATED_LINE};
pub use projector::LiveStateProjector;
