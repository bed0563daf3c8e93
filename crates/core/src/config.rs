use serde::{Deserialize, Serialize};

/// Tracker process configuration, sourced from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Log verbosity handed to the tracing subscriber.
    pub log_level: String,
    /// Upstream dictionary endpoint consulted by the resolver.
    pub mapping_endpoint: String,
    /// Upstream feed endpoint observed by the poller.
    pub odds_endpoint: String,
    /// Sleep between poll cycles; 0 polls continuously.
    pub odds_polling_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 4000,
            log_level: "info".to_string(),
            mapping_endpoint: "http://127.0.0.0:3000/api/mappings".to_string(),
            odds_endpoint: "http://127.0.0.1:3000/api/state".to_string(),
            odds_polling_interval_ms: 100,
        }
    }
}
