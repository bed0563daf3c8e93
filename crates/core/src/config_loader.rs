use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Serialized},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by merging environment variables over defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment value cannot be coerced into its
    /// field's type.
    pub fn load() -> Result<AppConfig> {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Env::raw().only(&[
                "port",
                "log_level",
                "mapping_endpoint",
                "odds_endpoint",
                "odds_polling_interval_ms",
            ]))
            .extract()?;

        Ok(config)
    }
}
