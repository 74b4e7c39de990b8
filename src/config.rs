//! Façade settings.
//!
//! [`DalConfig::load`] reads the `[dal]` section of `config/config.toml` and
//! `TAGDAL__DAL__*` environment variables, e.g. `TAGDAL__DAL__CREATE_BATCH_SIZE=500`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const CONFIG_FILE: &str = "config/config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DalConfig {
    /// Rows per INSERT in `create_many`.
    #[serde(default = "default_create_batch_size")]
    pub create_batch_size: usize,
    /// Log every statement at debug level.
    #[serde(default)]
    pub log_statements: bool,
    /// Upper bound applied to `QueryOptions::limit`.
    #[serde(default)]
    pub max_page_size: Option<u64>,
}

fn default_create_batch_size() -> usize {
    100
}

impl Default for DalConfig {
    fn default() -> Self {
        Self {
            create_batch_size: default_create_batch_size(),
            log_statements: false,
            max_page_size: None,
        }
    }
}

impl DalConfig {
    /// Load from `config/config.toml` (optional) and the environment.
    ///
    /// A missing `[dal]` section yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix("TAGDAL").separator("__"));

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                if std::path::Path::new(CONFIG_FILE).exists() {
                    log::warn!(
                        "failed to load config file, falling back to env. Error: {}",
                        err
                    );
                }
                Config::builder()
                    .add_source(Environment::with_prefix("TAGDAL").separator("__"))
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {}, then env-only error: {}",
                            err, env_err
                        ))
                    })?
            }
        };

        Self::from_settings(&settings)
    }

    fn from_settings(settings: &Config) -> Result<Self, ConfigError> {
        match settings.get::<DalConfig>("dal") {
            Ok(cfg) => Ok(cfg),
            Err(ConfigError::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(ConfigError::Message(format!(
                "dal configuration could not be loaded from file or environment: {}",
                e
            ))),
        }
    }

    /// Applies `max_page_size` to a requested limit.
    pub fn cap_limit(&self, limit: Option<u64>) -> Option<u64> {
        match (limit, self.max_page_size) {
            (Some(limit), Some(max)) => Some(limit.min(max)),
            (None, Some(max)) => Some(max),
            (limit, None) => limit,
        }
    }

    pub fn with_create_batch_size(mut self, size: usize) -> Self {
        self.create_batch_size = size.max(1);
        self
    }

    pub fn with_max_page_size(mut self, max: u64) -> Self {
        self.max_page_size = Some(max);
        self
    }

    pub fn with_log_statements(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_defaults() {
        let cfg = DalConfig::default();
        assert_eq!(cfg.create_batch_size, 100);
        assert!(!cfg.log_statements);
        assert_eq!(cfg.max_page_size, None);
    }

    #[test]
    fn test_from_settings() {
        let settings = Config::builder()
            .add_source(File::from_str(
                "[dal]\ncreate_batch_size = 10\nmax_page_size = 50\n",
                FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let cfg = DalConfig::from_settings(&settings).unwrap();
        assert_eq!(cfg.create_batch_size, 10);
        assert_eq!(cfg.max_page_size, Some(50));
        assert!(!cfg.log_statements);
    }

    #[test]
    fn test_missing_section_uses_defaults() {
        let settings = Config::builder().build().unwrap();
        assert_eq!(DalConfig::from_settings(&settings).unwrap(), DalConfig::default());
    }

    #[test]
    fn test_cap_limit() {
        let cfg = DalConfig::default().with_max_page_size(20);
        assert_eq!(cfg.cap_limit(Some(5)), Some(5));
        assert_eq!(cfg.cap_limit(Some(500)), Some(20));
        assert_eq!(cfg.cap_limit(None), Some(20));
        assert_eq!(DalConfig::default().cap_limit(None), None);
    }
}
