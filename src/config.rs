//! Runtime settings.
//!
//! Layered lowest to highest: built-in defaults, an optional config file,
//! `CLUSTERWATCH_*` environment variables, then command-line overrides.

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::engine::{CollectionFilter, DEFAULT_INTERNAL_PREFIX, DEFAULT_OPLOG_NAME};
use crate::error::MonitorError;

/// Prefix of environment variables read into [`Settings`].
pub const ENV_PREFIX: &str = "CLUSTERWATCH";

/// Monitor settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Connection string, e.g. `mongodb://host1,host2/?replicaSet=rs0`.
    pub connection_string: String,
    pub poll_interval_ms: u64,
    pub internal_name_prefixes: Vec<String>,
    pub internal_collection_names: Vec<String>,
    pub per_member_targeting: bool,
    /// Default tracing filter, used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            connection_string: "mongodb://localhost:27017".to_string(),
            poll_interval_ms: 5000,
            internal_name_prefixes: vec![DEFAULT_INTERNAL_PREFIX.to_string()],
            internal_collection_names: vec![DEFAULT_OPLOG_NAME.to_string()],
            per_member_targeting: false,
            log_level: "info".to_string(),
        }
    }
}

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub connection_string: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub per_member_targeting: Option<bool>,
    pub log_level: Option<String>,
}

impl Settings {
    /// Load settings from every layer and validate them.
    pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<Self, MonitorError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let poll_interval_ms = overrides
            .poll_interval_ms
            .map(|ms| i64::try_from(ms).unwrap_or(i64::MAX));

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("internal_name_prefixes")
                    .with_list_parse_key("internal_collection_names"),
            )
            .set_override_option("connection_string", overrides.connection_string)?
            .set_override_option("poll_interval_ms", poll_interval_ms)?
            .set_override_option("per_member_targeting", overrides.per_member_targeting)?
            .set_override_option("log_level", overrides.log_level)?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.poll_interval_ms == 0 {
            return Err(MonitorError::Config(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.connection_string.trim().is_empty() {
            return Err(MonitorError::Config(
                "connection_string must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// The internal-collection filter described by these settings.
    pub fn filter(&self) -> CollectionFilter {
        CollectionFilter::new(
            self.internal_name_prefixes.clone(),
            self.internal_collection_names.clone(),
        )
    }
}
