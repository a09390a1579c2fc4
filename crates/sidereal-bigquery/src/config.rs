//! Configuration types for the BigQuery exporter.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::export::Signal;

/// Default table receiving span rows.
pub const DEFAULT_TRACE_TABLE: &str = "trace";

/// Default table receiving metric data point rows.
pub const DEFAULT_METRIC_TABLE: &str = "metric";

/// Default table receiving log record rows.
pub const DEFAULT_LOG_TABLE: &str = "log";

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "bigquery.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "BIGQUERY_";

/// BigQuery exporter configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    /// Destination dataset.
    pub dataset: DatasetConfig,
}

impl ExporterConfig {
    /// Load configuration from files and environment.
    ///
    /// Configuration is loaded in order (later sources override earlier):
    /// 1. Default values
    /// 2. `bigquery.toml` in current directory
    /// 3. Environment variables prefixed with `BIGQUERY_`
    ///
    /// # Errors
    ///
    /// Returns an error if a source holds a value of the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from a specific file path.
    ///
    /// A missing file is not an error; defaults and the environment apply.
    ///
    /// # Errors
    ///
    /// Returns an error if a source holds a value of the wrong type.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("_"))
            .extract()
            .map_err(|e| ConfigError(e.to_string()))
    }

    /// Table name for a signal.
    pub fn table(&self, signal: Signal) -> &str {
        let tables = &self.dataset.table;
        match signal {
            Signal::Traces => &tables.trace,
            Signal::Metrics => &tables.metric,
            Signal::Logs => &tables.log,
        }
    }
}

/// Destination dataset configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Cloud project owning the dataset. Empty means the client default.
    pub project: String,
    /// Dataset identifier.
    pub id: String,
    /// Per-signal table names.
    pub table: TableConfig,
}

/// Per-signal table names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Span table (default: `trace`).
    pub trace: String,
    /// Metric data point table (default: `metric`).
    pub metric: String,
    /// Log record table (default: `log`).
    pub log: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            trace: DEFAULT_TRACE_TABLE.to_owned(),
            metric: DEFAULT_METRIC_TABLE.to_owned(),
            log: DEFAULT_LOG_TABLE.to_owned(),
        }
    }
}
