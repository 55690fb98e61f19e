use std::collections::HashMap;

use floe_common::{DataType, Result};
use serde::Deserialize;

/// One declared output column.
///
/// A column carries either a source column `name` (copied from the decoded
/// record) or a literal `value` (parsed into `type` at configure time).
/// `format` is an optional chrono format string for temporal literals.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Registry key of the table-format implementation to read with.
    pub format: String,
    pub database: String,
    pub table: String,
    pub path: String,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    pub columns: Vec<ColumnSpec>,
    /// Arbitrary storage settings, passed through to the format library
    /// unmodified.
    #[serde(default)]
    pub storage: HashMap<String, String>,
}

fn default_parallelism() -> usize {
    1
}

impl Settings {
    pub fn new() -> Result<Self> {
        let config_file_path = std::env::var("FLOE_CONNECTOR_CONFIG_PATH")
            .unwrap_or_else(|_| "crates/connectors/columnar/config/default.toml".to_string());

        let s = config::Config::builder()
            .add_source(config::File::with_name(&config_file_path).required(true))
            .add_source(config::Environment::with_prefix("FLOE_CONNECTOR").separator("__"))
            .build()?;
        Ok(s.try_deserialize()?)
    }
}
