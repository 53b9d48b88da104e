use crate::MapperResult;
use serde::{Deserialize, Serialize};

/// How a mapper indexes its tree.
///
/// Deserializes from JSON with every field optional:
///
/// ```json
/// { "index_keys": ["name"], "tables": ["people"], "primary_key": "id" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Fields besides the primary key that selectors may use.
    pub index_keys: Vec<String>,
    /// Top-level keys treated as tables. `None` means every key of the root.
    pub tables: Option<Vec<String>>,
    /// Field holding each entity's unique key.
    pub primary_key: String,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            index_keys: Vec::new(),
            tables: None,
            primary_key: "id".to_string(),
        }
    }
}

impl MapperConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_index_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.index_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables = Some(tables.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    /// Parses a configuration from JSON text.
    pub fn from_json_str(json: &str) -> MapperResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
