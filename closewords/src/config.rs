//! Japanese front-end configuration that extends the base `Config` from core.
//!
//! This configuration includes:
//! - All generic options from `closewords_core::Config` (flattened via serde)
//! - Where the dictionary lives and in which format
//! - Which feature column holds the reading (system dictionaries only)
//!
//! # Example
//!
//! ```rust
//! use closewords::JapaneseConfig;
//!
//! let config = JapaneseConfig::from_toml_str("workers = 2\ndictionary_format = \"tsv\"").unwrap();
//! assert_eq!(config.base().workers, 2);
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::dictionary::{DictionaryFormat, JapaneseDictionary, BUNDLED_SOURCE};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct JapaneseConfig {
    /// Base configuration fields (workers, strategy, caches, etc.)
    #[serde(flatten)]
    pub base: closewords_core::Config,

    /// Dictionary resource; the bundled lexicon when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dictionary_path: Option<PathBuf>,

    pub dictionary_format: DictionaryFormat,

    /// Reading column in a system dictionary's comma-separated features
    /// (7 for IPADIC-style dictionaries).
    pub reading_field: usize,
}

impl Default for JapaneseConfig {
    fn default() -> Self {
        Self {
            base: closewords_core::Config::default(),
            dictionary_path: None,
            dictionary_format: DictionaryFormat::Auto,
            reading_field: 7,
        }
    }
}

impl JapaneseConfig {
    pub fn load_toml<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn into_base(self) -> closewords_core::Config {
        self.base
    }

    pub fn base(&self) -> &closewords_core::Config {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut closewords_core::Config {
        &mut self.base
    }

    /// Dictionary builder described by this configuration; the lexicon
    /// embedded in the crate when no path is set.
    pub fn dictionary(&self) -> JapaneseDictionary {
        let dictionary = match &self.dictionary_path {
            Some(path) => JapaneseDictionary::new(path, self.dictionary_format),
            None => JapaneseDictionary::bundled(),
        };
        dictionary
            .with_unknown_cost(self.base.unknown_cost)
            .with_reading_field(self.reading_field)
    }
}
