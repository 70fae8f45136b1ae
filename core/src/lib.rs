//! closewords-core
//!
//! Language-agnostic pieces of the word similarity pipeline shared by
//! front-end crates (currently `closewords` for Japanese).
//!
//! The pipeline is: validate input -> normalize every word to a romanized
//! reading on a worker pool -> score each candidate against the reference
//! -> rank.
//!
//! Public API:
//! - `Candidate` / `Word` - caller input and its validated internal form
//! - `Lexicon` - surface -> reading dictionary (TSV, bincode, fst+bincode)
//! - `LexiconTokenizer` - dictionary-backed morpheme segmentation
//! - `DictionaryCache` - build-once holder for a tokenizer
//! - `Normalizer` - word -> romanized reading
//! - `Dispatcher` - worker pool running normalization batches
//! - `ScoringStrategy` - `KanjiAware` (default) and `Baseline` scorers
//! - `rank` / `Ranking` - tie-inclusive ranking
//! - `CloseWords` - the engine tying it all together
//! - `Config` - configuration and tuning knobs
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{CloseWordsError, Result};

pub mod candidate;
pub use candidate::{Candidate, ScoredCandidate, Word};

pub mod trie;
pub use trie::SurfaceTrie;

pub mod lexicon;
pub use lexicon::{LexEntry, Lexicon};

pub mod tokenizer;
pub use tokenizer::{LexiconTokenizer, Morpheme, Tokenizer};

pub mod cache;
pub use cache::{DictionaryBuilder, DictionaryCache};

pub mod normalizer;
pub use normalizer::{Normalizer, Romanizer};

pub mod dispatcher;
pub use dispatcher::Dispatcher;

pub mod scoring;
pub use scoring::{Baseline, KanjiAware, ScoringStrategy, Signals, Strategy};

pub mod ranker;
pub use ranker::{rank, Ranking};

pub mod engine;
pub use engine::CloseWords;

/// Generic configuration for the similarity pipeline.
///
/// Only language-agnostic fields live here. Dictionary locations and other
/// language-specific options belong to the front-end crate's config, which
/// flattens this one.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Number of normalization worker threads (at least 1).
    ///
    /// Every query on an engine shares this pool. With the default of one
    /// worker, concurrent `close_words` calls are normalized one batch at a
    /// time in arrival order; raise it for engines shared across tasks.
    pub workers: usize,

    /// Per-worker LRU cache of word -> reading. 0 disables the cache.
    pub reading_cache_size: usize,

    /// Scoring formula used to combine the similarity signals.
    pub strategy: Strategy,

    /// Segmentation cost of a character the dictionary does not know.
    /// A dictionary morpheme costs 1.0, so large values favour dictionary words.
    pub unknown_cost: f32,

    /// Apply NFC normalization before tokenizing.
    pub normalize_unicode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: 1,
            reading_cache_size: 256,
            strategy: Strategy::KanjiAware,
            unknown_cost: 10.0,
            normalize_unicode: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Worker count clamped to the supported minimum.
    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize input strings to NFC.
    ///
    /// Whitespace is kept: it is part of the word being compared.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>()
    }

    /// Number of Unicode scalar values in `s`.
    pub fn char_len(s: &str) -> usize {
        s.chars().count()
    }
}
