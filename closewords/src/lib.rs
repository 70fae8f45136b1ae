//! closewords crate root
//!
//! Japanese front-end for `closewords-core`: a Hepburn romanizer, dictionary
//! loading (bundled lexicon, compiled lexicon, or a vibrato system
//! dictionary) and constructors for a ready-to-use engine.
//!
//! ```no_run
//! # async fn demo() -> closewords::Result<()> {
//! let engine = closewords::japanese()?;
//! let best = engine
//!     .close_words("ねこ", vec!["いぬ".into(), "ねずみ".into(), "猫".into(), "ねころび".into()], false)
//!     .await?;
//! println!("{:?}", best.words());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dictionary;
pub mod romaji;

use closewords_core::DictionaryBuilder;

pub use closewords_core::{
    Candidate, CloseWordsError, Config, Ranking, Result, ScoredCandidate, ScoringStrategy,
    Strategy,
};

pub use config::JapaneseConfig;
pub use dictionary::{compile_tsv, DictionaryFormat, JapaneseDictionary, BUNDLED_LEXICON};
pub use romaji::Romaji;

/// Engine over a Japanese dictionary.
pub type CloseWords = closewords_core::CloseWords<JapaneseDictionary, Romaji>;

/// Engine with default settings over the bundled lexicon.
pub fn japanese() -> Result<CloseWords> {
    with_config(JapaneseConfig::default())
}

/// Engine described by `config`. The dictionary is loaded on first use.
pub fn with_config(config: JapaneseConfig) -> Result<CloseWords> {
    let dictionary = config.dictionary();
    tracing::debug!(
        source = %dictionary.source(),
        workers = config.base().worker_count(),
        "creating engine"
    );
    closewords_core::CloseWords::new(dictionary, Romaji, config.base())
}
