//! Error type shared by every stage of the pipeline.

use thiserror::Error;

/// Errors surfaced to callers of `CloseWords::close_words`.
///
/// The type is `Clone` so that a failed dictionary build can be replayed to
/// every caller that asks for the tokenizer afterwards.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CloseWordsError {
    /// Malformed `word`, `candidates` or `raw` argument.
    #[error("invalid argument: {0}")]
    Validation(String),

    /// The dictionary / tokenizer could not be constructed.
    #[error("failed to build dictionary from {source_path}: {reason}")]
    DictionaryBuild { source_path: String, reason: String },

    /// A specific word could not be tokenized or romanized.
    #[error("error processing word \"{word}\": {reason}")]
    Tokenization { word: String, reason: String },

    /// The normalization worker died or went away without replying.
    #[error("normalization worker failed: {0}")]
    WorkerFailure(String),
}

impl CloseWordsError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        CloseWordsError::Validation(message.into())
    }

    /// True for errors caused by the caller's input rather than the runtime.
    pub fn is_validation(&self) -> bool {
        matches!(self, CloseWordsError::Validation(_))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CloseWordsError>;
