//! Input and output records of a similarity query.
//!
//! This module provides:
//! - `Candidate`: what a caller passes in (plain text or text + reading override)
//! - `Word`: the validated internal form every stage works with
//! - `ScoredCandidate`: a candidate word with its final score

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CloseWordsError, Result};

/// Characters a caller-supplied reading may use: the romanized alphabet plus
/// the long-vowel dash and the `n'` separator produced by romanization.
static PHONETIC_ALPHABET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z'\-]+$").expect("phonetic alphabet pattern is valid"));

/// A word as supplied by the caller.
///
/// Deserializes from either a JSON string or `{"word": .., "pronounce": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Candidate {
    /// Plain text; its reading is derived by the normalizer.
    Plain(String),
    /// Text with an already-romanized reading that bypasses normalization.
    Pronounced { word: String, pronounce: String },
}

impl Candidate {
    pub fn plain<T: Into<String>>(word: T) -> Self {
        Candidate::Plain(word.into())
    }

    pub fn pronounced<T: Into<String>, P: Into<String>>(word: T, pronounce: P) -> Self {
        Candidate::Pronounced {
            word: word.into(),
            pronounce: pronounce.into(),
        }
    }

    /// The surface text, regardless of variant.
    pub fn word(&self) -> &str {
        match self {
            Candidate::Plain(word) => word,
            Candidate::Pronounced { word, .. } => word,
        }
    }

    /// Validate and convert into the internal `Word` record.
    ///
    /// A pronounced pair needs a non-empty word and a non-empty reading made
    /// only of the phonetic alphabet. The reading is kept verbatim.
    pub fn resolve(&self) -> Result<Word> {
        match self {
            Candidate::Plain(word) => Ok(Word::new(word.clone())),
            Candidate::Pronounced { word, pronounce } => {
                if word.is_empty() {
                    return Err(CloseWordsError::validation(
                        "a pronounced word needs a non-empty 'word'",
                    ));
                }
                if pronounce.is_empty() {
                    return Err(CloseWordsError::validation(format!(
                        "'pronounce' for \"{}\" must not be empty",
                        word
                    )));
                }
                if !PHONETIC_ALPHABET.is_match(pronounce) {
                    return Err(CloseWordsError::validation(format!(
                        "'pronounce' for \"{}\" must be alphabetic, got \"{}\"",
                        word, pronounce
                    )));
                }
                Ok(Word::with_pronounce(word.clone(), pronounce.clone()))
            }
        }
    }

    /// Parse a single untyped value (string or `{word, pronounce}` object).
    pub fn from_value(value: &Value) -> Result<Self> {
        Self::parse_value(value).ok_or_else(|| {
            CloseWordsError::validation(
                "word must be a string or an object with 'word' and 'pronounce'",
            )
        })
    }

    /// Parse an untyped candidate list. Every element must be a string or a
    /// `{word, pronounce}` object.
    pub fn list_from_value(value: &Value) -> Result<Vec<Self>> {
        let invalid = || {
            CloseWordsError::validation(
                "candidates must be an array of strings or objects with 'word' and 'pronounce'",
            )
        };
        let items = value.as_array().ok_or_else(invalid)?;
        items
            .iter()
            .map(|item| Self::parse_value(item).ok_or_else(invalid))
            .collect()
    }

    fn parse_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Candidate::Plain(s.clone())),
            Value::Object(map) => {
                let word = map.get("word")?.as_str()?;
                let pronounce = map.get("pronounce")?.as_str()?;
                if word.is_empty() || pronounce.is_empty() {
                    return None;
                }
                Some(Candidate::pronounced(word, pronounce))
            }
            _ => None,
        }
    }
}

impl From<&str> for Candidate {
    fn from(word: &str) -> Self {
        Candidate::Plain(word.to_string())
    }
}

impl From<String> for Candidate {
    fn from(word: String) -> Self {
        Candidate::Plain(word)
    }
}

/// A validated word, immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    text: String,
    pronounce: Option<String>,
}

impl Word {
    pub fn new<T: Into<String>>(text: T) -> Self {
        Self {
            text: text.into(),
            pronounce: None,
        }
    }

    pub fn with_pronounce<T: Into<String>, P: Into<String>>(text: T, pronounce: P) -> Self {
        Self {
            text: text.into(),
            pronounce: Some(pronounce.into()),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Caller-asserted reading, if any.
    pub fn pronounce(&self) -> Option<&str> {
        self.pronounce.as_deref()
    }
}

/// A candidate word with its similarity score in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub word: String,
    pub score: f64,
}

impl ScoredCandidate {
    pub fn new<T: Into<String>>(word: T, score: f64) -> Self {
        ScoredCandidate {
            word: word.into(),
            score,
        }
    }
}
