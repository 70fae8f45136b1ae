//! Word -> romanized reading.
//!
//! `normalize` tokenizes a word, takes each morpheme's reading (or its
//! surface when the dictionary has none), joins them without separator and
//! romanizes the result. The same word against the same dictionary always
//! produces the same reading.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::cache::{DictionaryBuilder, DictionaryCache};
use crate::candidate::Word;
use crate::error::{CloseWordsError, Result};
use crate::tokenizer::Tokenizer;
use crate::{utils, Config};

/// Romanization table: native phonetic script -> Latin alphabet.
pub trait Romanizer: Send + Sync {
    fn to_phonetic_latin(&self, text: &str) -> String;
}

/// Worker-local memo of word -> reading.
///
/// Owned by a single worker thread, so it needs no locking.
pub struct ReadingCache {
    inner: Option<LruCache<String, String>>,
    hits: usize,
    misses: usize,
}

impl ReadingCache {
    /// A capacity of 0 disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: NonZeroUsize::new(capacity).map(LruCache::new),
            hits: 0,
            misses: 0,
        }
    }

    pub fn disabled() -> Self {
        Self::new(0)
    }

    fn get(&mut self, word: &str) -> Option<String> {
        let found = self.inner.as_mut()?.get(word).cloned();
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    fn put(&mut self, word: &str, reading: &str) {
        if let Some(cache) = self.inner.as_mut() {
            cache.put(word.to_string(), reading.to_string());
        }
    }

    /// (hits, misses)
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }

    pub fn len(&self) -> usize {
        self.inner.as_ref().map_or(0, LruCache::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct Normalizer<B: DictionaryBuilder, R: Romanizer> {
    dictionary: Arc<DictionaryCache<B>>,
    romanizer: R,
    normalize_unicode: bool,
}

impl<B: DictionaryBuilder, R: Romanizer> Normalizer<B, R> {
    pub fn new(dictionary: Arc<DictionaryCache<B>>, romanizer: R, config: &Config) -> Self {
        Self {
            dictionary,
            romanizer,
            normalize_unicode: config.normalize_unicode,
        }
    }

    pub fn dictionary(&self) -> &DictionaryCache<B> {
        &self.dictionary
    }

    /// Romanized reading of `word`.
    ///
    /// A dictionary build failure comes back as `DictionaryBuild`; a
    /// tokenizer failure as `Tokenization` naming `word`.
    pub fn normalize(&self, word: &str) -> Result<String> {
        let tokenizer = self.dictionary.tokenizer()?;
        let text = if self.normalize_unicode {
            utils::normalize(word)
        } else {
            word.to_string()
        };

        let morphemes = tokenizer
            .tokenize(&text)
            .map_err(|e| CloseWordsError::Tokenization {
                word: word.to_string(),
                reason: format!("{:#}", e),
            })?;
        let native: String = morphemes.iter().map(|m| m.reading_or_surface()).collect();
        Ok(self.romanizer.to_phonetic_latin(&native))
    }

    /// Readings for a whole batch, index-aligned with `batch`.
    ///
    /// Words carrying a pronounce override use it verbatim. The first
    /// failure aborts the batch.
    pub fn normalize_batch(&self, batch: &[Word], cache: &mut ReadingCache) -> Result<Vec<String>> {
        batch
            .iter()
            .map(|word| {
                if let Some(reading) = word.pronounce() {
                    return Ok(reading.to_string());
                }
                if let Some(reading) = cache.get(word.text()) {
                    return Ok(reading);
                }
                let reading = self.normalize(word.text())?;
                cache.put(word.text(), &reading);
                Ok(reading)
            })
            .collect()
    }
}
