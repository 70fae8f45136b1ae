// core/src/engine.rs
//
// The closeWords pipeline: validate -> normalize on the pool -> score -> rank.

use serde_json::Value;
use std::sync::Arc;

use crate::cache::{DictionaryBuilder, DictionaryCache};
use crate::candidate::{Candidate, ScoredCandidate, Word};
use crate::dispatcher::Dispatcher;
use crate::error::{CloseWordsError, Result};
use crate::normalizer::{Normalizer, Romanizer};
use crate::ranker::{rank, Ranking};
use crate::scoring::ScoringStrategy;
use crate::Config;

/// Ranks candidate words by similarity to a reference word.
///
/// Owns the normalization worker pool and the dictionary cache behind it, so
/// the dictionary is built once per engine no matter how many queries run,
/// and queries from several tasks proceed concurrently.
pub struct CloseWords<B: DictionaryBuilder + 'static, R: Romanizer + 'static> {
    normalizer: Arc<Normalizer<B, R>>,
    dispatcher: Dispatcher,
    strategy: Box<dyn ScoringStrategy>,
}

impl<B: DictionaryBuilder + 'static, R: Romanizer + 'static> CloseWords<B, R> {
    /// Start an engine. The dictionary is not built until the first query
    /// that needs a reading.
    pub fn new(builder: B, romanizer: R, config: &Config) -> Result<Self> {
        let cache = Arc::new(DictionaryCache::new(builder));
        let normalizer = Arc::new(Normalizer::new(cache, romanizer, config));
        let dispatcher = Dispatcher::spawn(Arc::clone(&normalizer), config)?;
        Ok(Self {
            normalizer,
            dispatcher,
            strategy: config.strategy.scorer(),
        })
    }

    /// Replace the scoring strategy.
    pub fn with_strategy(mut self, strategy: Box<dyn ScoringStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> &dyn ScoringStrategy {
        self.strategy.as_ref()
    }

    pub fn dictionary(&self) -> &DictionaryCache<B> {
        self.normalizer.dictionary()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Closest candidates to `word`.
    ///
    /// Non-raw: every candidate sharing the best score. Raw: all candidates
    /// with their scores, best first. Input is validated before anything is
    /// normalized.
    pub async fn close_words<W: Into<Candidate>>(
        &self,
        word: W,
        candidates: Vec<Candidate>,
        raw: bool,
    ) -> Result<Ranking> {
        let reference = word.into().resolve()?;
        let candidates = candidates
            .iter()
            .map(Candidate::resolve)
            .collect::<Result<Vec<Word>>>()?;

        tracing::debug!(
            reference = reference.text(),
            candidates = candidates.len(),
            raw,
            strategy = self.strategy.name(),
            "close_words"
        );

        if candidates.is_empty() {
            return Ok(Ranking::empty(raw));
        }

        let mut batch = Vec::with_capacity(candidates.len() + 1);
        batch.push(reference.clone());
        batch.extend(candidates.iter().cloned());
        let readings = self.dispatcher.normalize_batch(batch).await?;

        let (reference_reading, candidate_readings) = readings
            .split_first()
            .ok_or_else(|| CloseWordsError::WorkerFailure("empty reply for batch".into()))?;
        let scored = self.score_all(&reference, reference_reading, &candidates, candidate_readings);
        Ok(rank(scored, raw))
    }

    /// `close_words` for untyped input, e.g. parsed JSON.
    ///
    /// `word` must be a string or `{word, pronounce}`; `candidates` an array
    /// of those; `raw` a boolean when supplied (`null` is rejected, only an
    /// absent `raw` means `false`).
    pub async fn close_words_json(
        &self,
        word: &Value,
        candidates: &Value,
        raw: Option<&Value>,
    ) -> Result<Ranking> {
        let word = Candidate::from_value(word)?;
        let candidates = Candidate::list_from_value(candidates)?;
        let raw = match raw {
            None => false,
            Some(Value::Bool(b)) => *b,
            Some(_) => return Err(CloseWordsError::validation("raw must be boolean")),
        };
        self.close_words(word, candidates, raw).await
    }

    /// Romanized readings of `words`, in order.
    pub async fn readings(&self, words: &[Candidate]) -> Result<Vec<String>> {
        let batch = words
            .iter()
            .map(Candidate::resolve)
            .collect::<Result<Vec<Word>>>()?;
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        self.dispatcher.normalize_batch(batch).await
    }

    /// Score every candidate against the reference. Pure computation.
    pub fn score_all(
        &self,
        reference: &Word,
        reference_reading: &str,
        candidates: &[Word],
        candidate_readings: &[String],
    ) -> Vec<ScoredCandidate> {
        candidates
            .iter()
            .zip(candidate_readings)
            .map(|(candidate, reading)| {
                let score = self
                    .strategy
                    .score(reference, reference_reading, candidate, reading);
                ScoredCandidate::new(candidate.text(), score)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;
    use crate::scoring::Baseline;
    use crate::tokenizer::LexiconTokenizer;
    use serde_json::json;

    struct Lower;

    impl Romanizer for Lower {
        fn to_phonetic_latin(&self, text: &str) -> String {
            text.to_lowercase()
        }
    }

    struct Pets;

    impl DictionaryBuilder for Pets {
        type Tokenizer = LexiconTokenizer;

        fn source(&self) -> String {
            "memory://pets".into()
        }

        fn build(&self) -> anyhow::Result<LexiconTokenizer> {
            let mut lx = Lexicon::new();
            lx.insert("猫", "NEKO", 1);
            lx.insert("犬", "INU", 1);
            Ok(LexiconTokenizer::new(lx, 10.0))
        }
    }

    fn engine() -> CloseWords<Pets, Lower> {
        CloseWords::new(Pets, Lower, &Config::default()).unwrap()
    }

    #[tokio::test]
    async fn exact_match_wins() {
        let e = engine();
        let r = e
            .close_words("cat", vec!["cat".into(), "bat".into(), "dog".into()], false)
            .await
            .unwrap();
        assert_eq!(r, Ranking::Words(vec!["cat".into()]));
    }

    #[tokio::test]
    async fn raw_returns_every_candidate() {
        let e = engine();
        let r = e
            .close_words("猫", vec!["犬".into(), "猫".into(), "ねこ".into()], true)
            .await
            .unwrap();
        let scored = r.into_scored().unwrap();
        assert_eq!(scored.len(), 3);
        assert_eq!(scored[0].word, "猫");
        assert_eq!(scored[0].score, 1.0);
        assert!(scored.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn empty_candidates_skip_the_dictionary() {
        let e = engine();
        let r = e.close_words("猫", Vec::new(), false).await.unwrap();
        assert!(r.is_empty());
        assert!(!e.dictionary().build_attempted());
    }

    #[tokio::test]
    async fn invalid_candidate_fails_before_dispatch() {
        let e = engine();
        let err = e
            .close_words("猫", vec!["犬".into(), Candidate::pronounced("猫", "ね")], false)
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(!e.dictionary().build_attempted());
    }

    #[tokio::test]
    async fn json_entry_point_checks_raw() {
        let e = engine();
        let err = e
            .close_words_json(&json!("猫"), &json!(["犬"]), Some(&json!("yes")))
            .await
            .unwrap_err();
        assert_eq!(err, CloseWordsError::validation("raw must be boolean"));

        let err = e
            .close_words_json(&json!("猫"), &json!(["犬"]), Some(&json!(null)))
            .await
            .unwrap_err();
        assert_eq!(err, CloseWordsError::validation("raw must be boolean"));

        let r = e
            .close_words_json(
                &json!({"word": "猫", "pronounce": "neko"}),
                &json!(["犬", {"word": "ネコ", "pronounce": "neko"}]),
                None,
            )
            .await
            .unwrap();
        assert_eq!(r.words(), vec!["ネコ"]);
    }

    #[tokio::test]
    async fn strategy_can_be_swapped() {
        let e = engine().with_strategy(Box::new(Baseline));
        assert_eq!(e.strategy().name(), "baseline");
        let r = e.close_words("dog", vec!["dog".into()], true).await.unwrap();
        assert_eq!(r.len(), 1);
    }

    #[tokio::test]
    async fn readings_follow_input_order() {
        let e = engine();
        let readings = e
            .readings(&["犬".into(), "猫".into(), Candidate::pronounced("x", "ex")])
            .await
            .unwrap();
        assert_eq!(readings, vec!["inu", "neko", "ex"]);
    }
}
