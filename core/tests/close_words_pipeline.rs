// core/tests/close_words_pipeline.rs
//
// End-to-end tests for the CloseWords engine over an in-memory lexicon.
//
// Tests cover:
// - Exact matches winning over phonetic twins and near spellings
// - Raw output shape, ordering and score range
// - Validation failing before any dictionary work
// - Dictionary build failures reaching every caller, built once
// - Tokenization failures naming the offending word
// - Determinism across repeated queries

use closewords_core::{
    Candidate, CloseWords, CloseWordsError, Config, DictionaryBuilder, Lexicon, LexiconTokenizer,
    Morpheme, Ranking, Romanizer, Tokenizer,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Kana -> romaji for the few syllables these tests use.
struct MiniRomaji;

impl Romanizer for MiniRomaji {
    fn to_phonetic_latin(&self, text: &str) -> String {
        text.chars()
            .map(|c| {
                // katakana -> hiragana
                let c = match c {
                    'ァ'..='ヶ' => char::from_u32(c as u32 - 0x60).unwrap_or(c),
                    _ => c,
                };
                match c {
                    'と' => "to",
                    'う' => "u",
                    'き' => "ki",
                    'ょ' => "yo",
                    'ひ' => "hi",
                    'が' => "ga",
                    'し' => "shi",
                    'ね' => "ne",
                    'こ' => "ko",
                    'い' => "i",
                    'ぬ' => "nu",
                    _ => return c.to_string(),
                }
                .to_string()
            })
            .collect()
    }
}

struct MiniDict {
    builds: Arc<AtomicUsize>,
}

impl MiniDict {
    fn new() -> (Self, Arc<AtomicUsize>) {
        let builds = Arc::new(AtomicUsize::new(0));
        (Self { builds: Arc::clone(&builds) }, builds)
    }
}

impl DictionaryBuilder for MiniDict {
    type Tokenizer = LexiconTokenizer;

    fn source(&self) -> String {
        "memory://mini".into()
    }

    fn build(&self) -> anyhow::Result<LexiconTokenizer> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        let mut lx = Lexicon::new();
        lx.insert("東京", "トウキョウ", 10);
        lx.insert("東", "ヒガシ", 5);
        lx.insert("京", "キョウ", 5);
        lx.insert("猫", "ネコ", 8);
        lx.insert("犬", "イヌ", 8);
        Ok(LexiconTokenizer::new(lx, 10.0))
    }
}

struct MissingDict {
    builds: Arc<AtomicUsize>,
}

impl DictionaryBuilder for MissingDict {
    type Tokenizer = LexiconTokenizer;

    fn source(&self) -> String {
        "/nonexistent/dict".into()
    }

    fn build(&self) -> anyhow::Result<LexiconTokenizer> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("no such file or directory")
    }
}

struct PickyTokenizer;

impl Tokenizer for PickyTokenizer {
    fn tokenize(&self, text: &str) -> anyhow::Result<Vec<Morpheme>> {
        if text.contains('\u{FFFD}') {
            anyhow::bail!("replacement character in input");
        }
        Ok(vec![Morpheme::new(text, None)])
    }
}

struct PickyDict;

impl DictionaryBuilder for PickyDict {
    type Tokenizer = PickyTokenizer;

    fn source(&self) -> String {
        "memory://picky".into()
    }

    fn build(&self) -> anyhow::Result<PickyTokenizer> {
        Ok(PickyTokenizer)
    }
}

fn engine() -> (CloseWords<MiniDict, MiniRomaji>, Arc<AtomicUsize>) {
    let (dict, builds) = MiniDict::new();
    (CloseWords::new(dict, MiniRomaji, &Config::default()).unwrap(), builds)
}

fn plain(words: &[&str]) -> Vec<Candidate> {
    words.iter().map(|w| Candidate::plain(*w)).collect()
}

#[tokio::test]
async fn latin_exact_match_wins() {
    let (e, _) = engine();
    let animals = ["dog", "mouse", "cat", "kitten"];
    let r = e.close_words("cat", plain(&animals), false).await.unwrap();
    assert_eq!(r, Ranking::Words(vec!["cat".to_string()]));

    let scored = e
        .close_words("cat", plain(&animals), true)
        .await
        .unwrap()
        .into_scored()
        .unwrap();
    let words: Vec<&str> = scored.iter().map(|c| c.word.as_str()).collect();
    assert_eq!(words[..2], ["cat", "kitten"]);
}

#[tokio::test]
async fn kanji_exact_match_beats_phonetic_twin() {
    let (e, _) = engine();
    let r = e
        .close_words(
            "東京",
            plain(&["東京", "とっこう", "東きょう", "とう京", "とうきょう", "とーきょー"]),
            false,
        )
        .await
        .unwrap();
    assert_eq!(r.words(), vec!["東京"]);

    let scored = e
        .close_words("東京", plain(&["とうきょう", "東きょう", "東京"]), true)
        .await
        .unwrap()
        .into_scored()
        .unwrap();
    assert_eq!(scored[0].word, "東京");
    assert_eq!(scored[0].score, 1.0);
    // same reading, nothing shared in writing
    let twin = scored.iter().find(|c| c.word == "とうきょう").unwrap();
    assert!((twin.score - 0.42).abs() < 1e-9, "twin scored {}", twin.score);
}

#[tokio::test]
async fn raw_lists_everything_sorted_and_in_range() {
    let (e, _) = engine();
    let candidates = plain(&["いぬ", "猫", "ねこ", "ネコ"]);
    let scored = e
        .close_words("ねこ", candidates.clone(), true)
        .await
        .unwrap()
        .into_scored()
        .unwrap();

    assert_eq!(scored.len(), candidates.len());
    assert_eq!(scored[0].word, "ねこ");
    assert!(scored.iter().all(|c| (0.0..=1.0).contains(&c.score)));
    assert!(scored.windows(2).all(|w| w[0].score >= w[1].score));
    let mut words: Vec<_> = scored.iter().map(|c| c.word.as_str()).collect();
    let mut expected: Vec<_> = candidates.iter().map(Candidate::word).collect();
    words.sort_unstable();
    expected.sort_unstable();
    assert_eq!(words, expected);
}

#[tokio::test]
async fn non_raw_is_the_top_scoring_subset() {
    let (e, _) = engine();
    let candidates = plain(&["猫", "ねこ", "犬", "ねこ"]);
    let scored = e
        .close_words("ねこ", candidates.clone(), true)
        .await
        .unwrap()
        .into_scored()
        .unwrap();
    let best = scored[0].score;
    let expected: Vec<&str> = scored
        .iter()
        .filter(|c| c.score == best)
        .map(|c| c.word.as_str())
        .collect();

    let winners = e.close_words("ねこ", candidates, false).await.unwrap();
    assert_eq!(winners.words(), expected);
    // duplicates tie and both come back
    assert_eq!(winners.words(), vec!["ねこ", "ねこ"]);
}

#[tokio::test]
async fn repeated_queries_are_identical() {
    let (e, builds) = engine();
    let candidates = plain(&["東京", "東", "京都", "とうきょう"]);
    let first = e.close_words("東京", candidates.clone(), true).await.unwrap();
    let second = e.close_words("東京", candidates, true).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(builds.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn pronounce_overrides_replace_the_reading() {
    let (e, _) = engine();
    let r = e
        .close_words(
            Candidate::pronounced("TKY", "toukyou"),
            vec![
                Candidate::pronounced("Tokyo", "toukyou"),
                Candidate::pronounced("Kyoto", "kyouto"),
            ],
            true,
        )
        .await
        .unwrap();
    assert_eq!(r.words()[0], "Tokyo");
}

#[tokio::test]
async fn validation_happens_before_the_dictionary_is_touched() {
    let (e, builds) = engine();

    let err = e
        .close_words("猫", vec![Candidate::pronounced("猫", "ねこ")], false)
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err}");

    let err = e
        .close_words_json(&json!(42), &json!(["猫"]), None)
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err}");

    let err = e
        .close_words_json(&json!("猫"), &json!("猫"), None)
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err}");

    let err = e
        .close_words_json(&json!("猫"), &json!(["猫", {"word": "犬"}]), None)
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err}");

    assert!(!e.dictionary().build_attempted());
    assert_eq!(builds.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn build_failure_is_shared_and_never_retried() {
    let builds = Arc::new(AtomicUsize::new(0));
    let dict = MissingDict { builds: Arc::clone(&builds) };
    let e = CloseWords::new(dict, MiniRomaji, &Config::default()).unwrap();

    let first = e.close_words("猫", plain(&["犬"]), false).await.unwrap_err();
    let second = e.close_words("犬", plain(&["猫"]), true).await.unwrap_err();

    match &first {
        CloseWordsError::DictionaryBuild { source_path, reason } => {
            assert_eq!(source_path, "/nonexistent/dict");
            assert!(reason.contains("no such file"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(first, second);
    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert!(!e.dictionary().is_built());
}

#[tokio::test]
async fn tokenization_failure_names_the_word() {
    let e = CloseWords::new(PickyDict, MiniRomaji, &Config::default()).unwrap();
    let err = e
        .close_words("fine", plain(&["ok", "bad\u{FFFD}"]), false)
        .await
        .unwrap_err();
    match err {
        CloseWordsError::Tokenization { word, .. } => assert_eq!(word, "bad\u{FFFD}"),
        other => panic!("unexpected error: {other:?}"),
    }
    // the engine keeps serving afterwards
    let r = e.close_words("ok", plain(&["ok"]), false).await.unwrap();
    assert_eq!(r.words(), vec!["ok"]);
}

#[tokio::test]
async fn decomposed_kana_reads_like_composed() {
    let (e, _) = engine();
    let readings = e
        .readings(&[Candidate::plain("ひか\u{3099}し"), Candidate::plain("ひがし")])
        .await
        .unwrap();
    assert_eq!(readings[0], readings[1]);
    assert_eq!(readings[0], "higashi");
}
