//! Similarity scoring strategies.
//!
//! A strategy turns (reference, candidate) plus their romanized readings into
//! a single score in `[0, 1]`. Two formulas are provided:
//!
//! - `KanjiAware` (default): phonetic similarity, edit distance, unordered
//!   character overlap, a floored length penalty, and exact-match / positional
//!   bonuses.
//! - `Baseline`: phonetic similarity and edit distance only, damped when the
//!   candidate is longer than the reference.
//!
//! Lengths are counted in characters, not bytes.

use serde::{Deserialize, Serialize};

use crate::candidate::Word;
use crate::utils::char_len;

pub trait ScoringStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Score in `[0, 1]`; 1.0 for an exact self-match.
    fn score(&self, reference: &Word, reference_reading: &str, candidate: &Word, candidate_reading: &str) -> f64;
}

/// Selects a scoring formula from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    #[default]
    KanjiAware,
    Baseline,
}

impl Strategy {
    pub fn scorer(self) -> Box<dyn ScoringStrategy> {
        match self {
            Strategy::KanjiAware => Box::new(KanjiAware),
            Strategy::Baseline => Box::new(Baseline),
        }
    }
}

/// Individual similarity signals for one (reference, candidate) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signals {
    /// Jaro-Winkler similarity of the romanized readings.
    pub romaji: f64,
    /// 1 - normalized Levenshtein distance of the surface forms.
    pub string: f64,
    /// Share of reference characters found anywhere in the candidate.
    pub kanji_ratio: f64,
    /// Share of positions holding the same character in both words.
    pub substring_ratio: f64,
    /// Damping for length mismatch, never below 0.7.
    pub length_penalty: f64,
    pub exact_bonus: f64,
    pub substring_bonus: f64,
}

impl Signals {
    pub fn compute(reference: &str, reference_reading: &str, candidate: &str, candidate_reading: &str) -> Self {
        let ref_len = char_len(reference);
        let cand_len = char_len(candidate);
        let max_len = ref_len.max(cand_len);

        let romaji = strsim::jaro_winkler(reference_reading, candidate_reading);

        let string = if max_len == 0 {
            1.0
        } else {
            1.0 - strsim::levenshtein(reference, candidate) as f64 / max_len as f64
        };

        let shared = reference.chars().filter(|c| candidate.contains(*c)).count();
        let kanji_ratio = ratio(shared, max_len);

        let positional = reference
            .chars()
            .zip(candidate.chars())
            .filter(|(a, b)| a == b)
            .count()
            .min(ref_len)
            .min(cand_len);
        let substring_ratio = ratio(positional, max_len);

        let length_penalty = if ref_len == 0 {
            if cand_len == 0 {
                1.0
            } else {
                0.7
            }
        } else {
            let diff = ref_len.abs_diff(cand_len) as f64;
            (1.0 - diff / ref_len as f64).max(0.7)
        };

        let exact_bonus = if reference == candidate {
            0.3
        } else {
            kanji_ratio * 0.4
        };

        let substring_bonus = if substring_ratio > 0.5 {
            substring_ratio * 0.1
        } else {
            0.0
        };

        Self {
            romaji,
            string,
            kanji_ratio,
            substring_ratio,
            length_penalty,
            exact_bonus,
            substring_bonus,
        }
    }
}

/// `part / whole`, treating two empty words as identical.
fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        1.0
    } else {
        part as f64 / whole as f64
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KanjiAware;

impl ScoringStrategy for KanjiAware {
    fn name(&self) -> &'static str {
        "kanji-aware"
    }

    fn score(&self, reference: &Word, reference_reading: &str, candidate: &Word, candidate_reading: &str) -> f64 {
        let s = Signals::compute(reference.text(), reference_reading, candidate.text(), candidate_reading);
        let combined = (s.romaji * 0.6 + s.string * 0.1 + s.kanji_ratio * 0.3) * s.length_penalty
            + s.exact_bonus
            + s.substring_bonus;
        combined.min(1.0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Baseline;

impl ScoringStrategy for Baseline {
    fn name(&self) -> &'static str {
        "baseline"
    }

    fn score(&self, reference: &Word, reference_reading: &str, candidate: &Word, candidate_reading: &str) -> f64 {
        let s = Signals::compute(reference.text(), reference_reading, candidate.text(), candidate_reading);
        let ref_len = char_len(reference.text());
        let cand_len = char_len(candidate.text());
        // only longer candidates are damped
        let length_penalty = if cand_len == 0 {
            1.0
        } else {
            (ref_len as f64 / cand_len as f64).min(1.0)
        };
        ((s.romaji * 0.7 + s.string * 0.3) * length_penalty).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kanji(reference: &str, rr: &str, candidate: &str, cr: &str) -> f64 {
        KanjiAware.score(&Word::new(reference), rr, &Word::new(candidate), cr)
    }

    #[test]
    fn exact_match_is_one_for_both_strategies() {
        assert_eq!(kanji("東京", "toukyou", "東京", "toukyou"), 1.0);
        assert_eq!(kanji("cat", "cat", "cat", "cat"), 1.0);
        let w = Word::new("ねこ");
        assert!((Baseline.score(&w, "neko", &w, "neko") - 1.0).abs() < 1e-12);
    }

    #[test]
    fn signals_for_partial_kanji_match() {
        let s = Signals::compute("東京", "toukyou", "東きょう", "higashikyou");
        assert_eq!(s.kanji_ratio, 0.25);
        assert_eq!(s.string, 0.25);
        assert_eq!(s.substring_ratio, 0.25);
        assert_eq!(s.length_penalty, 0.7);
        assert_eq!(s.exact_bonus, 0.1);
        assert_eq!(s.substring_bonus, 0.0);
    }

    #[test]
    fn phonetic_twin_scores_below_exact_match() {
        let twin = kanji("東京", "toukyou", "とうきょう", "toukyou");
        // (1.0 * 0.6) * 0.7 with no overlap bonuses
        assert!((twin - 0.42).abs() < 1e-9);
    }

    #[test]
    fn positional_bonus_kicks_in_above_half() {
        let s = Signals::compute("ねこ", "neko", "ねころび", "nekorobi");
        assert_eq!(s.substring_ratio, 0.5);
        assert_eq!(s.substring_bonus, 0.0);

        let s = Signals::compute("abcd", "abcd", "abcx", "abcx");
        assert_eq!(s.substring_ratio, 0.75);
        assert!((s.substring_bonus - 0.075).abs() < 1e-12);
    }

    #[test]
    fn length_penalty_has_a_floor() {
        let s = Signals::compute("a", "a", "abcdefgh", "abcdefgh");
        assert_eq!(s.length_penalty, 0.7);
        let s = Signals::compute("abcd", "abcd", "abc", "abc");
        assert_eq!(s.length_penalty, 0.75);
    }

    #[test]
    fn empty_words_stay_in_range() {
        for (a, b) in [("", ""), ("", "猫"), ("猫", "")] {
            let k = kanji(a, a, b, b);
            let w = Baseline.score(&Word::new(a), a, &Word::new(b), b);
            assert!((0.0..=1.0).contains(&k), "{a:?} vs {b:?}: {k}");
            assert!((0.0..=1.0).contains(&w), "{a:?} vs {b:?}: {w}");
        }
        assert_eq!(kanji("", "", "", ""), 1.0);
    }

    #[test]
    fn baseline_damps_longer_candidates_only() {
        let shorter = Baseline.score(&Word::new("abcd"), "abcd", &Word::new("ab"), "ab");
        let longer = Baseline.score(&Word::new("ab"), "ab", &Word::new("abcd"), "abcd");
        assert!(longer < shorter);
    }

    #[test]
    fn strategy_selects_scorer() {
        assert_eq!(Strategy::default().scorer().name(), "kanji-aware");
        assert_eq!(Strategy::Baseline.scorer().name(), "baseline");
    }
}
