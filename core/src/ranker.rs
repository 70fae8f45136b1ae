//! Ranking of scored candidates.

use serde::{Deserialize, Serialize};

use crate::candidate::ScoredCandidate;

/// Result of a similarity query.
///
/// Serializes untagged: a list of words, or a list of `{word, score}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ranking {
    /// Every candidate sharing the best score (tie-inclusive), best first.
    Words(Vec<String>),
    /// All candidates with scores, best first.
    Scored(Vec<ScoredCandidate>),
}

impl Ranking {
    pub fn empty(raw: bool) -> Self {
        if raw {
            Ranking::Scored(Vec::new())
        } else {
            Ranking::Words(Vec::new())
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Ranking::Words(w) => w.len(),
            Ranking::Scored(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Winning words, in order. For scored rankings this is every word.
    pub fn words(&self) -> Vec<&str> {
        match self {
            Ranking::Words(w) => w.iter().map(String::as_str).collect(),
            Ranking::Scored(s) => s.iter().map(|c| c.word.as_str()).collect(),
        }
    }

    pub fn into_words(self) -> Option<Vec<String>> {
        match self {
            Ranking::Words(w) => Some(w),
            Ranking::Scored(_) => None,
        }
    }

    pub fn into_scored(self) -> Option<Vec<ScoredCandidate>> {
        match self {
            Ranking::Scored(s) => Some(s),
            Ranking::Words(_) => None,
        }
    }
}

/// Sort by score, highest first, keeping input order among equal scores.
///
/// With `raw` the full sorted list is returned. Otherwise only the words whose
/// score equals the maximum are kept; an empty input gives an empty result.
pub fn rank(mut scored: Vec<ScoredCandidate>, raw: bool) -> Ranking {
    // sort_by is stable
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    if raw {
        return Ranking::Scored(scored);
    }

    let Some(best) = scored.first().map(|c| c.score) else {
        return Ranking::Words(Vec::new());
    };
    Ranking::Words(
        scored
            .into_iter()
            .take_while(|c| c.score == best)
            .map(|c| c.word)
            .collect(),
    )
}
