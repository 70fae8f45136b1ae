// core/src/tokenizer.rs
//
// Morpheme tokenization seam plus a lexicon-backed implementation.

use crate::lexicon::Lexicon;
use crate::trie::SurfaceTrie;

/// A dictionary-recognized unit of a word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Morpheme {
    /// Text as it appears in the input.
    pub surface: String,
    /// Reading in the native phonetic script; `None` for out-of-vocabulary text.
    pub reading: Option<String>,
}

impl Morpheme {
    pub fn new<S: Into<String>>(surface: S, reading: Option<String>) -> Self {
        Self {
            surface: surface.into(),
            reading,
        }
    }

    /// The reading, or the surface when the dictionary has none.
    pub fn reading_or_surface(&self) -> &str {
        self.reading.as_deref().unwrap_or(&self.surface)
    }
}

/// Trait that morphological analyzers implement to feed the normalizer.
///
/// Implementations are read-only after construction and shared between
/// worker threads.
pub trait Tokenizer: Send + Sync {
    /// Split `text` into morphemes, in order.
    fn tokenize(&self, text: &str) -> anyhow::Result<Vec<Morpheme>>;
}

/// Dictionary-backed tokenizer over a `Lexicon`.
///
/// Segmentation is a backward dynamic program over character positions:
/// a dictionary morpheme costs 1.0 and an unknown character costs
/// `unknown_cost`, so the cheapest path prefers long dictionary words.
/// Runs of unknown characters come out as a single morpheme without reading.
#[derive(Debug)]
pub struct LexiconTokenizer {
    lexicon: Lexicon,
    trie: SurfaceTrie,
    unknown_cost: f32,
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Known(usize),
    Unknown,
}

impl LexiconTokenizer {
    /// Index every surface of `lexicon`. This is the expensive part of a
    /// dictionary build.
    pub fn new(lexicon: Lexicon, unknown_cost: f32) -> Self {
        let mut trie = SurfaceTrie::new();
        for surface in lexicon.surfaces() {
            trie.insert(surface);
        }
        Self {
            lexicon,
            trie,
            unknown_cost,
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    fn segment(&self, chars: &[char]) -> Vec<Step> {
        let n = chars.len();
        // best_cost[pos]: cheapest cost to cover chars[pos..]
        // best_known[pos]: dictionary-covered chars on that path (tie-breaker)
        let mut best_cost = vec![f32::INFINITY; n + 1];
        let mut best_known = vec![0usize; n + 1];
        let mut choice: Vec<Option<Step>> = vec![None; n + 1];
        best_cost[n] = 0.0;

        for pos in (0..n).rev() {
            let unknown = self.unknown_cost + best_cost[pos + 1];
            best_cost[pos] = unknown;
            best_known[pos] = best_known[pos + 1];
            choice[pos] = Some(Step::Unknown);

            for end in self.trie.walk_prefixes(chars, pos) {
                let cost = 1.0 + best_cost[end];
                let known = (end - pos) + best_known[end];
                let better = cost < best_cost[pos]
                    || ((cost - best_cost[pos]).abs() < 1e-6 && known > best_known[pos]);
                if better {
                    best_cost[pos] = cost;
                    best_known[pos] = known;
                    choice[pos] = Some(Step::Known(end));
                }
            }
        }

        let mut steps = Vec::new();
        let mut pos = 0;
        while pos < n {
            match choice[pos] {
                Some(Step::Known(end)) => {
                    steps.push(Step::Known(end));
                    pos = end;
                }
                _ => {
                    steps.push(Step::Unknown);
                    pos += 1;
                }
            }
        }
        steps
    }
}

impl Tokenizer for LexiconTokenizer {
    fn tokenize(&self, text: &str) -> anyhow::Result<Vec<Morpheme>> {
        let chars: Vec<char> = text.chars().collect();
        let mut morphemes = Vec::new();
        let mut unknown_run = String::new();
        let mut pos = 0;

        for step in self.segment(&chars) {
            match step {
                Step::Known(end) => {
                    if !unknown_run.is_empty() {
                        morphemes.push(Morpheme::new(std::mem::take(&mut unknown_run), None));
                    }
                    let surface: String = chars[pos..end].iter().collect();
                    let reading = self.lexicon.best_reading(&surface).map(str::to_string);
                    morphemes.push(Morpheme::new(surface, reading));
                    pos = end;
                }
                Step::Unknown => {
                    unknown_run.push(chars[pos]);
                    pos += 1;
                }
            }
        }
        if !unknown_run.is_empty() {
            morphemes.push(Morpheme::new(unknown_run, None));
        }
        Ok(morphemes)
    }
}
