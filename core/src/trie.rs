/// Character trie over dictionary surfaces.
use ahash::AHashMap;

/// Prefix tree of every surface form in a lexicon.
///
/// Used by `LexiconTokenizer` to find, from a given character position, all
/// dictionary words that start there.
///
/// # Example
/// ```
/// use closewords_core::trie::SurfaceTrie;
///
/// let mut trie = SurfaceTrie::new();
/// trie.insert("東");
/// trie.insert("東京");
///
/// let input: Vec<char> = "東京都".chars().collect();
/// assert_eq!(trie.walk_prefixes(&input, 0), vec![1, 2]);
/// ```
#[derive(Debug, Default)]
pub struct SurfaceTrie {
    children: AHashMap<char, SurfaceTrie>,
    terminal: bool,
}

impl SurfaceTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a surface. Empty strings are ignored.
    pub fn insert(&mut self, surface: &str) {
        if surface.is_empty() {
            return;
        }
        let mut node = self;
        for ch in surface.chars() {
            node = node.children.entry(ch).or_default();
        }
        node.terminal = true;
    }

    /// True only for complete surfaces, not bare prefixes.
    pub fn contains(&self, surface: &str) -> bool {
        let mut node = self;
        for ch in surface.chars() {
            match node.children.get(&ch) {
                Some(child) => node = child,
                None => return false,
            }
        }
        node.terminal
    }

    /// Exclusive end positions of every surface starting at `start`,
    /// shortest first.
    pub fn walk_prefixes(&self, input: &[char], start: usize) -> Vec<usize> {
        let mut ends = Vec::new();
        let mut node = self;
        for (offset, ch) in input.iter().enumerate().skip(start) {
            match node.children.get(ch) {
                Some(child) => {
                    node = child;
                    if node.terminal {
                        ends.push(offset + 1);
                    }
                }
                None => break,
            }
        }
        ends
    }
}
