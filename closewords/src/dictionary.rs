//! Japanese dictionary resources.
//!
//! `JapaneseDictionary` is the `DictionaryBuilder` handed to the core
//! dictionary cache. Without a path it uses the lexicon embedded in the
//! binary; with one it resolves the path into one of the supported formats:
//!
//! - `tsv`: `surface<TAB>reading[<TAB>freq]` lines
//! - `bincode`: a single serialized `Lexicon` (`.bincode` / `.bin`)
//! - `compiled`: a directory holding `lexicon.fst` + `lexicon.bincode`
//! - `vibrato`: a compiled MeCab-style system dictionary (`.dic`, or
//!   zstd-compressed `.dic.zst`), behind the `vibrato` feature
//!
//! Format `auto` picks by the shape of the path.

use anyhow::{bail, Context};
use closewords_core::lexicon::{FST_FILE, PAYLOAD_FILE};
use closewords_core::{DictionaryBuilder, Lexicon, LexiconTokenizer, Morpheme, Tokenizer};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Lexicon compiled into the crate, in TSV form.
pub const BUNDLED_LEXICON: &str = include_str!("../data/dict/lexicon.tsv");

/// `source()` of the embedded lexicon.
pub const BUNDLED_SOURCE: &str = "bundled:lexicon.tsv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DictionaryFormat {
    #[default]
    Auto,
    Tsv,
    Bincode,
    Compiled,
    Vibrato,
}

impl DictionaryFormat {
    /// Concrete format for `path`. Never returns `Auto`.
    pub fn resolve(self, path: &Path) -> DictionaryFormat {
        if self != DictionaryFormat::Auto {
            return self;
        }
        if path.is_dir() {
            return DictionaryFormat::Compiled;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if name.ends_with(".dic") || name.ends_with(".dic.zst") {
            DictionaryFormat::Vibrato
        } else if name.ends_with(".bincode") || name.ends_with(".bin") {
            DictionaryFormat::Bincode
        } else {
            DictionaryFormat::Tsv
        }
    }
}

#[derive(Debug, Clone)]
pub struct JapaneseDictionary {
    /// `None` means the embedded lexicon.
    path: Option<PathBuf>,
    format: DictionaryFormat,
    unknown_cost: f32,
    reading_field: usize,
}

impl JapaneseDictionary {
    pub fn new<P: Into<PathBuf>>(path: P, format: DictionaryFormat) -> Self {
        Self {
            path: Some(path.into()),
            format,
            unknown_cost: 10.0,
            reading_field: 7,
        }
    }

    /// The lexicon embedded in the crate; needs no files at runtime.
    pub fn bundled() -> Self {
        Self {
            path: None,
            format: DictionaryFormat::Tsv,
            unknown_cost: 10.0,
            reading_field: 7,
        }
    }

    pub fn with_unknown_cost(mut self, cost: f32) -> Self {
        self.unknown_cost = cost;
        self
    }

    /// Index of the reading column in a vibrato feature string.
    pub fn with_reading_field(mut self, field: usize) -> Self {
        self.reading_field = field;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn format(&self) -> DictionaryFormat {
        match &self.path {
            Some(path) => self.format.resolve(path),
            None => DictionaryFormat::Tsv,
        }
    }

    fn load_lexicon(&self, format: DictionaryFormat) -> anyhow::Result<Lexicon> {
        let lexicon = match (&self.path, format) {
            (None, _) => Lexicon::from_tsv_reader(BUNDLED_LEXICON.as_bytes())?,
            (Some(path), DictionaryFormat::Compiled) => Lexicon::load_compiled_dir(path)?,
            (Some(path), DictionaryFormat::Bincode) => Lexicon::load_bincode(path)
                .with_context(|| format!("reading {}", path.display()))?,
            (Some(path), _) => Lexicon::load_tsv(path)?,
        };
        if lexicon.is_empty() {
            bail!("lexicon at {} has no entries", self.source());
        }
        Ok(lexicon)
    }
}

/// Tokenizer over whichever dictionary format was configured.
pub enum JapaneseTokenizer {
    Lexicon(LexiconTokenizer),
    #[cfg(feature = "vibrato")]
    Vibrato(VibratoTokenizer),
}

impl Tokenizer for JapaneseTokenizer {
    fn tokenize(&self, text: &str) -> anyhow::Result<Vec<Morpheme>> {
        match self {
            JapaneseTokenizer::Lexicon(t) => t.tokenize(text),
            #[cfg(feature = "vibrato")]
            JapaneseTokenizer::Vibrato(t) => t.tokenize(text),
        }
    }
}

impl DictionaryBuilder for JapaneseDictionary {
    type Tokenizer = JapaneseTokenizer;

    fn source(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => BUNDLED_SOURCE.to_string(),
        }
    }

    fn build(&self) -> anyhow::Result<JapaneseTokenizer> {
        let format = self.format();
        tracing::debug!(source = %self.source(), ?format, "loading dictionary");
        match (&self.path, format) {
            (Some(path), DictionaryFormat::Vibrato) => self.build_vibrato(path),
            (_, other) => {
                let lexicon = self
                    .load_lexicon(other)
                    .with_context(|| format!("loading {:?} lexicon", other))?;
                tracing::debug!(entries = lexicon.len(), "lexicon loaded");
                Ok(JapaneseTokenizer::Lexicon(LexiconTokenizer::new(
                    lexicon,
                    self.unknown_cost,
                )))
            }
        }
    }
}

#[cfg(not(feature = "vibrato"))]
impl JapaneseDictionary {
    fn build_vibrato(&self, path: &Path) -> anyhow::Result<JapaneseTokenizer> {
        bail!(
            "{} looks like a vibrato system dictionary; rebuild with the `vibrato` feature",
            path.display()
        )
    }
}

#[cfg(feature = "vibrato")]
impl JapaneseDictionary {
    fn build_vibrato(&self, path: &Path) -> anyhow::Result<JapaneseTokenizer> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        let compressed = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("zst"));
        let dict = if compressed {
            vibrato::Dictionary::read(zstd::Decoder::new(file)?)
        } else {
            vibrato::Dictionary::read(std::io::BufReader::new(file))
        }
        .with_context(|| format!("reading system dictionary {}", path.display()))?;

        Ok(JapaneseTokenizer::Vibrato(VibratoTokenizer {
            inner: vibrato::Tokenizer::new(dict),
            reading_field: self.reading_field,
        }))
    }
}

/// Morphological analysis with a MeCab-style system dictionary.
#[cfg(feature = "vibrato")]
pub struct VibratoTokenizer {
    inner: vibrato::Tokenizer,
    reading_field: usize,
}

#[cfg(feature = "vibrato")]
impl VibratoTokenizer {
    fn tokenize(&self, text: &str) -> anyhow::Result<Vec<Morpheme>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let mut worker = self.inner.new_worker();
        worker.reset_sentence(text);
        worker.tokenize();
        Ok(worker
            .token_iter()
            .map(|token| {
                let reading = token
                    .feature()
                    .split(',')
                    .nth(self.reading_field)
                    .filter(|r| !r.is_empty() && *r != "*")
                    .map(str::to_string);
                Morpheme::new(token.surface(), reading)
            })
            .collect())
    }
}

/// Compile a TSV lexicon into `out_dir/lexicon.fst` + `out_dir/lexicon.bincode`.
pub fn compile_tsv<P: AsRef<Path>, Q: AsRef<Path>>(input: P, out_dir: Q) -> anyhow::Result<usize> {
    let lexicon = Lexicon::load_tsv(input.as_ref())?;
    lexicon.save_fst_bincode(out_dir.as_ref())?;
    tracing::info!(
        entries = lexicon.len(),
        fst = %out_dir.as_ref().join(FST_FILE).display(),
        payload = %out_dir.as_ref().join(PAYLOAD_FILE).display(),
        "lexicon compiled"
    );
    Ok(lexicon.len())
}
