//! Surface -> reading dictionary.
//!
//! A `Lexicon` maps a surface form (e.g. `東京`) to one or more readings in the
//! native phonetic script (e.g. `トウキョウ`), each with a frequency used to
//! pick the preferred reading.
//!
//! Three on-disk forms are supported:
//! - TSV source: `surface<TAB>reading[<TAB>freq]`, `#` starts a comment line
//! - a single bincode file (`save_bincode` / `load_bincode`)
//! - a compiled pair `lexicon.fst` + `lexicon.bincode`: the fst maps each
//!   surface to an index into a bincode-serialized `Vec<Vec<LexEntry>>`

use anyhow::{bail, Context};
use fst::{Map, MapBuilder, Streamer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read};
use std::path::Path;

/// File name of the fst index inside a compiled lexicon directory.
pub const FST_FILE: &str = "lexicon.fst";
/// File name of the payload inside a compiled lexicon directory.
pub const PAYLOAD_FILE: &str = "lexicon.bincode";

/// One reading of a surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexEntry {
    pub reading: String,
    /// Higher means preferred.
    pub freq: u32,
}

impl LexEntry {
    pub fn new<T: Into<String>>(reading: T, freq: u32) -> Self {
        Self {
            reading: reading.into(),
            freq,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lexicon {
    map: HashMap<String, Vec<LexEntry>>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Insert a reading for a surface.
    ///
    /// If the surface already has this reading its frequency is increased by
    /// `freq`, otherwise the reading is appended.
    pub fn insert<S: Into<String>, R: Into<String>>(&mut self, surface: S, reading: R, freq: u32) {
        let reading = reading.into();
        let bucket = self.map.entry(surface.into()).or_default();
        if let Some(e) = bucket.iter_mut().find(|e| e.reading == reading) {
            e.freq = e.freq.saturating_add(freq);
        } else {
            bucket.push(LexEntry::new(reading, freq));
        }
    }

    /// All readings of a surface, in insertion order.
    pub fn lookup(&self, surface: &str) -> &[LexEntry] {
        self.map.get(surface).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The highest-frequency reading; the earliest inserted wins ties.
    pub fn best_reading(&self, surface: &str) -> Option<&str> {
        let mut best: Option<&LexEntry> = None;
        for entry in self.lookup(surface) {
            match best {
                Some(b) if b.freq >= entry.freq => {}
                _ => best = Some(entry),
            }
        }
        best.map(|e| e.reading.as_str())
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    /// Number of distinct surfaces.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Parse TSV source text.
    pub fn from_tsv_reader<R: BufRead>(reader: R) -> anyhow::Result<Self> {
        let mut lexicon = Self::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 2 || fields[0].is_empty() || fields[1].is_empty() {
                bail!(
                    "line {}: expected `surface<TAB>reading[<TAB>freq]`, got {:?}",
                    idx + 1,
                    line
                );
            }
            let freq = match fields.get(2) {
                Some(raw) => raw
                    .trim()
                    .parse::<u32>()
                    .with_context(|| format!("line {}: bad frequency {:?}", idx + 1, raw))?,
                None => 1,
            };
            lexicon.insert(fields[0], fields[1], freq);
        }
        Ok(lexicon)
    }

    /// Load a TSV source file.
    pub fn load_tsv<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("open tsv {}", path.display()))?;
        Self::from_tsv_reader(BufReader::new(f))
            .with_context(|| format!("parse tsv {}", path.display()))
    }

    /// Save the lexicon to a single bincode file.
    pub fn save_bincode<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    /// Load a lexicon produced by `save_bincode`.
    pub fn load_bincode<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(bincode::deserialize_from(reader)?)
    }

    /// Write `lexicon.fst` + `lexicon.bincode` into `dir` (created if needed).
    pub fn save_fst_bincode<P: AsRef<Path>>(&self, dir: P) -> anyhow::Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create output dir {}", dir.display()))?;

        // fst keys must be inserted in lexicographic byte order
        let sorted: BTreeMap<&String, &Vec<LexEntry>> = self.map.iter().collect();

        let fst_writer = BufWriter::new(File::create(dir.join(FST_FILE))?);
        let mut builder = MapBuilder::new(fst_writer)?;
        let mut payloads: Vec<Vec<LexEntry>> = Vec::with_capacity(sorted.len());
        for (idx, (surface, entries)) in sorted.into_iter().enumerate() {
            builder.insert(surface, idx as u64)?;
            payloads.push(entries.clone());
        }
        builder.finish()?;

        let payload_writer = BufWriter::new(File::create(dir.join(PAYLOAD_FILE))?);
        bincode::serialize_into(payload_writer, &payloads)?;
        Ok(())
    }

    /// Load a compiled fst + bincode pair.
    pub fn load_from_fst_bincode<P: AsRef<Path>>(fst_path: P, bincode_path: P) -> anyhow::Result<Self> {
        let fst_path = fst_path.as_ref();
        let bincode_path = bincode_path.as_ref();

        let mut buf = Vec::new();
        File::open(fst_path)
            .with_context(|| format!("open fst {}", fst_path.display()))?
            .read_to_end(&mut buf)
            .context("read fst")?;
        let map = Map::new(buf).context("fst map")?;

        let reader = BufReader::new(
            File::open(bincode_path)
                .with_context(|| format!("open bincode {}", bincode_path.display()))?,
        );
        let payloads: Vec<Vec<LexEntry>> =
            bincode::deserialize_from(reader).context("deserialize bincode")?;

        let mut lexicon = Self::new();
        let mut stream = map.stream();
        while let Some((key, idx)) = stream.next() {
            let surface = std::str::from_utf8(key).context("fst key is not utf-8")?;
            let entries = payloads
                .get(idx as usize)
                .with_context(|| format!("fst index {} out of range for {:?}", idx, surface))?;
            lexicon.map.insert(surface.to_string(), entries.clone());
        }
        Ok(lexicon)
    }

    /// Load a directory holding `lexicon.fst` + `lexicon.bincode`.
    pub fn load_compiled_dir<P: AsRef<Path>>(dir: P) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        Self::load_from_fst_bincode(dir.join(FST_FILE), dir.join(PAYLOAD_FILE))
    }
}
