use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use closewords::{Candidate, DictionaryFormat, JapaneseConfig, Ranking};

#[derive(Parser, Debug)]
#[command(name = "closewords", about = "Find the candidates closest to a word by spelling and reading")]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Dictionary to load instead of the configured one.
    #[arg(short, long, global = true)]
    dictionary: Option<PathBuf>,

    /// Format of --dictionary (auto, tsv, bincode, compiled, vibrato).
    #[arg(long, global = true, value_parser = parse_format)]
    format: Option<DictionaryFormat>,

    /// Normalization worker threads.
    #[arg(short, long, global = true)]
    workers: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank candidates by similarity to WORD.
    Rank {
        word: String,

        #[arg(required = true)]
        candidates: Vec<String>,

        /// Print every candidate with its score.
        #[arg(long)]
        raw: bool,

        /// Use READING (romaji) for WORD instead of the dictionary reading.
        #[arg(short, long = "pronounce", value_name = "WORD=READING")]
        pronounce: Vec<String>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the romanized reading of each word.
    Normalize {
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Compile a TSV lexicon into lexicon.fst + lexicon.bincode.
    CompileDict { input: PathBuf, out_dir: PathBuf },
}

fn parse_format(s: &str) -> std::result::Result<DictionaryFormat, String> {
    match s {
        "auto" => Ok(DictionaryFormat::Auto),
        "tsv" => Ok(DictionaryFormat::Tsv),
        "bincode" => Ok(DictionaryFormat::Bincode),
        "compiled" => Ok(DictionaryFormat::Compiled),
        "vibrato" => Ok(DictionaryFormat::Vibrato),
        other => Err(format!("unknown dictionary format '{}'", other)),
    }
}

fn parse_overrides(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut overrides = HashMap::new();
    for pair in pairs {
        let Some((word, reading)) = pair.split_once('=') else {
            bail!("--pronounce expects WORD=READING, got '{}'", pair);
        };
        overrides.insert(word.to_string(), reading.to_string());
    }
    Ok(overrides)
}

fn candidate(word: String, overrides: &HashMap<String, String>) -> Candidate {
    match overrides.get(&word) {
        Some(reading) => Candidate::pronounced(word, reading.clone()),
        None => Candidate::plain(word),
    }
}

fn load_config(cli: &Cli) -> Result<JapaneseConfig> {
    let mut config = match &cli.config {
        Some(path) => JapaneseConfig::load_toml(path)?,
        None => JapaneseConfig::default(),
    };
    if let Some(path) = &cli.dictionary {
        config.dictionary_path = Some(path.clone());
    }
    if let Some(format) = cli.format {
        config.dictionary_format = format;
    }
    if let Some(workers) = cli.workers {
        config.base_mut().workers = workers;
    }
    Ok(config)
}

fn print_ranking(ranking: &Ranking, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(ranking)?);
        return Ok(());
    }
    match ranking {
        Ranking::Words(words) => {
            for word in words {
                println!("{}", word);
            }
        }
        Ranking::Scored(scored) => {
            for (i, c) in scored.iter().enumerate() {
                println!("{:>3}. {}\t{:.4}", i + 1, c.word, c.score);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Command::Rank {
            word,
            candidates,
            raw,
            pronounce,
            json,
        } => {
            let overrides = parse_overrides(&pronounce)?;
            let reference = candidate(word, &overrides);
            let candidates = candidates
                .into_iter()
                .map(|w| candidate(w, &overrides))
                .collect();
            let engine = closewords::with_config(config)?;
            let ranking = engine.close_words(reference, candidates, raw).await?;
            print_ranking(&ranking, json)?;
        }
        Command::Normalize { words } => {
            let words: Vec<Candidate> = words.into_iter().map(Candidate::plain).collect();
            let engine = closewords::with_config(config)?;
            let readings = engine.readings(&words).await?;
            for (word, reading) in words.iter().zip(readings) {
                println!("{}\t{}", word.word(), reading);
            }
        }
        Command::CompileDict { input, out_dir } => {
            let entries = closewords::compile_tsv(&input, &out_dir)
                .with_context(|| format!("compiling {}", input.display()))?;
            println!("Wrote {} surfaces to {}", entries, out_dir.display());
        }
    }
    Ok(())
}
