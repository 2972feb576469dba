use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use indexer::{build_engine_from_path, render_results, BuildOptions};
use search_core::tokenizer::Preprocessor;
use search_core::{IdfMode, ScoringEngine, SearchResults};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt};

use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build an in-memory trie index over a corpus and rank pages by TF-IDF", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CorpusArgs {
    /// Input path (JSON/JSONL file or a directory of them)
    #[arg(long)]
    input: PathBuf,
    /// Use smoothed IDF = ln(1 + N/df) instead of ln(N/df)
    #[arg(long, default_value_t = false)]
    smoothed_idf: bool,
    /// Fold accented characters to their base letter before stripping
    #[arg(long, default_value_t = false)]
    fold_accents: bool,
    /// Stem tokens (English)
    #[arg(long, default_value_t = false)]
    stem: bool,
}

impl CorpusArgs {
    fn options(&self) -> BuildOptions {
        let idf_mode = if self.smoothed_idf { IdfMode::Smoothed } else { IdfMode::Standard };
        BuildOptions {
            preprocessor: Preprocessor { fold_accents: self.fold_accents, stem: self.stem },
            scoring: ScoringEngine::new(idf_mode),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Rank pages for each term
    Search {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Term to look up (repeatable)
        #[arg(long = "term", required = true)]
        terms: Vec<String>,
        /// Show at most this many pages per term
        #[arg(long)]
        limit: Option<usize>,
        /// Print JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List indexed words
    Words {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Only words starting with this prefix
        #[arg(long, default_value = "")]
        prefix: String,
    },
    /// Print corpus statistics
    Stats {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
}

#[derive(Serialize)]
struct TermReport<'a> {
    term: &'a str,
    found: bool,
    results: &'a [search_core::Hit],
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { corpus, terms, limit, json } => {
            let options = corpus.options();
            let engine = build_engine_from_path(&corpus.input, &options)?;
            for term in &terms {
                let results = match options.preprocessor.normalize_term(term) {
                    Some(word) => engine.search(&word),
                    None => SearchResults::NotIndexed,
                };
                let results = match limit {
                    Some(k) => results.top(k),
                    None => results,
                };
                if json {
                    let report = TermReport { term, found: !results.is_not_indexed(), results: results.hits() };
                    println!("{}", serde_json::to_string(&report)?);
                } else {
                    println!("{}", render_results(term, &results));
                }
            }
        }
        Commands::Words { corpus, prefix } => {
            let options = corpus.options();
            let engine = build_engine_from_path(&corpus.input, &options)?;
            // an empty prefix lists every word
            let prefix = options.preprocessor.normalize_prefix(&prefix).unwrap_or_default();
            for word in engine.suggest(&prefix, usize::MAX) {
                println!("{word}");
            }
        }
        Commands::Stats { corpus } => {
            let engine = build_engine_from_path(&corpus.input, &corpus.options())?;
            println!("{}", serde_json::to_string_pretty(&engine.stats())?);
        }
    }
    Ok(())
}
