use anyhow::{anyhow, Context, Result};
use search_core::tokenizer::Preprocessor;
use search_core::{Document, ScoringEngine, SearchEngine, SearchResults};
use serde::Deserialize;
use walkdir::WalkDir;

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// One record of the input corpus, as written by the fetcher.
#[derive(Debug, Clone, Deserialize)]
pub struct InputDoc {
    pub id: String,
    /// Missing when the page could not be fetched; still counts as a document.
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl InputDoc {
    pub fn to_document(&self, preprocessor: &Preprocessor) -> Document {
        let mut tokens = match &self.title {
            Some(title) => preprocessor.tokenize(title),
            None => Vec::new(),
        };
        tokens.extend(preprocessor.tokenize(&self.body));
        Document { id: self.id.clone(), tokens }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    pub preprocessor: Preprocessor,
    pub scoring: ScoringEngine,
}

/// `.json`/`.jsonl` files under `input` (or `input` itself), sorted so corpus
/// order does not depend on directory iteration order.
pub fn collect_input_files(input: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
        files.sort();
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        return Err(anyhow!("input path {} does not exist", input.display()));
    }
    Ok(files)
}

pub fn load_documents(input: &Path) -> Result<Vec<InputDoc>> {
    let mut docs = Vec::new();
    for file in collect_input_files(input)? {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut docs)?;
        } else {
            read_json(&file, &mut docs)?;
        }
    }
    tracing::info!(documents = docs.len(), input = %input.display(), "loaded corpus");
    Ok(docs)
}

// A malformed line has no usable id, so it is skipped rather than indexed
// as an empty document.
fn read_jsonl(file: &Path, out: &mut Vec<InputDoc>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        match serde_json::from_str::<InputDoc>(&line) {
            Ok(doc) => out.push(doc),
            Err(err) => tracing::warn!(file = %file.display(), line = lineno + 1, error = %err, "skipping malformed record"),
        }
    }
    Ok(())
}

fn read_json(file: &Path, out: &mut Vec<InputDoc>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    let json: serde_json::Value = serde_json::from_reader(reader)
        .with_context(|| format!("parsing {}", file.display()))?;
    let records = match json {
        serde_json::Value::Array(arr) => arr,
        obj @ serde_json::Value::Object(_) => vec![obj],
        _ => {
            tracing::warn!(file = %file.display(), "expected a JSON object or array");
            Vec::new()
        }
    };
    for v in records {
        match serde_json::from_value::<InputDoc>(v) {
            Ok(doc) => out.push(doc),
            Err(err) => tracing::warn!(file = %file.display(), error = %err, "skipping malformed record"),
        }
    }
    Ok(())
}

/// Tokenizes `docs` and builds a search engine over them. Documents the index
/// rejects are logged and left out.
pub fn build_engine(docs: &[InputDoc], options: &BuildOptions) -> SearchEngine {
    let documents = docs.iter().map(|d| d.to_document(&options.preprocessor));
    let (engine, skipped) = SearchEngine::build_lenient(documents, options.scoring);
    let stats = engine.stats();
    tracing::info!(
        documents = stats.documents,
        words = stats.words,
        nodes = stats.nodes,
        skipped = skipped.len(),
        "index build complete"
    );
    engine
}

pub fn build_engine_from_path(input: &Path, options: &BuildOptions) -> Result<SearchEngine> {
    let docs = load_documents(input)?;
    Ok(build_engine(&docs, options))
}

/// Human-readable report for one queried term.
pub fn render_results(term: &str, results: &SearchResults) -> String {
    let mut out = String::new();
    match results {
        SearchResults::NotIndexed => {
            let _ = writeln!(out, "The term '{term}' was not found in any pages.");
        }
        SearchResults::Ranked(hits) => {
            let _ = writeln!(out, "The term '{term}' is found in the following pages (Ranked by TF-IDF):");
            for hit in hits {
                let _ = writeln!(
                    out,
                    "  - {}: TF-IDF: {:.4} (Count: {} time(s))",
                    hit.doc_id, hit.weight, hit.count
                );
            }
        }
    }
    out
}
