use anyhow::{anyhow, Result};
use clap::Parser;
use reqwest::{header, Client, Url};
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::sync::Arc;
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use tokio::sync::Semaphore;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "fetcher")]
#[command(about = "Fetch a fixed list of pages and write their text as a JSONL corpus")]
struct Cli {
    /// Path to a file with page URLs (one per line)
    #[arg(long)]
    urls: String,
    /// Output JSONL file path
    #[arg(long, default_value = "./sample_data/pages.jsonl")]
    output: String,
    /// Number of pages fetched at once
    #[arg(long, default_value_t = 8)]
    concurrency: usize,
    /// Request timeout seconds
    #[arg(long, default_value_t = 12)]
    timeout_secs: u64,
    /// Pages larger than this are treated as failed
    #[arg(long, default_value_t = 2 * 1024 * 1024)]
    max_bytes: usize,
    /// User-Agent string
    #[arg(long, default_value = "trie-search-fetcher/0.1")]
    user_agent: String,
}

#[derive(Serialize)]
struct OutDoc<'a> {
    id: &'a str,
    url: &'a str,
    title: &'a str,
    body: &'a str,
    timestamp: String,
}

#[derive(Debug, Default, PartialEq)]
struct PageText {
    title: String,
    body: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();
    if let Some(dir) = std::path::Path::new(&args.output).parent() {
        fs::create_dir_all(dir).ok();
    }

    let client = Client::builder()
        .user_agent(args.user_agent.clone())
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()?;

    let urls = parse_url_list(BufReader::new(File::open(&args.urls)?))?;
    if urls.is_empty() { return Err(anyhow!("no valid urls in {}", args.urls)); }
    tracing::info!(urls = urls.len(), concurrency = args.concurrency, output = %args.output, "fetching pages");

    let permits = Arc::new(Semaphore::new(args.concurrency.max(1)));
    let mut handles = Vec::with_capacity(urls.len());
    for url in urls {
        let client = client.clone();
        let permits = permits.clone();
        let max_bytes = args.max_bytes;
        handles.push(tokio::spawn(async move {
            let _permit = permits.acquire_owned().await;
            let page = match fetch_page(&client, &url, max_bytes).await {
                Ok(page) => page,
                Err(err) => {
                    // Still emitted so the page counts toward the corpus size.
                    tracing::warn!(%url, error = %err, "fetch failed, emitting empty page");
                    PageText::default()
                }
            };
            (url, page)
        }));
    }

    let mut out = BufWriter::new(File::create(&args.output)?);
    let mut emitted = 0usize;
    let mut empty = 0usize;
    for handle in handles {
        let (url, page) = handle.await?;
        let ts = time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
        let rec = OutDoc { id: url.as_str(), url: url.as_str(), title: &page.title, body: &page.body, timestamp: ts };
        serde_json::to_writer(&mut out, &rec)?;
        out.write_all(b"\n")?;
        emitted += 1;
        if page.body.is_empty() { empty += 1; }
    }
    out.flush()?;

    tracing::info!(emitted, empty, output = %args.output, "done");
    Ok(())
}

/// Parses one URL per line, skipping blanks and `#` comments. Bare hosts get
/// an `https://` scheme; duplicates (ignoring fragments) are dropped, keeping
/// the first occurrence's position.
fn parse_url_list<R: BufRead>(reader: R) -> Result<Vec<Url>> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for line in reader.lines() {
        let s = line?.trim().to_string();
        if s.is_empty() || s.starts_with('#') { continue; }
        let parsed = Url::parse(&s).or_else(|_| Url::parse(&format!("https://{}", s)));
        match parsed {
            Ok(u) if u.scheme().starts_with("http") => {
                let u = norm(u);
                if seen.insert(u.to_string()) { urls.push(u); }
            }
            _ => tracing::warn!(line = %s, "skipping invalid url"),
        }
    }
    Ok(urls)
}

async fn fetch_page(client: &Client, url: &Url, max_bytes: usize) -> Result<PageText> {
    let resp = client.get(url.clone()).send().await?;
    if !resp.status().is_success() {
        return Err(anyhow!("status {}", resp.status()));
    }
    if let Some(ct) = resp.headers().get(header::CONTENT_TYPE) {
        if let Ok(v) = ct.to_str() {
            if !v.starts_with("text/html") { return Err(anyhow!("unsupported content type {v}")); }
        }
    }
    let bytes = resp.bytes().await?;
    if bytes.len() > max_bytes {
        return Err(anyhow!("page is {} bytes, limit {}", bytes.len(), max_bytes));
    }
    Ok(extract_text(&String::from_utf8_lossy(&bytes)))
}

/// Title and body text of an HTML document. Text nodes are joined with
/// spaces so adjacent elements do not fuse into one word.
fn extract_text(html: &str) -> PageText {
    let doc = Html::parse_document(html);
    let (Ok(sel_title), Ok(sel_body)) = (Selector::parse("title"), Selector::parse("body")) else {
        return PageText::default();
    };
    let join = |el: scraper::ElementRef<'_>| {
        el.text().map(str::trim).filter(|t| !t.is_empty()).collect::<Vec<_>>().join(" ")
    };
    PageText {
        title: doc.select(&sel_title).next().map(join).unwrap_or_default(),
        body: doc.select(&sel_body).next().map(join).unwrap_or_default(),
    }
}

fn norm(mut u: Url) -> Url { u.set_fragment(None); u }
