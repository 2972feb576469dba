use anyhow::Result;
use axum::Router;
use clap::Parser;
use indexer::BuildOptions;
use search_core::tokenizer::Preprocessor;
use search_core::{IdfMode, ScoringEngine};
use server::{build_app, AppConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus file or directory (JSON/JSONL)
    #[arg(long, default_value = "./sample_data/pages.jsonl")]
    input: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Use smoothed IDF = ln(1 + N/df) instead of ln(N/df)
    #[arg(long, default_value_t = false)]
    smoothed_idf: bool,
    /// Fold accented characters to their base letter before stripping
    #[arg(long, default_value_t = false)]
    fold_accents: bool,
    /// Stem tokens (English)
    #[arg(long, default_value_t = false)]
    stem: bool,
    /// Token required in X-ADMIN-TOKEN for /index/rebuild
    #[arg(long, env = "ADMIN_TOKEN", hide_env_values = true)]
    admin_token: Option<String>,
    /// Allowed CORS origins, comma-separated
    #[arg(long, env = "CORS_ALLOW_ORIGIN")]
    cors_allow_origin: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let idf_mode = if args.smoothed_idf { IdfMode::Smoothed } else { IdfMode::Standard };
    let config = AppConfig {
        input: args.input,
        options: BuildOptions {
            preprocessor: Preprocessor { fold_accents: args.fold_accents, stem: args.stem },
            scoring: ScoringEngine::new(idf_mode),
        },
        admin_token: args.admin_token,
        cors_allow_origin: args.cors_allow_origin,
    };
    let app: Router = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
