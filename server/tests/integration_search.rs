use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use server::{build_app, AppConfig};
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use tower::ServiceExt;

fn write_corpus(dir: &Path, records: &[&str]) -> std::path::PathBuf {
    let path = dir.join("pages.jsonl");
    fs::write(&path, records.join("\n")).unwrap();
    path
}

fn tiny_corpus(dir: &Path) -> std::path::PathBuf {
    write_corpus(
        dir,
        &[
            r#"{"id":"doc1","body":"heap heap tree"}"#,
            r#"{"id":"doc2","body":"tree graph"}"#,
        ],
    )
}

fn config(input: std::path::PathBuf) -> AppConfig {
    AppConfig { input, admin_token: Some("secret".into()), ..AppConfig::default() }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let dir = tempdir().unwrap();
    let app = build_app(config(tiny_corpus(dir.path()))).unwrap();

    let (status, json) = get(&app, "/search?q=Heap!").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["term"], "heap");
    assert_eq!(json["found"], true);
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["doc_id"], "doc1");
    assert_eq!(arr[0]["count"], 2);
    assert!((arr[0]["weight"].as_f64().unwrap() - 1.3863).abs() < 1e-4);

    let (_, json) = get(&app, "/search?q=tree&k=1").await;
    assert_eq!(json["total_hits"], 2);
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["doc_id"], "doc1");
    assert_eq!(arr[0]["weight"], 0.0);
}

#[tokio::test]
async fn unknown_word_is_not_found() {
    let dir = tempdir().unwrap();
    let app = build_app(config(tiny_corpus(dir.path()))).unwrap();

    let (status, json) = get(&app, "/search?q=z").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["found"], false);
    assert_eq!(json["total_hits"], 0);

    let (_, json) = get(&app, "/search?q=the").await;
    assert_eq!(json["term"], Value::Null);
    assert_eq!(json["found"], false);
}

#[tokio::test]
async fn suggest_and_stats() {
    let dir = tempdir().unwrap();
    let input = write_corpus(dir.path(), &[r#"{"id":"u","body":"stack stacks queue"}"#]);
    let app = build_app(config(input)).unwrap();

    let (_, json) = get(&app, "/suggest?prefix=Sta").await;
    assert_eq!(json["words"], serde_json::json!(["stack", "stacks"]));

    let (_, json) = get(&app, "/stats").await;
    assert_eq!(json["documents"], 1);
    assert_eq!(json["words"], 3);
}

#[tokio::test]
async fn rebuild_requires_token_and_swaps_snapshot() {
    let dir = tempdir().unwrap();
    let input = tiny_corpus(dir.path());
    let app = build_app(config(input.clone())).unwrap();

    let (status, _) = send(&app, Request::post("/index/rebuild").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    fs::write(&input, "{\"id\":\"doc3\",\"body\":\"trie\"}\n").unwrap();
    let req = Request::post("/index/rebuild")
        .header("X-ADMIN-TOKEN", "secret")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["documents"], 1);

    let (_, json) = get(&app, "/search?q=trie").await;
    assert_eq!(json["found"], true);
    let (_, json) = get(&app, "/search?q=heap").await;
    assert_eq!(json["found"], false);
}

#[tokio::test]
async fn suggest_prefix_is_folded_like_indexed_words() {
    let dir = tempdir().unwrap();
    let input = write_corpus(dir.path(), &[r#"{"id":"u","body":"café cafeteria the theory"}"#]);
    let mut cfg = config(input);
    cfg.options.preprocessor.fold_accents = true;
    let app = build_app(cfg).unwrap();

    let (_, json) = get(&app, "/search?q=caf%C3%A9").await;
    assert_eq!(json["term"], "cafe");
    assert_eq!(json["found"], true);

    let (_, json) = get(&app, "/suggest?prefix=caf%C3%A9").await;
    assert_eq!(json["prefix"], "cafe");
    assert_eq!(json["words"], serde_json::json!(["cafe", "cafeteria"]));

    // a stop word is still a valid prefix
    let (_, json) = get(&app, "/suggest?prefix=The").await;
    assert_eq!(json["words"], serde_json::json!(["theory"]));

    let (_, json) = get(&app, "/suggest?prefix=%3F%21").await;
    assert_eq!(json["words"], serde_json::json!([]));
}
