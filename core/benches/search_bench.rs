use criterion::{criterion_group, criterion_main, Criterion};
use search_core::tokenizer::tokenize;
use search_core::{Document, ScoringEngine, SearchEngine};

const TEXT: &str = "A heap is a complete binary tree that satisfies the heap property. \
    Deques allow insertion and deletion at both ends. A graph is a collection of vertices \
    connected by edges; trees are acyclic graphs. Stacks and queues are linear structures.";

fn corpus(n: usize) -> Vec<Document> {
    let tokens = tokenize(TEXT);
    (0..n)
        .map(|i| {
            let mut doc = tokens.clone();
            doc.push(format!("page{}", i % 97));
            Document::new(format!("https://example.com/dsa/{i}"), doc)
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let docs = corpus(1_000);
    c.bench_function("build_1000_docs", |b| {
        b.iter(|| SearchEngine::build(docs.clone(), ScoringEngine::default()))
    });
}

fn bench_search(c: &mut Criterion) {
    let engine = SearchEngine::build(corpus(1_000), ScoringEngine::default()).unwrap();
    c.bench_function("search_page42", |b| b.iter(|| engine.search("page42")));
    c.bench_function("search_heap", |b| b.iter(|| engine.search("heap")));
}

criterion_group!(benches, bench_build, bench_search);
criterion_main!(benches);
