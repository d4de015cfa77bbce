use criterion::{Criterion, black_box, criterion_group, criterion_main};
use newslens_core::client::{classify_response, excerpt};
use newslens_core::mlops::PipelineGraph;
use newslens_core::normalize::{normalize_analysis, normalize_similar};
use reqwest::StatusCode;
use serde_json::json;

fn bench_normalize(c: &mut Criterion) {
    let analysis = json!({
        "label": "POSITIVE",
        "score": 0.9321,
        "key_topics": ["economy", "inflation", "rates", "markets"],
        "realOrFake": "fake",
        "fakeConfidence": 71,
        "trustScore": 34,
        "summary": "Several claims could not be matched to wire reports.",
        "similar_articles": (0..20)
            .map(|i| json!({
                "headline": format!("Story {i}"),
                "link": format!("https://example.com/{i}"),
                "source": { "name": "Example Wire" },
                "trustScore": i * 5,
            }))
            .collect::<Vec<_>>(),
    });
    let text = "word ".repeat(800);

    c.bench_function("normalize_analysis_fallback_names", |b| {
        b.iter(|| normalize_analysis(black_box(&analysis), black_box(&text)))
    });

    let similar = json!({ "articles": analysis["similar_articles"].clone() });
    c.bench_function("normalize_similar_20_articles", |b| {
        b.iter(|| normalize_similar(black_box(&similar)))
    });
}

fn bench_classify(c: &mut Criterion) {
    let body = json!({ "sentiment": "Neutral", "confidence": 55 }).to_string();
    c.bench_function("classify_json_response", |b| {
        b.iter(|| {
            classify_response(
                "/analyze",
                StatusCode::OK,
                Some("application/json"),
                black_box(&body),
            )
        })
    });

    let html = "<html>".repeat(2000);
    c.bench_function("excerpt_long_html", |b| {
        b.iter(|| excerpt(black_box(&html), 200))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let pipeline = PipelineGraph::demo();
    c.bench_function("pipeline_stages_in_order", |b| {
        b.iter(|| black_box(&pipeline).stages_in_order().len())
    });
}

criterion_group!(benches, bench_normalize, bench_classify, bench_pipeline);
criterion_main!(benches);
