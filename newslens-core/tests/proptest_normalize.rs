//! Property-based tests for result normalization using proptest.

use proptest::prelude::*;
use serde_json::json;

use newslens_core::normalize::{DEFAULT_TRUST_SCORE, normalize_analysis, normalize_similar};
use newslens_core::types::word_count;

proptest! {
    #[test]
    fn trust_score_is_preserved(score in 0u32..=100) {
        let raw = json!({ "trust_score": score });
        let normalized = normalize_analysis(&raw, "text");
        prop_assert_eq!(normalized.result.trust_score, f64::from(score));
    }

    #[test]
    fn camel_case_trust_score_is_used_when_snake_case_missing(score in 0u32..=100) {
        let raw = json!({ "trustScore": score });
        let normalized = normalize_analysis(&raw, "text");
        prop_assert_eq!(normalized.result.trust_score, f64::from(score));
    }

    #[test]
    fn fractional_score_maps_to_rounded_percentage(score in 0.0f64..=1.0) {
        let raw = json!({ "score": score });
        let normalized = normalize_analysis(&raw, "text");
        prop_assert_eq!(normalized.result.confidence, (score * 100.0).round());
        prop_assert!(normalized.result.confidence <= 100.0);
    }

    #[test]
    fn word_count_falls_back_to_submitted_text(words in prop::collection::vec("[a-z]{1,8}", 0..40)) {
        let text = words.join(" ");
        let normalized = normalize_analysis(&json!({}), &text);
        prop_assert_eq!(normalized.result.word_count, words.len());
        prop_assert_eq!(word_count(&text), words.len());
    }

    #[test]
    fn reported_word_count_wins(reported in 0u32..10_000, words in prop::collection::vec("[a-z]{1,8}", 1..10)) {
        let raw = json!({ "wordCount": reported });
        let normalized = normalize_analysis(&raw, &words.join(" "));
        prop_assert_eq!(normalized.result.word_count, reported as usize);
    }

    #[test]
    fn related_articles_take_precedence(
        related in 0usize..5,
        similar in 0usize..5,
        verified in 0usize..5,
    ) {
        let list = |prefix: &str, n: usize| -> Vec<serde_json::Value> {
            (0..n)
                .map(|i| json!({ "title": format!("{prefix} {i}"), "url": format!("https://example.com/{prefix}/{i}") }))
                .collect()
        };
        let raw = json!({
            "related_articles": list("related", related),
            "similar_articles": list("similar", similar),
            "verified_sources": list("verified", verified),
        });
        let normalized = normalize_analysis(&raw, "text");
        // The first present list wins even when it is empty.
        prop_assert_eq!(normalized.related.len(), related);
        prop_assert!(normalized.related.iter().all(|a| a.title.starts_with("related")));
    }

    #[test]
    fn normalization_never_panics_on_arbitrary_objects(
        keys in prop::collection::vec("[a-zA-Z_]{1,16}", 0..8),
        values in prop::collection::vec(any::<i64>(), 0..8),
    ) {
        let mut obj = serde_json::Map::new();
        for (key, value) in keys.iter().zip(values.iter()) {
            obj.insert(key.clone(), json!(value));
        }
        let raw = serde_json::Value::Object(obj);
        let _ = normalize_analysis(&raw, "some text");
        let _ = normalize_similar(&raw);
    }
}

#[test]
fn missing_trust_score_uses_default() {
    let normalized = normalize_analysis(&json!({ "sentiment": "Neutral" }), "text");
    assert_eq!(normalized.result.trust_score, DEFAULT_TRUST_SCORE);
}

#[test]
fn non_object_body_uses_defaults() {
    let normalized = normalize_analysis(&json!(["unexpected"]), "two words");
    assert_eq!(normalized.result.sentiment, "Unknown");
    assert_eq!(normalized.result.word_count, 2);
    assert!(normalized.related.is_empty());
}
