//! Result normalization: maps the backend's divergent JSON shapes onto a
//! single display-ready record.
//!
//! Every concept is resolved through one declarative priority table
//! ([`Field::sources`]). The first source whose value is present and usable
//! wins; when none is, the field's default applies. Normalization never
//! fails and ignores unknown fields.

use serde_json::{Map, Value};

use crate::types::{AnalysisResult, Authenticity, SimilarArticle, word_count};

/// Default trust score when the backend omits one.
pub const DEFAULT_TRUST_SCORE: f64 = 50.0;

/// Placeholder topics shown when the backend omits `keyTopics`.
pub const PLACEHOLDER_TOPICS: &[&str] = &["General", "News"];

/// Optional historical sections rendered additively when present.
pub const SUPPLEMENTARY_SECTIONS: &[&str] = &["factCheck", "sourceReputation"];

/// How a numeric backend value maps onto the display scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    /// Value is already on the display scale.
    Identity,
    /// Value is a 0-1 fraction; multiply by 100 and round.
    Percent,
}

/// One backend field name that can supply a concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Source {
    pub name: &'static str,
    pub scale: Scale,
}

impl Source {
    const fn plain(name: &'static str) -> Self {
        Self {
            name,
            scale: Scale::Identity,
        }
    }

    const fn percent(name: &'static str) -> Self {
        Self {
            name,
            scale: Scale::Percent,
        }
    }
}

/// Concepts the analysis panel displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Sentiment,
    Confidence,
    KeyTopics,
    WordCount,
    RealOrFake,
    FakeConfidence,
    TrustScore,
    Reasoning,
    RelatedArticles,
    FallbackInfo,
    ParseWarning,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::Sentiment,
        Field::Confidence,
        Field::KeyTopics,
        Field::WordCount,
        Field::RealOrFake,
        Field::FakeConfidence,
        Field::TrustScore,
        Field::Reasoning,
        Field::RelatedArticles,
        Field::FallbackInfo,
        Field::ParseWarning,
    ];

    /// Backend field names for this concept, highest priority first.
    pub fn sources(self) -> &'static [Source] {
        match self {
            Field::Sentiment => const { &[Source::plain("sentiment"), Source::plain("label")] },
            Field::Confidence => const { &[Source::plain("confidence"), Source::percent("score")] },
            Field::KeyTopics => const { &[Source::plain("keyTopics"), Source::plain("key_topics")] },
            Field::WordCount => const { &[Source::plain("wordCount"), Source::plain("word_count")] },
            Field::RealOrFake => {
                const { &[Source::plain("real_or_fake"), Source::plain("realOrFake")] }
            }
            Field::FakeConfidence => const {
                &[
                    Source::plain("fake_confidence"),
                    Source::plain("fakeConfidence"),
                ]
            },
            Field::TrustScore => {
                const { &[Source::plain("trust_score"), Source::plain("trustScore")] }
            }
            Field::Reasoning => const { &[Source::plain("reasoning"), Source::plain("summary")] },
            Field::RelatedArticles => const {
                &[
                    Source::plain("related_articles"),
                    Source::plain("similar_articles"),
                    Source::plain("verified_sources"),
                ]
            },
            Field::FallbackInfo => const {
                &[
                    Source::plain("fallback_info"),
                    Source::plain("fallbackInfo"),
                ]
            },
            Field::ParseWarning => const {
                &[
                    Source::plain("parse_warning"),
                    Source::plain("parseWarning"),
                ]
            },
        }
    }
}

/// Output of [`normalize_analysis`]: the display record plus any related
/// articles the analysis response carried.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAnalysis {
    pub result: AnalysisResult,
    pub related: Vec<SimilarArticle>,
}

/// Normalize an analysis response (`/analyze`, `/analyze-text`,
/// `/analyze-url`). `submitted` is the user's input, used for the word
/// count when the backend omits it.
pub fn normalize_analysis(raw: &Value, submitted: &str) -> NormalizedAnalysis {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);

    let key_topics = first_string_list(obj, Field::KeyTopics).unwrap_or_else(|| {
        PLACEHOLDER_TOPICS
            .iter()
            .map(|topic| topic.to_string())
            .collect()
    });

    let supplementary = SUPPLEMENTARY_SECTIONS
        .iter()
        .filter_map(|name| {
            obj.get(*name)
                .filter(|v| !v.is_null())
                .map(|v| (name.to_string(), v.clone()))
        })
        .collect();

    let result = AnalysisResult {
        sentiment: first_string(obj, Field::Sentiment).unwrap_or_else(|| "Unknown".to_string()),
        confidence: first_number(obj, Field::Confidence).unwrap_or(0.0),
        key_topics,
        word_count: first_number(obj, Field::WordCount)
            .filter(|n| *n >= 0.0)
            .map(|n| n.round() as usize)
            .unwrap_or_else(|| word_count(submitted)),
        real_or_fake: first_string(obj, Field::RealOrFake)
            .map(|label| Authenticity::from_label(&label))
            .unwrap_or_default(),
        fake_confidence: first_number(obj, Field::FakeConfidence).unwrap_or(0.0),
        trust_score: first_number(obj, Field::TrustScore).unwrap_or(DEFAULT_TRUST_SCORE),
        reasoning: first_string(obj, Field::Reasoning),
        fallback_info: first_string(obj, Field::FallbackInfo),
        parse_warning: first_string(obj, Field::ParseWarning),
        supplementary,
    };

    let related = Field::RelatedArticles
        .sources()
        .iter()
        .find_map(|source| obj.get(source.name).and_then(Value::as_array))
        .map(|entries| normalize_article_list(entries))
        .unwrap_or_default();

    NormalizedAnalysis { result, related }
}

/// Normalize a `/similar` response body (`{ "articles": [...] }`).
pub fn normalize_similar(raw: &Value) -> Vec<SimilarArticle> {
    ["articles", "similar_articles"]
        .iter()
        .find_map(|name| raw.get(*name).and_then(Value::as_array))
        .map(|entries| normalize_article_list(entries))
        .unwrap_or_default()
}

/// Normalize a list of article entries, dropping entries that are not
/// objects or carry neither a title nor a URL.
pub fn normalize_article_list(entries: &[Value]) -> Vec<SimilarArticle> {
    entries.iter().filter_map(normalize_article).collect()
}

/// Normalize one article entry.
pub fn normalize_article(entry: &Value) -> Option<SimilarArticle> {
    let obj = entry.as_object()?;
    let title = string_at(obj, &["title", "headline"]);
    let url = string_at(obj, &["url", "link"]);
    if title.is_none() && url.is_none() {
        return None;
    }

    // NewsAPI nests the publisher as `{ "source": { "name": ... } }`.
    let source = match obj.get("source") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Object(inner)) => string_at(inner, &["name", "id"]),
        _ => None,
    };

    Some(SimilarArticle {
        title: title.unwrap_or_else(|| "Untitled".to_string()),
        url: url.unwrap_or_default(),
        source,
        published_at: string_at(obj, &["publishedAt", "published_at"]),
        description: string_at(obj, &["description"]),
        trust_score: ["trust_score", "trustScore"]
            .iter()
            .find_map(|name| obj.get(*name).and_then(as_number)),
        trust_status: string_at(obj, &["trust_status", "trustStatus"]),
    })
}

fn first_string(obj: &Map<String, Value>, field: Field) -> Option<String> {
    field
        .sources()
        .iter()
        .find_map(|source| obj.get(source.name).and_then(as_text))
}

fn first_number(obj: &Map<String, Value>, field: Field) -> Option<f64> {
    field.sources().iter().find_map(|source| {
        let value = obj.get(source.name).and_then(as_number)?;
        Some(match source.scale {
            Scale::Identity => value,
            Scale::Percent => (value * 100.0).round(),
        })
    })
}

fn first_string_list(obj: &Map<String, Value>, field: Field) -> Option<Vec<String>> {
    field.sources().iter().find_map(|source| {
        let items = obj.get(source.name)?.as_array()?;
        Some(items.iter().filter_map(as_text).collect())
    })
}

fn string_at(obj: &Map<String, Value>, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| obj.get(*name).and_then(as_text))
}

/// Non-blank string, trimmed.
fn as_text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Finite JSON number, or a string that parses as one.
fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_full_modern_response() {
        let raw = json!({
            "sentiment": "Positive",
            "confidence": 87,
            "keyTopics": ["Economy", "Markets"],
            "wordCount": 412,
            "real_or_fake": "Real",
            "fake_confidence": 91.5,
            "trust_score": 78,
            "reasoning": "Claims are consistent with wire reports.",
            "analysis_timestamp": "2024-03-01T10:00:00"
        });
        let normalized = normalize_analysis(&raw, "ignored text");
        let r = normalized.result;
        assert_eq!(r.sentiment, "Positive");
        assert_eq!(r.confidence, 87.0);
        assert_eq!(r.key_topics, vec!["Economy", "Markets"]);
        assert_eq!(r.word_count, 412);
        assert_eq!(r.real_or_fake, Authenticity::Real);
        assert_eq!(r.fake_confidence, 91.5);
        assert_eq!(r.trust_score, 78.0);
        assert_eq!(
            r.reasoning.as_deref(),
            Some("Claims are consistent with wire reports.")
        );
        assert!(normalized.related.is_empty());
    }

    #[test]
    fn test_legacy_label_and_score() {
        let raw = json!({ "label": "NEGATIVE", "score": 0.934 });
        let r = normalize_analysis(&raw, "one two three").result;
        assert_eq!(r.sentiment, "NEGATIVE");
        assert_eq!(r.confidence, 93.0);
        assert_eq!(r.word_count, 3);
    }

    #[test]
    fn test_sentiment_preferred_over_label() {
        let raw = json!({ "sentiment": "Neutral", "label": "NEGATIVE", "confidence": 55, "score": 0.1 });
        let r = normalize_analysis(&raw, "").result;
        assert_eq!(r.sentiment, "Neutral");
        assert_eq!(r.confidence, 55.0);
    }

    #[test]
    fn test_defaults_for_empty_object() {
        let r = normalize_analysis(&json!({}), "a b").result;
        assert_eq!(r.sentiment, "Unknown");
        assert_eq!(r.confidence, 0.0);
        assert_eq!(r.key_topics, vec!["General", "News"]);
        assert_eq!(r.word_count, 2);
        assert_eq!(r.real_or_fake, Authenticity::Unknown);
        assert_eq!(r.fake_confidence, 0.0);
        assert_eq!(r.trust_score, DEFAULT_TRUST_SCORE);
        assert_eq!(r.reasoning, None);
        assert!(r.supplementary.is_empty());
    }

    #[test]
    fn test_non_object_input_is_all_defaults() {
        for raw in [json!(null), json!("oops"), json!([1, 2, 3]), json!(42)] {
            let normalized = normalize_analysis(&raw, "");
            assert_eq!(normalized.result.sentiment, "Unknown");
            assert_eq!(normalized.result.trust_score, 50.0);
            assert!(normalized.related.is_empty());
        }
    }

    #[test]
    fn test_zero_trust_score_is_kept() {
        let r = normalize_analysis(&json!({ "trust_score": 0 }), "").result;
        assert_eq!(r.trust_score, 0.0);
    }

    #[test]
    fn test_null_fields_fall_through() {
        let raw = json!({ "trust_score": null, "trustScore": 64, "sentiment": null, "label": "POSITIVE" });
        let r = normalize_analysis(&raw, "").result;
        assert_eq!(r.trust_score, 64.0);
        assert_eq!(r.sentiment, "POSITIVE");
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let raw = json!({ "trust_score": "72.5", "confidence": "not a number", "score": "0.5" });
        let r = normalize_analysis(&raw, "").result;
        assert_eq!(r.trust_score, 72.5);
        assert_eq!(r.confidence, 50.0);
    }

    #[test]
    fn test_summary_used_as_reasoning_fallback() {
        let raw = json!({ "summary": "Short recap of the article." });
        let r = normalize_analysis(&raw, "").result;
        assert_eq!(r.reasoning.as_deref(), Some("Short recap of the article."));
    }

    #[test]
    fn test_related_articles_priority() {
        let raw = json!({
            "similar_articles": [{ "title": "Similar", "url": "https://s.example" }],
            "related_articles": [{ "title": "Related", "url": "https://r.example" }],
            "verified_sources": [{ "title": "Verified", "url": "https://v.example" }]
        });
        let related = normalize_analysis(&raw, "").related;
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].title, "Related");
    }

    #[test]
    fn test_verified_sources_last_resort() {
        let raw = json!({ "verified_sources": [{ "title": "Verified", "url": "https://v.example" }] });
        let related = normalize_analysis(&raw, "").related;
        assert_eq!(related[0].title, "Verified");
    }

    #[test]
    fn test_fallback_info_and_parse_warning() {
        let raw = json!({
            "real_or_fake": "uncertain",
            "fallback_info": "Fake news model failed to load.",
            "parse_warning": "The text provided is very short."
        });
        let r = normalize_analysis(&raw, "").result;
        assert_eq!(r.real_or_fake, Authenticity::Unknown);
        assert_eq!(
            r.fallback_info.as_deref(),
            Some("Fake news model failed to load.")
        );
        assert_eq!(
            r.parse_warning.as_deref(),
            Some("The text provided is very short.")
        );
    }

    #[test]
    fn test_supplementary_sections_are_collected_in_order() {
        let raw = json!({
            "sourceReputation": { "domain": "example.com", "rating": "high" },
            "factCheck": { "verdict": "mostly true" },
            "unrelated": true
        });
        let r = normalize_analysis(&raw, "").result;
        let names: Vec<&str> = r.supplementary.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["factCheck", "sourceReputation"]);
    }

    #[test]
    fn test_key_topics_skip_non_strings() {
        let raw = json!({ "keyTopics": ["Politics", 3, null, "  ", "Europe"] });
        let r = normalize_analysis(&raw, "").result;
        assert_eq!(r.key_topics, vec!["Politics", "Europe"]);
    }

    #[test]
    fn test_article_source_shapes() {
        let plain = normalize_article(&json!({ "title": "A", "url": "u", "source": "Reuters" })).unwrap();
        assert_eq!(plain.source.as_deref(), Some("Reuters"));

        let nested = normalize_article(&json!({
            "title": "B",
            "url": "u",
            "source": { "id": null, "name": "BBC News" },
            "publishedAt": "2024-03-01T08:00:00Z"
        }))
        .unwrap();
        assert_eq!(nested.source.as_deref(), Some("BBC News"));
        assert_eq!(nested.published_at.as_deref(), Some("2024-03-01T08:00:00Z"));
    }

    #[test]
    fn test_article_entries_without_title_or_url_are_dropped() {
        let entries = vec![
            json!("not an object"),
            json!({ "description": "no title, no url" }),
            json!({ "url": "https://only-url.example" }),
        ];
        let articles = normalize_article_list(&entries);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Untitled");
        assert_eq!(articles[0].url, "https://only-url.example");
    }

    #[test]
    fn test_article_trust_fields() {
        let article = normalize_article(&json!({
            "title": "T",
            "url": "u",
            "trust_score": 88,
            "trust_status": "Trusted"
        }))
        .unwrap();
        assert_eq!(article.trust_score, Some(88.0));
        assert_eq!(article.trust_status.as_deref(), Some("Trusted"));
    }

    #[test]
    fn test_normalize_similar() {
        let raw = json!({ "articles": [{ "title": "One", "url": "https://one.example" }] });
        assert_eq!(normalize_similar(&raw).len(), 1);
        assert!(normalize_similar(&json!({})).is_empty());
        assert!(normalize_similar(&json!({ "articles": null })).is_empty());
    }

    #[test]
    fn test_every_field_has_sources() {
        for field in Field::ALL {
            assert!(!field.sources().is_empty(), "{field:?} has no sources");
        }
    }

    #[test]
    fn test_source_tables_outlive_the_call() {
        let tables: Vec<(Field, &'static [Source])> =
            Field::ALL.iter().map(|field| (*field, field.sources())).collect();
        let names = |field: Field| -> Vec<&'static str> {
            tables
                .iter()
                .find(|(f, _)| *f == field)
                .map(|(_, sources)| sources.iter().map(|s| s.name).collect())
                .unwrap_or_default()
        };
        assert_eq!(names(Field::TrustScore), vec!["trust_score", "trustScore"]);
        assert_eq!(
            names(Field::RelatedArticles),
            vec!["related_articles", "similar_articles", "verified_sources"]
        );
        assert_eq!(Field::Confidence.sources()[1].scale, Scale::Percent);
    }
}
