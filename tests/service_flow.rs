use serde_json::{Map, Value, json};

use vecina::engine::{SearchEngine, SearchResponse};
use vecina::error::{Result, VecinaError};
use vecina::normalize::NormalizeOptions;
use vecina::scale::{ScaledValue, TargetRange};
use vecina::service::{QueryTarget, SearchOptions, SelfMatch, SimilarityService};
use vecina::vector::QueryVector;

/// An in-memory engine emulating the backend contract: exact-match lookup,
/// knn candidate selection with computed similarity, random sampling.
/// Candidate batches come back in ascending similarity order so tests catch
/// a normalizer that trusts engine ordering.
struct MockEngine {
    docs: Vec<MockDoc>,
    scripted: bool,
}

struct MockDoc {
    id: String,
    vector: Vec<f64>,
    extras: Map<String, Value>,
}

impl MockDoc {
    fn new(id: &str, vector: Vec<f64>) -> Self {
        Self {
            id: id.to_string(),
            vector,
            extras: Map::new(),
        }
    }

    fn with(mut self, field: &str, value: &str) -> Self {
        self.extras
            .insert(field.to_string(), Value::String(value.to_string()));
        self
    }

    fn source(&self) -> Value {
        let mut source = self.extras.clone();
        source.insert("vector".to_string(), json!(self.vector));
        Value::Object(source)
    }
}

impl MockEngine {
    fn new(docs: Vec<MockDoc>) -> Self {
        Self {
            docs,
            scripted: true,
        }
    }

    fn without_scripting(mut self) -> Self {
        self.scripted = false;
        self
    }

    fn respond_lookup(&self, body: &Value) -> SearchResponse {
        let query = body["query"]["query_string"]["query"].as_str().unwrap();
        let (field, value) = query.split_once(':').unwrap();
        let vector_field = body["_source"].as_str().unwrap();
        let hits: Vec<Value> = self
            .docs
            .iter()
            .filter(|doc| doc.extras.get(field).and_then(Value::as_str) == Some(value))
            .take(1)
            .map(|doc| {
                json!({
                    "_id": doc.id,
                    "_source": { vector_field: doc.vector },
                })
            })
            .collect();
        serde_json::from_value(json!({ "hits": { "hits": hits } })).unwrap()
    }

    fn respond_knn(&self, body: &Value) -> SearchResponse {
        let knn = body["query"]["knn"].as_object().unwrap();
        let (_vector_field, clause) = knn.iter().next().unwrap();
        let query_vector: Vec<f64> = clause["vector"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_f64().unwrap())
            .collect();
        let query = QueryVector::new(query_vector).unwrap();
        let size = body["size"].as_u64().unwrap() as usize;
        let from = body.get("from").and_then(Value::as_u64).unwrap_or(0) as usize;

        let mut candidates: Vec<(&MockDoc, f64)> = self
            .docs
            .iter()
            .map(|doc| (doc, query.cosine_similarity(&doc.vector).unwrap()))
            .collect();
        candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        candidates.drain(..from.min(candidates.len()));
        candidates.truncate(size);
        // Worst-first, to catch normalizers that trust engine order.
        candidates.reverse();

        let hits: Vec<Value> = candidates
            .into_iter()
            .map(|(doc, similarity)| {
                if self.scripted {
                    let mut fields = Map::new();
                    fields.insert("similarity".to_string(), json!([similarity]));
                    if let Some(script_fields) = body["script_fields"].as_object() {
                        for name in script_fields.keys().filter(|n| *n != "similarity") {
                            if let Some(value) = doc.extras.get(name) {
                                fields.insert(name.clone(), json!([value]));
                            }
                        }
                    }
                    json!({ "_id": doc.id, "fields": fields })
                } else {
                    json!({ "_id": doc.id, "_source": doc.source() })
                }
            })
            .collect();
        serde_json::from_value(json!({ "hits": { "hits": hits } })).unwrap()
    }

    fn respond_random(&self, body: &Value) -> SearchResponse {
        let size = body["size"].as_u64().unwrap() as usize;
        let hits: Vec<Value> = self
            .docs
            .iter()
            .take(size)
            .map(|doc| json!({ "_id": doc.id, "_source": doc.source() }))
            .collect();
        serde_json::from_value(json!({ "hits": { "hits": hits } })).unwrap()
    }
}

impl SearchEngine for MockEngine {
    async fn search(&self, _index: &str, body: &Value) -> Result<SearchResponse> {
        if body["query"].get("query_string").is_some() {
            Ok(self.respond_lookup(body))
        } else if body["query"].get("knn").is_some() {
            Ok(self.respond_knn(body))
        } else {
            Ok(self.respond_random(body))
        }
    }

    fn supports_scripted_fields(&self) -> bool {
        self.scripted
    }
}

fn sample_docs() -> Vec<MockDoc> {
    vec![
        MockDoc::new("a", vec![1.0, 0.0, 0.0]).with("title", "alpha"),
        MockDoc::new("b", vec![0.0, 1.0, 0.0]).with("title", "beta"),
        MockDoc::new("c", vec![0.0, 0.0, 1.0]).with("title", "gamma"),
        MockDoc::new("q", vec![0.9, 0.1, 0.0]).with("filename", "query.png"),
    ]
}

fn options(size: usize) -> SearchOptions {
    SearchOptions {
        size,
        ..SearchOptions::default()
    }
}

#[tokio::test]
async fn lookup_miss_returns_not_found() {
    let service = SimilarityService::new(MockEngine::new(sample_docs()));
    let result = service
        .search(
            "covers",
            QueryTarget::Lookup {
                field: "filename".to_string(),
                value: "missing.png".to_string(),
            },
            &options(5),
        )
        .await;
    match result {
        Err(VecinaError::NotFound(message)) => {
            assert!(message.contains("filename=missing.png"));
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn lookup_excludes_self_match_and_sorts() -> Result<()> {
    let service = SimilarityService::new(MockEngine::new(sample_docs()));
    let hits = service
        .search(
            "covers",
            QueryTarget::Lookup {
                field: "filename".to_string(),
                value: "query.png".to_string(),
            },
            &options(2),
        )
        .await?;

    // The looked-up document itself is dropped; order is descending.
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|hit| hit.id != "q"));
    assert_eq!(hits[0].id, "a");
    assert!(hits[0].similarity >= hits[1].similarity);
    Ok(())
}

#[tokio::test]
async fn lookup_offset_page_keeps_its_top_hit() -> Result<()> {
    // Neighbors in strictly decreasing similarity to the looked-up vector,
    // so each page has a known expected membership.
    let docs = vec![
        MockDoc::new("q", vec![1.0, 0.0]).with("filename", "query.png"),
        MockDoc::new("n1", vec![0.9, 0.1]),
        MockDoc::new("n2", vec![0.8, 0.2]),
        MockDoc::new("n3", vec![0.7, 0.3]),
        MockDoc::new("n4", vec![0.6, 0.4]),
    ];
    let service = SimilarityService::new(MockEngine::new(docs));
    let mut opts = options(2);
    opts.offset = Some(2);
    let hits = service
        .search(
            "covers",
            QueryTarget::Lookup {
                field: "filename".to_string(),
                value: "query.png".to_string(),
            },
            &opts,
        )
        .await?;

    // The offset already skipped past the self-match (rank 0), so the page
    // starts at n2 and nothing further is dropped.
    let ids: Vec<&str> = hits.iter().map(|hit| hit.id.as_str()).collect();
    assert_eq!(ids, ["n2", "n3"]);
    Ok(())
}

#[tokio::test]
async fn direct_vector_keeps_the_top_hit() -> Result<()> {
    let service = SimilarityService::new(MockEngine::new(sample_docs()));
    let hits = service
        .search(
            "covers",
            QueryTarget::Vector {
                vector: QueryVector::new(vec![1.0, 0.0, 0.0])?,
            },
            &options(2),
        )
        .await?;

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, "a");
    assert!((hits[0].similarity - 1.0).abs() < 1e-9);
    Ok(())
}

#[tokio::test]
async fn explicit_exclude_drops_the_top_hit_for_direct_vectors() -> Result<()> {
    let service = SimilarityService::new(MockEngine::new(sample_docs()));
    let mut opts = options(2);
    opts.self_match = SelfMatch::Exclude;
    let hits = service
        .search(
            "covers",
            QueryTarget::Vector {
                vector: QueryVector::new(vec![1.0, 0.0, 0.0])?,
            },
            &opts,
        )
        .await?;

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, "q");
    Ok(())
}

#[tokio::test]
async fn scaled_search_attaches_integer_scores() -> Result<()> {
    let service = SimilarityService::new(MockEngine::new(sample_docs()));
    let mut opts = options(3);
    opts.normalize = NormalizeOptions {
        scale_to: Some(TargetRange::Int { low: 0, high: 10 }),
        scale_from: None,
    };
    let hits = service
        .search(
            "covers",
            QueryTarget::Vector {
                vector: QueryVector::new(vec![1.0, 0.0, 0.0])?,
            },
            &opts,
        )
        .await?;

    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].scaled, Some(ScaledValue::Int(10)));
    assert_eq!(hits.last().unwrap().scaled, Some(ScaledValue::Int(0)));
    let scaled: Vec<f64> = hits.iter().map(|h| h.scaled.unwrap().as_f64()).collect();
    assert!(scaled.windows(2).all(|w| w[0] >= w[1]));
    Ok(())
}

#[tokio::test]
async fn projected_fields_ride_through_as_computed_fields() -> Result<()> {
    let service = SimilarityService::new(MockEngine::new(sample_docs()));
    let mut opts = options(1);
    opts.fields = vec!["title".to_string(), " title ".to_string()];
    let hits = service
        .search(
            "covers",
            QueryTarget::Vector {
                vector: QueryVector::new(vec![1.0, 0.0, 0.0])?,
            },
            &opts,
        )
        .await?;

    assert_eq!(hits[0].id, "a");
    assert_eq!(hits[0].fields["title"], json!("alpha"));
    Ok(())
}

#[tokio::test]
async fn engine_without_scripting_falls_back_to_local_scoring() -> Result<()> {
    let service = SimilarityService::new(MockEngine::new(sample_docs()).without_scripting());
    let mut opts = options(2);
    opts.fields = vec!["title".to_string()];
    let hits = service
        .search(
            "covers",
            QueryTarget::Vector {
                vector: QueryVector::new(vec![1.0, 0.0, 0.0])?,
            },
            &opts,
        )
        .await?;

    assert_eq!(hits[0].id, "a");
    assert!((hits[0].similarity - 1.0).abs() < 1e-9);
    assert_eq!(hits[0].fields["title"], json!("alpha"));
    assert!(hits[0].similarity >= hits[1].similarity);
    Ok(())
}

#[tokio::test]
async fn random_sample_returns_raw_hits() -> Result<()> {
    let service = SimilarityService::new(MockEngine::new(sample_docs()));
    let hits = service.random("covers", 2, &[]).await?;
    assert_eq!(hits.len(), 2);
    assert!(hits[0].source.is_some());
    Ok(())
}

#[tokio::test]
async fn random_rejects_zero_size() {
    let service = SimilarityService::new(MockEngine::new(sample_docs()));
    let result = service.random("covers", 0, &[]).await;
    assert!(matches!(result, Err(VecinaError::MalformedInput(_))));
}
