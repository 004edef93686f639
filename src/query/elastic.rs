//! Rendering of request descriptions to the Elasticsearch/OpenSearch JSON
//! dialect.
//!
//! Three bodies are produced here: the nearest-neighbor search with its
//! `script_fields` scoring block, the one-shot exact-match lookup used to
//! resolve a field/value pair to a stored vector, and the random-sample
//! query. Everything engine-specific about the wire format stays in this
//! module.

use serde_json::{Map, Value, json};

use crate::query::request::NeighborRequest;
use crate::query::script::ScoreExpr;

/// Render a neighbor request to a `_search` body.
///
/// Produces the knn clause on the request's vector field, the computed
/// `similarity` script field with the query vector as a script parameter,
/// one passthrough script field per projection, `from` when a non-zero
/// offset is set, and a `post_filter` of term clauses for the exact-match
/// filters.
pub fn neighbor_body(request: &NeighborRequest) -> Value {
    let vector: Vec<f64> = request.vector.as_slice().to_vec();
    let cosine = ScoreExpr::CosineSimilarity {
        vector_field: request.vector_field.clone(),
    };

    let mut script_fields = Map::new();
    script_fields.insert(
        ScoreExpr::SIMILARITY_FIELD.to_string(),
        json!({
            "script": {
                "lang": "painless",
                "source": cosine.render(),
                "params": { "vector": vector },
            }
        }),
    );
    for field in &request.fields {
        let passthrough = ScoreExpr::FieldValue {
            field: field.clone(),
        };
        script_fields.insert(
            field.clone(),
            json!({ "script": { "source": passthrough.render() } }),
        );
    }

    let mut body = Map::new();
    body.insert("size".to_string(), json!(request.size));
    body.insert(
        "query".to_string(),
        json!({
            "knn": {
                (request.vector_field.as_str()): {
                    "vector": request.vector.as_slice(),
                    "k": request.k,
                }
            }
        }),
    );
    body.insert("script_fields".to_string(), Value::Object(script_fields));

    if let Some(offset) = request.offset
        && offset > 0
    {
        body.insert("from".to_string(), json!(offset));
    }

    if !request.filters.is_empty() {
        let terms: Vec<Value> = request
            .filters
            .iter()
            .map(|(field, value)| json!({ "term": { (field.as_str()): value } }))
            .collect();
        body.insert(
            "post_filter".to_string(),
            json!({ "bool": { "filter": terms } }),
        );
    }

    Value::Object(body)
}

/// Render a neighbor request without scripted fields, for engines that
/// cannot evaluate them. The full document source rides back instead, so
/// the service can compute similarity locally from the stored vector.
pub fn neighbor_body_unscored(request: &NeighborRequest) -> Value {
    let mut body = neighbor_body(request);
    if let Value::Object(map) = &mut body {
        map.remove("script_fields");
    }
    body
}

/// Render the one-shot exact-match lookup that resolves `field:value` to a
/// stored vector. Returns at most one document, with `_source` limited to
/// the vector field.
pub fn lookup_body(field: &str, value: &str, vector_field: &str) -> Value {
    json!({
        "query": {
            "query_string": {
                "query": format!("{field}:{value}"),
            }
        },
        "_source": vector_field,
        "from": 0,
        "size": 1,
    })
}

/// Render a random-sample query, optionally projecting only the named
/// source fields.
pub fn random_body(size: usize, fields: &[String]) -> Value {
    let mut body = Map::new();
    body.insert("size".to_string(), json!(size));
    body.insert(
        "query".to_string(),
        json!({
            "function_score": {
                "random_score": { "field": "_seq_no" },
            }
        }),
    );
    if !fields.is_empty() {
        body.insert("_source".to_string(), json!(fields));
    }
    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::NeighborRequestBuilder;
    use crate::vector::QueryVector;

    fn sample_request() -> NeighborRequest {
        NeighborRequestBuilder::new(QueryVector::new(vec![0.1, 0.2]).unwrap())
            .k(5)
            .size(10)
            .build()
            .unwrap()
    }

    #[test]
    fn test_neighbor_body_shape() {
        let body = neighbor_body(&sample_request());
        assert_eq!(body["size"], json!(10));
        assert_eq!(body["query"]["knn"]["vector"]["k"], json!(5));
        assert_eq!(body["query"]["knn"]["vector"]["vector"], json!([0.1, 0.2]));
        assert_eq!(
            body["script_fields"]["similarity"]["script"]["lang"],
            json!("painless")
        );
        assert_eq!(
            body["script_fields"]["similarity"]["script"]["params"]["vector"],
            json!([0.1, 0.2])
        );
        assert!(body.get("from").is_none());
        assert!(body.get("post_filter").is_none());
    }

    #[test]
    fn test_projected_fields_become_script_fields() {
        let request = NeighborRequestBuilder::new(QueryVector::new(vec![0.1]).unwrap())
            .fields(["a", " b "])
            .build()
            .unwrap();
        let body = neighbor_body(&request);
        assert_eq!(
            body["script_fields"]["a"]["script"]["source"],
            json!("params['_source']['a']")
        );
        assert_eq!(
            body["script_fields"]["b"]["script"]["source"],
            json!("params['_source']['b']")
        );
    }

    #[test]
    fn test_zero_offset_omits_from() {
        let request = NeighborRequestBuilder::new(QueryVector::new(vec![0.1]).unwrap())
            .offset(0)
            .build()
            .unwrap();
        assert!(neighbor_body(&request).get("from").is_none());

        let request = NeighborRequestBuilder::new(QueryVector::new(vec![0.1]).unwrap())
            .offset(30)
            .build()
            .unwrap();
        assert_eq!(neighbor_body(&request)["from"], json!(30));
    }

    #[test]
    fn test_filters_render_as_post_filter_terms() {
        let request = NeighborRequestBuilder::new(QueryVector::new(vec![0.1]).unwrap())
            .filter("lang", "es")
            .build()
            .unwrap();
        let body = neighbor_body(&request);
        assert_eq!(
            body["post_filter"]["bool"]["filter"][0]["term"]["lang"],
            json!("es")
        );
    }

    #[test]
    fn test_custom_vector_field_flows_through() {
        let request = NeighborRequestBuilder::new(QueryVector::new(vec![0.1]).unwrap())
            .vector_field("embedding")
            .build()
            .unwrap();
        let body = neighbor_body(&request);
        assert!(body["query"]["knn"].get("embedding").is_some());
        let script = body["script_fields"]["similarity"]["script"]["source"]
            .as_str()
            .unwrap();
        assert!(script.contains("params['_source']['embedding']"));
    }

    #[test]
    fn test_unscored_body_drops_script_fields() {
        let body = neighbor_body_unscored(&sample_request());
        assert!(body.get("script_fields").is_none());
        assert!(body["query"]["knn"].get("vector").is_some());
    }

    #[test]
    fn test_lookup_body_shape() {
        let body = lookup_body("filename", "cover.png", "vector");
        assert_eq!(
            body["query"]["query_string"]["query"],
            json!("filename:cover.png")
        );
        assert_eq!(body["_source"], json!("vector"));
        assert_eq!(body["size"], json!(1));
    }

    #[test]
    fn test_random_body_projects_fields() {
        let body = random_body(20, &["title".to_string()]);
        assert_eq!(body["size"], json!(20));
        assert_eq!(body["_source"], json!(["title"]));
        assert!(body["query"]["function_score"].get("random_score").is_some());

        let body = random_body(5, &[]);
        assert!(body.get("_source").is_none());
    }
}
