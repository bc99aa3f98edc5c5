use crate::traits::VectorIndex;
use crate::{IndexedChunk, SearchCandidate, SearchError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::info;
use url::Url;
use uuid::Uuid;

pub struct QdrantStore {
    endpoint: Url,
    collection: String,
    client: Client,
    vector_size: usize,
}

impl QdrantStore {
    pub fn new(
        endpoint: &str,
        collection: impl Into<String>,
        vector_size: usize,
    ) -> Result<Self, SearchError> {
        Ok(Self {
            endpoint: Url::parse(endpoint)?,
            collection: collection.into(),
            client: Client::new(),
            vector_size,
        })
    }

    fn collection_url(&self, suffix: &str) -> Result<Url, SearchError> {
        Ok(self
            .endpoint
            .join(&format!("collections/{}{}", self.collection, suffix))?)
    }

    pub async fn ensure_collection(&self) -> Result<(), SearchError> {
        let response = self.client.get(self.collection_url("")?).send().await?;

        if response.status() == StatusCode::OK {
            return Ok(());
        }

        if response.status() != StatusCode::NOT_FOUND {
            return Err(SearchError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        let response = self
            .client
            .put(self.collection_url("")?)
            .json(&json!({
                "vectors": {
                    "size": self.vector_size,
                    "distance": "Cosine",
                }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SearchError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        info!(
            collection = %self.collection,
            vector_size = self.vector_size,
            "qdrant collection created"
        );
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for QdrantStore {
    async fn add_chunks(
        &self,
        chunks: &[IndexedChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<(), SearchError> {
        if chunks.len() != embeddings.len() {
            return Err(SearchError::Request(format!(
                "embedding count {} doesn't match chunk count {}",
                embeddings.len(),
                chunks.len()
            )));
        }

        let points = chunks
            .iter()
            .zip(embeddings.iter())
            .map(|(chunk, embedding)| {
                if embedding.len() != self.vector_size {
                    return Err(SearchError::DimensionMismatch {
                        expected: self.vector_size,
                        actual: embedding.len(),
                    });
                }

                Ok(json!({
                    "id": point_id(&chunk.chunk_id).to_string(),
                    "vector": embedding,
                    "payload": {
                        "chunk_id": chunk.chunk_id,
                        "source": chunk.source,
                        "chunk_index": chunk.chunk_index,
                        "content": chunk.content,
                    },
                }))
            })
            .collect::<Result<Vec<_>, SearchError>>()?;

        if points.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .put(self.collection_url("/points?wait=true")?)
            .json(&json!({ "points": points }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SearchError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        Ok(())
    }

    async fn similarity_search(
        &self,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<SearchCandidate>, SearchError> {
        if query_vector.len() != self.vector_size {
            return Err(SearchError::DimensionMismatch {
                expected: self.vector_size,
                actual: query_vector.len(),
            });
        }

        let response = self
            .client
            .post(self.collection_url("/points/search")?)
            .json(&json!({
                "vector": query_vector,
                "limit": k,
                "with_payload": true,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(search_status_error(response.status(), &self.collection));
        }

        let parsed: Value = response.json().await?;
        parse_hits(&parsed)
    }
}

fn search_status_error(status: StatusCode, collection: &str) -> SearchError {
    let details = if status == StatusCode::NOT_FOUND {
        format!("collection {collection} does not exist; run ingest first")
    } else {
        status.to_string()
    };

    SearchError::BackendResponse {
        backend: "qdrant".to_string(),
        details,
    }
}

fn point_id(chunk_id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, chunk_id.as_bytes())
}

fn parse_hits(parsed: &Value) -> Result<Vec<SearchCandidate>, SearchError> {
    let hits = parsed
        .pointer("/result")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut result = Vec::new();
    for hit in hits {
        let source = hit
            .pointer("/payload/source")
            .and_then(Value::as_str)
            .filter(|source| !source.is_empty())
            .ok_or_else(|| SearchError::BackendResponse {
                backend: "qdrant".to_string(),
                details: "search hit has no payload source".to_string(),
            })?
            .to_string();
        let content = hit
            .pointer("/payload/content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let score = hit.pointer("/score").and_then(Value::as_f64).unwrap_or(0.0);

        result.push(SearchCandidate {
            content,
            source,
            distance: 1.0 - score,
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::{parse_hits, point_id, search_status_error, QdrantStore};
    use crate::SearchError;
    use reqwest::StatusCode;
    use serde_json::json;

    #[test]
    fn hits_keep_server_order_and_convert_scores() {
        let payload = json!({
            "result": [
                { "id": "a", "score": 0.9, "payload": { "source": "a.pdf", "content": "alpha" } },
                { "id": "b", "score": 0.5, "payload": { "source": "b.pdf", "content": "beta" } },
            ],
            "status": "ok",
        });

        let hits = parse_hits(&payload).expect("hits are well formed");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].source, "a.pdf");
        assert_eq!(hits[0].content, "alpha");
        assert!((hits[0].distance - 0.1).abs() < 1e-9);
        assert_eq!(hits[1].source, "b.pdf");
    }

    #[test]
    fn missing_result_yields_no_hits() {
        let hits = parse_hits(&json!({ "status": "ok" })).expect("no result is not an error");
        assert!(hits.is_empty());
    }

    #[test]
    fn hits_without_a_source_are_rejected() {
        let missing = json!({
            "result": [{ "id": "a", "score": 0.9, "payload": { "content": "alpha" } }],
        });
        let empty = json!({
            "result": [
                { "id": "a", "score": 0.9, "payload": { "source": "", "content": "alpha" } },
            ],
        });

        assert!(matches!(parse_hits(&missing), Err(SearchError::BackendResponse { .. })));
        assert!(matches!(parse_hits(&empty), Err(SearchError::BackendResponse { .. })));
    }

    #[test]
    fn missing_collection_on_search_names_the_collection() {
        let error = search_status_error(StatusCode::NOT_FOUND, "documents");
        assert!(matches!(
            &error,
            SearchError::BackendResponse { details, .. } if details.contains("documents")
        ));

        let other = search_status_error(StatusCode::INTERNAL_SERVER_ERROR, "documents");
        assert!(matches!(
            other,
            SearchError::BackendResponse { details, .. } if details.starts_with("500")
        ));
    }

    #[test]
    fn point_ids_are_stable_per_chunk() {
        assert_eq!(point_id("chunk-0"), point_id("chunk-0"));
        assert_ne!(point_id("chunk-0"), point_id("chunk-1"));
    }

    #[test]
    fn collection_urls_are_joined_onto_endpoint() {
        let store = QdrantStore::new("http://localhost:6333", "documents", 4)
            .expect("endpoint is valid");
        let url = store
            .collection_url("/points/search")
            .expect("url should join");
        assert_eq!(url.as_str(), "http://localhost:6333/collections/documents/points/search");
    }
}
