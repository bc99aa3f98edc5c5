use super::EmbeddingBackend;
use crate::error::EmbeddingError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use url::Url;

pub struct OllamaEmbedder {
    endpoint: Url,
    model: String,
    dimensions: usize,
    client: Client,
}

impl OllamaEmbedder {
    pub fn new(
        endpoint: &str,
        model: impl Into<String>,
        dimensions: usize,
    ) -> Result<Self, EmbeddingError> {
        Ok(Self {
            endpoint: Url::parse(endpoint)?,
            model: model.into(),
            dimensions,
            client: Client::new(),
        })
    }
}

#[async_trait]
impl EmbeddingBackend for OllamaEmbedder {
    fn name(&self) -> &str {
        "ollama"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(self.endpoint.join("api/embed")?)
            .json(&json!({
                "model": self.model,
                "input": texts,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EmbeddingError::BackendResponse {
                backend: "ollama".to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: Value = response.json().await?;
        parse_embeddings(&parsed)
    }
}

fn parse_embeddings(parsed: &Value) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let rows = parsed
        .pointer("/embeddings")
        .and_then(Value::as_array)
        .ok_or_else(|| EmbeddingError::BackendResponse {
            backend: "ollama".to_string(),
            details: "response has no embeddings array".to_string(),
        })?;

    rows.iter()
        .map(|row| {
            row.as_array()
                .map(|values| {
                    values
                        .iter()
                        .filter_map(Value::as_f64)
                        .map(|value| value as f32)
                        .collect::<Vec<_>>()
                })
                .ok_or_else(|| EmbeddingError::BackendResponse {
                    backend: "ollama".to_string(),
                    details: "embedding row is not an array".to_string(),
                })
        })
        .collect()
}
