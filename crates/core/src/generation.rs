use crate::traits::AnswerGenerator;
use crate::GenerationError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use url::Url;

pub const DEFAULT_GENERATION_MODEL: &str = "mistral";

pub struct OllamaGenerator {
    endpoint: Url,
    model: String,
    client: Client,
}

impl OllamaGenerator {
    pub fn new(endpoint: &str, model: impl Into<String>) -> Result<Self, GenerationError> {
        Ok(Self {
            endpoint: Url::parse(endpoint)?,
            model: model.into(),
            client: Client::new(),
        })
    }
}

#[async_trait]
impl AnswerGenerator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(self.endpoint.join("api/generate")?)
            .json(&json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GenerationError::BackendResponse {
                backend: "ollama".to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: Value = response.json().await?;
        parse_completion(&parsed)
    }
}

fn parse_completion(parsed: &Value) -> Result<String, GenerationError> {
    parsed
        .pointer("/response")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| GenerationError::BackendResponse {
            backend: "ollama".to_string(),
            details: parsed
                .pointer("/error")
                .and_then(Value::as_str)
                .unwrap_or("response field missing")
                .to_string(),
        })
}
