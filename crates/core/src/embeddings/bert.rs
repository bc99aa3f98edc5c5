use super::EmbeddingBackend;
use crate::error::EmbeddingError;
use async_trait::async_trait;
use candle_core::{Device, IndexOp, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use serde_json::Value;
use std::path::Path;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer};
use tracing::info;

pub struct BertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dimensions: usize,
}

impl BertEmbedder {
    pub fn from_dir(model_dir: &Path) -> Result<Self, EmbeddingError> {
        let device = Device::Cpu;

        let config_path = model_dir.join("config.json");
        let raw_config = std::fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&raw_config)?;
        let dimensions = serde_json::from_str::<Value>(&raw_config)?
            .pointer("/hidden_size")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                EmbeddingError::Model(format!(
                    "hidden_size missing from {}",
                    config_path.display()
                ))
            })? as usize;

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|error| {
            EmbeddingError::Model(format!(
                "failed to load tokenizer from {}: {error}",
                tokenizer_path.display()
            ))
        })?;

        let weights_path = model_dir.join("model.safetensors");
        // SAFETY: the weights file is only read and must not be modified while mapped.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DTYPE, &device)? };
        let model = BertModel::load(vb, &config)?;

        info!(model_dir = %model_dir.display(), dimensions, "bert embedder loaded");

        Ok(Self::from_parts(model, tokenizer, device, dimensions))
    }

    pub fn from_parts(
        model: BertModel,
        mut tokenizer: Tokenizer,
        device: Device,
        dimensions: usize,
    ) -> Self {
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));

        Self {
            model,
            tokenizer,
            device,
            dimensions,
        }
    }

    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.iter().map(String::as_str).collect::<Vec<_>>(), true)
            .map_err(|error| EmbeddingError::Model(format!("tokenization failed: {error}")))?;

        let mut ids = Vec::with_capacity(encodings.len());
        let mut masks = Vec::with_capacity(encodings.len());
        for encoding in &encodings {
            ids.push(Tensor::new(encoding.get_ids(), &self.device)?);
            masks.push(Tensor::new(encoding.get_attention_mask(), &self.device)?);
        }

        let input_ids = Tensor::stack(&ids, 0)?;
        let attention_mask = Tensor::stack(&masks, 0)?;
        let token_type_ids = input_ids.zeros_like()?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = hidden.i((.., 0))?;

        Ok(pooled.to_vec2::<f32>()?)
    }
}

#[async_trait]
impl EmbeddingBackend for BertEmbedder {
    fn name(&self) -> &str {
        "bert"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.encode(texts)
    }
}
