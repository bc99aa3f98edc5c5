#[cfg(feature = "bert")]
pub mod bert;
pub mod ngram;
pub mod ollama;

#[cfg(feature = "bert")]
pub use bert::BertEmbedder;
pub use ngram::{CharacterNgramEmbedder, DEFAULT_EMBEDDING_DIMENSIONS};
pub use ollama::OllamaEmbedder;

use crate::error::EmbeddingError;
use async_trait::async_trait;
use tracing::debug;

pub const DEFAULT_BATCH_SIZE: usize = 32;

#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    fn name(&self) -> &str;

    fn dimensions(&self) -> usize;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

#[async_trait]
impl<T> EmbeddingBackend for Box<T>
where
    T: EmbeddingBackend + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed_batch(texts).await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EmbeddingConfig {
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

pub struct EmbeddingProvider<B> {
    backend: B,
    config: EmbeddingConfig,
}

impl<B> EmbeddingProvider<B>
where
    B: EmbeddingBackend,
{
    pub fn new(backend: B, config: EmbeddingConfig) -> Result<Self, EmbeddingError> {
        if config.batch_size == 0 {
            return Err(EmbeddingError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        Ok(Self { backend, config })
    }

    pub fn with_default_config(backend: B) -> Self {
        Self {
            backend,
            config: EmbeddingConfig::default(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    pub fn dimensions(&self) -> usize {
        self.backend.dimensions()
    }

    pub async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for (batch_index, batch) in texts.chunks(self.config.batch_size).enumerate() {
            debug!(
                backend = self.backend.name(),
                batch_index,
                batch_len = batch.len(),
                "embedding batch"
            );
            let vectors = self.backend.embed_batch(batch).await?;
            self.check_batch(batch.len(), &vectors)?;
            embeddings.extend(vectors);
        }

        Ok(embeddings)
    }

    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let batch = [text.to_string()];
        let vectors = self.backend.embed_batch(&batch).await?;
        self.check_batch(1, &vectors)?;

        vectors
            .into_iter()
            .next()
            .ok_or(EmbeddingError::CountMismatch {
                expected: 1,
                actual: 0,
            })
    }

    fn check_batch(&self, expected: usize, vectors: &[Vec<f32>]) -> Result<(), EmbeddingError> {
        if vectors.len() != expected {
            return Err(EmbeddingError::CountMismatch {
                expected,
                actual: vectors.len(),
            });
        }

        let dimensions = self.backend.dimensions();
        if let Some(vector) = vectors.iter().find(|vector| vector.len() != dimensions) {
            return Err(EmbeddingError::DimensionMismatch {
                expected: dimensions,
                actual: vector.len(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBackend {
        batch_sizes: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl EmbeddingBackend for RecordingBackend {
        fn name(&self) -> &str {
            "recording"
        }

        fn dimensions(&self) -> usize {
            2
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.batch_sizes
                .lock()
                .expect("lock should not be poisoned")
                .push(texts.len());
            Ok(texts
                .iter()
                .map(|text| vec![text.len() as f32, 1.0])
                .collect())
        }
    }

    struct ShortBackend;

    #[async_trait]
    impl EmbeddingBackend for ShortBackend {
        fn name(&self) -> &str {
            "short"
        }

        fn dimensions(&self) -> usize {
            4
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().skip(1).map(|_| vec![0.0; 4]).collect())
        }
    }

    fn texts(count: usize) -> Vec<String> {
        (0..count).map(|index| "x".repeat(index + 1)).collect()
    }

    #[tokio::test]
    async fn documents_are_split_into_bounded_batches_in_order() {
        let provider = EmbeddingProvider::new(
            RecordingBackend::default(),
            EmbeddingConfig { batch_size: 3 },
        )
        .expect("valid config");

        let inputs = texts(7);
        let vectors = provider
            .embed_documents(&inputs)
            .await
            .expect("embedding should succeed");

        assert_eq!(vectors.len(), 7);
        for (index, vector) in vectors.iter().enumerate() {
            assert_eq!(vector[0], (index + 1) as f32);
        }
        let sizes = provider
            .backend()
            .batch_sizes
            .lock()
            .expect("lock should not be poisoned")
            .clone();
        assert_eq!(sizes, vec![3, 3, 1]);
    }

    #[tokio::test]
    async fn batching_does_not_change_results() {
        let inputs = texts(10);
        let single = EmbeddingProvider::new(
            CharacterNgramEmbedder::default(),
            EmbeddingConfig { batch_size: 32 },
        )
        .expect("valid config");
        let split = EmbeddingProvider::new(
            CharacterNgramEmbedder::default(),
            EmbeddingConfig { batch_size: 4 },
        )
        .expect("valid config");

        let whole = single.embed_documents(&inputs).await.expect("embed");
        let batched = split.embed_documents(&inputs).await.expect("embed");
        assert_eq!(whole, batched);
    }

    #[tokio::test]
    async fn query_and_documents_share_dimensions() {
        let provider = EmbeddingProvider::with_default_config(CharacterNgramEmbedder::default());
        let documents = provider
            .embed_documents(&texts(3))
            .await
            .expect("embed documents");
        let query = provider.embed_query("hydraulic pump").await.expect("embed query");

        assert_eq!(query.len(), provider.dimensions());
        assert!(documents.iter().all(|vector| vector.len() == query.len()));
    }

    #[tokio::test]
    async fn empty_input_makes_no_backend_calls() {
        let provider = EmbeddingProvider::with_default_config(RecordingBackend::default());
        let vectors = provider.embed_documents(&[]).await.expect("embed");

        assert!(vectors.is_empty());
        assert!(provider
            .backend()
            .batch_sizes
            .lock()
            .expect("lock should not be poisoned")
            .is_empty());
    }

    #[tokio::test]
    async fn backend_returning_too_few_vectors_is_rejected() {
        let provider = EmbeddingProvider::with_default_config(ShortBackend);
        let result = provider.embed_documents(&texts(2)).await;

        assert!(matches!(
            result,
            Err(EmbeddingError::CountMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let result = EmbeddingProvider::new(
            CharacterNgramEmbedder::default(),
            EmbeddingConfig { batch_size: 0 },
        );
        assert!(matches!(result, Err(EmbeddingError::InvalidConfig(_))));
    }
}
