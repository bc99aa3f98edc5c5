use crate::{GenerationError, IndexedChunk, SearchCandidate, SearchError};
use async_trait::async_trait;

#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn add_chunks(
        &self,
        chunks: &[IndexedChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<(), SearchError>;

    async fn similarity_search(
        &self,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<SearchCandidate>, SearchError>;
}

#[async_trait]
impl<T> VectorIndex for Box<T>
where
    T: VectorIndex + ?Sized,
{
    async fn add_chunks(
        &self,
        chunks: &[IndexedChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<(), SearchError> {
        (**self).add_chunks(chunks, embeddings).await
    }

    async fn similarity_search(
        &self,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<SearchCandidate>, SearchError> {
        (**self).similarity_search(query_vector, k).await
    }
}

#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[async_trait]
impl<T> AnswerGenerator for Box<T>
where
    T: AnswerGenerator + ?Sized,
{
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        (**self).generate(prompt).await
    }
}
