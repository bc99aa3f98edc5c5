use crate::embeddings::{EmbeddingBackend, EmbeddingProvider};
use crate::prompt::PromptAssembler;
use crate::selection::{DistinctSourceSelector, REQUIRED_SOURCES};
use crate::traits::{AnswerGenerator, VectorIndex};
use crate::{CompareError, ComparisonAnswer, ComparisonOptions, Document, SearchCandidate};
use std::sync::Arc;
use tracing::{debug, info};

pub struct ComparisonPipeline<E, V, G>
where
    E: EmbeddingBackend,
    V: VectorIndex + ?Sized,
    G: AnswerGenerator,
{
    embedder: EmbeddingProvider<E>,
    index: Arc<V>,
    generator: G,
    selector: DistinctSourceSelector,
    assembler: PromptAssembler,
    options: ComparisonOptions,
}

impl<E, V, G> ComparisonPipeline<E, V, G>
where
    E: EmbeddingBackend,
    V: VectorIndex + ?Sized,
    G: AnswerGenerator,
{
    pub fn new(embedder: EmbeddingProvider<E>, index: Arc<V>, generator: G) -> Self {
        Self {
            embedder,
            index,
            generator,
            selector: DistinctSourceSelector::new(),
            assembler: PromptAssembler::new(),
            options: ComparisonOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ComparisonOptions) -> Self {
        self.options = options;
        self
    }

    pub fn index(&self) -> &Arc<V> {
        &self.index
    }

    pub async fn compare(
        &self,
        question: &str,
        pre_supplied: &[Document],
    ) -> Result<ComparisonAnswer, CompareError> {
        let candidates = self.retrieve(question, pre_supplied).await?;
        let pair = self.selector.select_pair(pre_supplied, &candidates)?;

        info!(
            first = %pair.first.source,
            second = %pair.second.source,
            "comparison sources selected"
        );

        let prompt = self
            .assembler
            .build(question, &pair.first.content, &pair.second.content);
        let answer = self.generator.generate(&prompt).await?;

        Ok(ComparisonAnswer {
            answer,
            sources: pair.source_ids(),
        })
    }

    async fn retrieve(
        &self,
        question: &str,
        pre_supplied: &[Document],
    ) -> Result<Vec<SearchCandidate>, CompareError> {
        if pre_supplied.len() >= REQUIRED_SOURCES {
            debug!(
                pre_supplied = pre_supplied.len(),
                "enough pre-supplied documents, index not consulted"
            );
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed_query(question).await?;
        let candidates = self
            .index
            .similarity_search(&query_vector, self.options.top_k)
            .await?;

        debug!(
            top_k = self.options.top_k,
            candidates = candidates.len(),
            "vector search finished"
        );
        Ok(candidates)
    }
}
