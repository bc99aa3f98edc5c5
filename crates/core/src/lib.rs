pub mod chunking;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod generation;
pub mod ingest;
pub mod models;
pub mod orchestrator;
pub mod prompt;
pub mod selection;
pub mod stores;
pub mod traits;

pub use chunking::{build_chunks, chunk_by_paragraph, normalize_whitespace, ChunkingConfig};
#[cfg(feature = "bert")]
pub use embeddings::BertEmbedder;
pub use embeddings::{
    CharacterNgramEmbedder, EmbeddingBackend, EmbeddingConfig, EmbeddingProvider, OllamaEmbedder,
    DEFAULT_BATCH_SIZE, DEFAULT_EMBEDDING_DIMENSIONS,
};
pub use error::{CompareError, EmbeddingError, GenerationError, IngestError, SearchError};
pub use extractor::{extract_document, PageText, PdfExtractor};
pub use generation::{OllamaGenerator, DEFAULT_GENERATION_MODEL};
pub use ingest::{
    discover_pdf_files, index_chunks, ingest_folder_chunks_best_effort, IngestionReport,
    SkippedPdf,
};
pub use models::{
    ComparisonAnswer, ComparisonOptions, DocContext, Document, IndexedChunk, IngestionOptions,
    SearchCandidate, SelectedSources,
};
pub use orchestrator::ComparisonPipeline;
pub use prompt::{PromptAssembler, COMPARISON_PROMPT_TEMPLATE};
pub use selection::DistinctSourceSelector;
pub use stores::{LocalIndex, QdrantStore};
pub use traits::{AnswerGenerator, VectorIndex};
