use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use pdf_compare_core::{
    extract_document, index_chunks, ingest_folder_chunks_best_effort, CharacterNgramEmbedder,
    CompareError, ComparisonOptions, ComparisonPipeline, EmbeddingBackend, EmbeddingConfig,
    EmbeddingProvider, IngestionOptions, LocalIndex, OllamaEmbedder, OllamaGenerator,
    QdrantStore, VectorIndex,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pdf-compare", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Vector index backend
    #[arg(long, value_enum, default_value_t = IndexBackend::Local, env = "PDF_COMPARE_INDEX")]
    index_backend: IndexBackend,

    /// Directory of the local vector index
    #[arg(long, default_value = "chroma", env = "PDF_COMPARE_INDEX_PATH")]
    index_path: PathBuf,

    /// Qdrant base URL
    #[arg(long, default_value = "http://localhost:6333", env = "QDRANT_URL")]
    qdrant_url: String,

    /// Qdrant collection
    #[arg(long, default_value = "documents", env = "QDRANT_COLLECTION")]
    qdrant_collection: String,

    /// Embedding backend
    #[arg(long, value_enum, default_value_t = EmbedderKind::Ngram, env = "PDF_COMPARE_EMBEDDER")]
    embedder: EmbedderKind,

    /// Ollama base URL, used for remote embeddings and answer generation
    #[arg(long, default_value = "http://localhost:11434", env = "OLLAMA_URL")]
    ollama_url: String,

    /// Ollama embedding model
    #[arg(long, default_value = "all-minilm", env = "PDF_COMPARE_EMBEDDING_MODEL")]
    embedding_model: String,

    /// Vector size produced by the embedding model (ngram and ollama backends)
    #[arg(long, default_value = "384", env = "PDF_COMPARE_EMBEDDING_DIMENSIONS")]
    embedding_dimensions: usize,

    /// Local BERT model directory (config.json, tokenizer.json, model.safetensors)
    #[arg(long, env = "PDF_COMPARE_MODEL_DIR")]
    model_dir: Option<PathBuf>,

    /// Maximum number of texts per embedding call
    #[arg(long, default_value = "32", env = "PDF_COMPARE_BATCH_SIZE")]
    batch_size: usize,

    /// Ollama model that writes the answer
    #[arg(long, default_value = "mistral", env = "PDF_COMPARE_LLM_MODEL")]
    llm_model: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum IndexBackend {
    Local,
    Qdrant,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EmbedderKind {
    Ngram,
    Ollama,
    Bert,
}

#[derive(Subcommand)]
enum Command {
    /// Extract, chunk, embed and index every PDF in a folder.
    Ingest {
        /// Folder that contains PDFs recursively.
        #[arg(long)]
        folder: PathBuf,
    },
    /// Answer a question by comparing two distinct source documents.
    Query {
        /// Question to answer
        #[arg(long)]
        question: String,
        /// PDF to compare against; repeat to supply several.
        /// Supplied PDFs take priority over indexed documents.
        #[arg(long = "pdf")]
        pdfs: Vec<PathBuf>,
        /// Number of candidates to request from the index.
        #[arg(long, default_value = "50")]
        top_k: usize,
    },
}

fn build_embedder(cli: &Cli) -> anyhow::Result<EmbeddingProvider<Box<dyn EmbeddingBackend>>> {
    let backend: Box<dyn EmbeddingBackend> = match cli.embedder {
        EmbedderKind::Ngram => Box::new(CharacterNgramEmbedder::new(cli.embedding_dimensions)),
        EmbedderKind::Ollama => Box::new(OllamaEmbedder::new(
            &cli.ollama_url,
            cli.embedding_model.clone(),
            cli.embedding_dimensions,
        )?),
        EmbedderKind::Bert => load_bert(cli)?,
    };

    Ok(EmbeddingProvider::new(
        backend,
        EmbeddingConfig {
            batch_size: cli.batch_size,
        },
    )?)
}

#[cfg(feature = "bert")]
fn load_bert(cli: &Cli) -> anyhow::Result<Box<dyn EmbeddingBackend>> {
    let model_dir = cli
        .model_dir
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("--model-dir is required for the bert embedder"))?;
    Ok(Box::new(pdf_compare_core::BertEmbedder::from_dir(model_dir)?))
}

#[cfg(not(feature = "bert"))]
fn load_bert(cli: &Cli) -> anyhow::Result<Box<dyn EmbeddingBackend>> {
    let _ = &cli.model_dir;
    anyhow::bail!("the bert embedder requires building with `--features bert`")
}

fn creates_collection(command: &Command) -> bool {
    matches!(command, Command::Ingest { .. })
}

async fn open_index(cli: &Cli, dimensions: usize) -> anyhow::Result<Arc<dyn VectorIndex>> {
    let index: Arc<dyn VectorIndex> = match cli.index_backend {
        IndexBackend::Local => Arc::new(LocalIndex::open(&cli.index_path)?),
        IndexBackend::Qdrant => {
            let store =
                QdrantStore::new(&cli.qdrant_url, cli.qdrant_collection.clone(), dimensions)?;
            if creates_collection(&cli.command) {
                store.ensure_collection().await?;
            }
            Arc::new(store)
        }
    };
    Ok(index)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "pdf-compare boot"
    );

    let embedder = build_embedder(&cli)?;
    let index = open_index(&cli, embedder.dimensions()).await?;

    match &cli.command {
        Command::Ingest { folder } => {
            let report = ingest_folder_chunks_best_effort(folder, &IngestionOptions::default())?;

            if !report.skipped_files.is_empty() {
                warn!(
                    "skipped_files={} for folder={}",
                    report.skipped_files.len(),
                    folder.display()
                );
            }

            info!(
                folder = %folder.display(),
                documents = report.sources.len(),
                chunk_count = report.chunks.len(),
                "indexing chunks"
            );

            let written = index_chunks(&report.chunks, &embedder, &*index).await?;

            println!(
                "{} chunks from {} documents indexed at {}",
                written,
                report.sources.len(),
                Utc::now().to_rfc3339()
            );
        }
        Command::Query {
            question,
            pdfs,
            top_k,
        } => {
            let uploads = pdfs
                .iter()
                .map(|path| extract_document(path))
                .collect::<Result<Vec<_>, _>>()?;

            let generator = OllamaGenerator::new(&cli.ollama_url, cli.llm_model.clone())?;
            let pipeline = ComparisonPipeline::new(embedder, index, generator)
                .with_options(ComparisonOptions { top_k: *top_k });

            match pipeline.compare(question, &uploads).await {
                Ok(answer) => println!("{answer}"),
                Err(CompareError::InsufficientSources) => {
                    eprintln!("{}", CompareError::InsufficientSources);
                    std::process::exit(1);
                }
                Err(error) => return Err(error.into()),
            }
        }
    }

    Ok(())
}
