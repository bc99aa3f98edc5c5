use crate::chunking::build_chunks;
use crate::embeddings::{EmbeddingBackend, EmbeddingProvider};
use crate::extractor::extract_document;
use crate::traits::VectorIndex;
use crate::{CompareError, IndexedChunk, IngestError, IngestionOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub fn discover_pdf_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

pub struct SkippedPdf {
    pub path: PathBuf,
    pub reason: String,
}

pub struct IngestionReport {
    pub sources: Vec<String>,
    pub chunks: Vec<IndexedChunk>,
    pub skipped_files: Vec<SkippedPdf>,
}

pub fn ingest_folder_chunks_best_effort(
    folder: &Path,
    options: &IngestionOptions,
) -> Result<IngestionReport, IngestError> {
    let files = discover_pdf_files(folder);

    if files.is_empty() {
        return Err(IngestError::InvalidArgument(format!(
            "no pdf files found in {}",
            folder.display()
        )));
    }

    let mut sources = Vec::new();
    let mut chunks = Vec::new();
    let mut skipped_files = Vec::new();

    for path in files {
        let build_result = extract_document(&path).and_then(|document| {
            let file_chunks = build_chunks(&document.source, &document.content, options)?;
            Ok((document.source, file_chunks))
        });

        match build_result {
            Ok((source, file_chunks)) => {
                debug!(source = %source, chunks = file_chunks.len(), "pdf chunked");
                sources.push(source);
                chunks.extend(file_chunks);
            }
            Err(error) => {
                warn!(path = %path.display(), reason = %error, "skipped pdf");
                skipped_files.push(SkippedPdf {
                    path,
                    reason: error.to_string(),
                });
            }
        }
    }

    Ok(IngestionReport {
        sources,
        chunks,
        skipped_files,
    })
}

pub async fn index_chunks<B, V>(
    chunks: &[IndexedChunk],
    embedder: &EmbeddingProvider<B>,
    index: &V,
) -> Result<usize, CompareError>
where
    B: EmbeddingBackend,
    V: VectorIndex + ?Sized,
{
    if chunks.is_empty() {
        return Ok(0);
    }

    let texts = chunks
        .iter()
        .map(|chunk| chunk.content.clone())
        .collect::<Vec<_>>();
    let embeddings = embedder.embed_documents(&texts).await?;
    index.add_chunks(chunks, &embeddings).await?;

    info!(
        chunk_count = chunks.len(),
        batch_size = embedder.batch_size(),
        "chunks indexed"
    );
    Ok(chunks.len())
}
