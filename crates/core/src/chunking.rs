use crate::error::IngestError;
use crate::models::{IndexedChunk, IngestionOptions};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub max_chars: usize,
    pub overlap_chars: usize,
    pub min_chars: usize,
}

impl From<&IngestionOptions> for ChunkingConfig {
    fn from(value: &IngestionOptions) -> Self {
        Self {
            max_chars: value.chunk_max_chars,
            overlap_chars: value.chunk_overlap_chars,
            min_chars: value.min_chunk_chars,
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.max_chars == 0 {
            return Err(IngestError::InvalidChunkConfig(
                "max_chars must be positive".to_string(),
            ));
        }
        if self.overlap_chars >= self.max_chars {
            return Err(IngestError::InvalidChunkConfig(format!(
                "overlap {} must be smaller than max {}",
                self.overlap_chars, self.max_chars
            )));
        }
        Ok(())
    }
}

pub fn normalize_whitespace(text: &str) -> String {
    text.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn chunk_by_paragraph(text: &str, config: ChunkingConfig) -> Vec<String> {
    let paragraphs = text
        .replace("\r\n", "\n")
        .split("\n\n")
        .map(normalize_whitespace)
        .filter(|paragraph| !paragraph.is_empty())
        .collect::<Vec<_>>();

    let mut packed = Vec::new();
    let mut current = String::new();

    for paragraph in paragraphs {
        if current.is_empty() {
            current = paragraph;
            continue;
        }

        if current.chars().count() + paragraph.chars().count() + 2 <= config.max_chars {
            current.push_str("\n\n");
            current.push_str(&paragraph);
        } else {
            packed.push(std::mem::replace(&mut current, paragraph));
        }
    }

    if !current.is_empty() {
        packed.push(current);
    }

    let step = config.max_chars.saturating_sub(config.overlap_chars).max(1);
    let mut chunks = Vec::new();
    for chunk in packed {
        let chars: Vec<char> = chunk.chars().collect();
        if chars.len() <= config.max_chars {
            chunks.push(chunk);
            continue;
        }

        let mut start = 0;
        while start < chars.len() {
            let end = (start + config.max_chars).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }
    }

    chunks
}

pub fn chunk_id(source: &str, chunk_index: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(b":");
    hasher.update(chunk_index.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn build_chunks(
    source: &str,
    text: &str,
    options: &IngestionOptions,
) -> Result<Vec<IndexedChunk>, IngestError> {
    let config = ChunkingConfig::from(options);
    config.validate()?;

    let raw_chunks = chunk_by_paragraph(text, config);
    let mut kept = raw_chunks
        .iter()
        .filter(|chunk| chunk.chars().count() >= config.min_chars)
        .cloned()
        .collect::<Vec<_>>();

    if kept.is_empty() {
        kept = raw_chunks;
    }

    Ok(kept
        .into_iter()
        .enumerate()
        .map(|(index, content)| {
            let chunk_index = index as u64;
            IndexedChunk {
                chunk_id: chunk_id(source, chunk_index),
                source: source.to_string(),
                chunk_index,
                content,
            }
        })
        .collect())
}
