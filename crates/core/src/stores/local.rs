use crate::traits::VectorIndex;
use crate::{IndexedChunk, SearchCandidate, SearchError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info};

const INDEX_FILE: &str = "index.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct IndexFile {
    dimensions: Option<usize>,
    entries: Vec<StoredEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    chunk: IndexedChunk,
    vector: Vec<f32>,
}

pub struct LocalIndex {
    path: PathBuf,
    state: RwLock<IndexFile>,
}

impl LocalIndex {
    pub fn open(directory: impl AsRef<Path>) -> Result<Self, SearchError> {
        let directory = directory.as_ref();
        fs::create_dir_all(directory)?;
        let path = directory.join(INDEX_FILE);

        let state = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str::<IndexFile>(&raw)?
        } else {
            IndexFile::default()
        };

        info!(
            path = %path.display(),
            entries = state.entries.len(),
            "local vector index opened"
        );

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn len(&self) -> usize {
        self.state.read().map(|state| state.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dimensions(&self) -> Option<usize> {
        self.state.read().ok().and_then(|state| state.dimensions)
    }

    fn persist(&self, state: &IndexFile) -> Result<(), SearchError> {
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, serde_json::to_vec(state)?)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

fn lock_poisoned() -> SearchError {
    SearchError::Request("local index lock poisoned".to_string())
}

fn squared_distance(left: &[f32], right: &[f32]) -> f64 {
    left.iter()
        .zip(right)
        .map(|(a, b)| {
            let delta = f64::from(*a) - f64::from(*b);
            delta * delta
        })
        .sum()
}

#[async_trait]
impl VectorIndex for LocalIndex {
    async fn add_chunks(
        &self,
        chunks: &[IndexedChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<(), SearchError> {
        if chunks.len() != embeddings.len() {
            return Err(SearchError::Request(format!(
                "embedding count {} doesn't match chunk count {}",
                embeddings.len(),
                chunks.len()
            )));
        }

        if chunks.is_empty() {
            return Ok(());
        }

        let mut state = self.state.write().map_err(|_| lock_poisoned())?;
        let expected = state.dimensions.unwrap_or(embeddings[0].len());
        if let Some(vector) = embeddings.iter().find(|vector| vector.len() != expected) {
            return Err(SearchError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }

        let mut next = state.clone();
        next.dimensions = Some(expected);
        for (chunk, vector) in chunks.iter().zip(embeddings) {
            let entry = StoredEntry {
                chunk: chunk.clone(),
                vector: vector.clone(),
            };
            match next
                .entries
                .iter_mut()
                .find(|stored| stored.chunk.chunk_id == chunk.chunk_id)
            {
                Some(stored) => *stored = entry,
                None => next.entries.push(entry),
            }
        }

        self.persist(&next)?;
        *state = next;

        debug!(added = chunks.len(), total = state.entries.len(), "local index updated");
        Ok(())
    }

    async fn similarity_search(
        &self,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<SearchCandidate>, SearchError> {
        let state = self.state.read().map_err(|_| lock_poisoned())?;

        if let Some(expected) = state.dimensions {
            if query_vector.len() != expected {
                return Err(SearchError::DimensionMismatch {
                    expected,
                    actual: query_vector.len(),
                });
            }
        }

        let mut scored = state
            .entries
            .iter()
            .map(|entry| (squared_distance(query_vector, &entry.vector), entry))
            .collect::<Vec<_>>();

        // Stable sort: equal distances keep insertion order.
        scored.sort_by(|left, right| left.0.total_cmp(&right.0));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(distance, entry)| SearchCandidate {
                content: entry.chunk.content.clone(),
                source: entry.chunk.source.clone(),
                distance,
            })
            .collect())
    }
}
