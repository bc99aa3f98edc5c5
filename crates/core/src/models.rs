use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub source: String,
    pub content: String,
}

impl Document {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub chunk_id: String,
    pub source: String,
    pub chunk_index: u64,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCandidate {
    pub content: String,
    pub source: String,
    pub distance: f64,
}

impl SearchCandidate {
    pub fn new(content: impl Into<String>, source: impl Into<String>, distance: f64) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            distance,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocContext {
    entries: Vec<(String, String)>,
}

impl DocContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: impl Into<String>, content: impl Into<String>) -> bool {
        let source = source.into();
        if self.contains(&source) {
            return false;
        }
        self.entries.push((source, content.into()));
        true
    }

    pub fn contains(&self, source: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == source)
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == source)
            .map(|(_, content)| content.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, content)| (key.as_str(), content.as_str()))
    }

    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedSources {
    pub first: Document,
    pub second: Document,
}

impl SelectedSources {
    pub fn source_ids(&self) -> Vec<String> {
        vec![self.first.source.clone(), self.second.source.clone()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComparisonAnswer {
    pub answer: String,
    pub sources: Vec<String>,
}

impl fmt::Display for ComparisonAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources = self
            .sources
            .iter()
            .map(|source| format!("'{source}'"))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "Response: {}\nSources: [{}]", self.answer, sources)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ComparisonOptions {
    pub top_k: usize,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self { top_k: 50 }
    }
}

#[derive(Debug, Clone)]
pub struct IngestionOptions {
    pub chunk_max_chars: usize,
    pub chunk_overlap_chars: usize,
    pub min_chunk_chars: usize,
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            chunk_max_chars: 800,
            chunk_overlap_chars: 80,
            min_chunk_chars: 40,
        }
    }
}
