//! Internal document retrieval
//!
//! Serves passages from a chunk file produced by the (external) index build
//! step. The index is read-only once loaded, so one instance can be shared
//! across sequential pipeline runs without locking.

use crate::models::RetrievedPassage;
use crate::providers::Retriever;
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

pub const DEFAULT_TOP_K: usize = 4;

/// Terms shorter than this carry no ranking signal
const MIN_TERM_LEN: usize = 3;

struct IndexedChunk {
    passage: RetrievedPassage,
    term_counts: HashMap<String, usize>,
}

pub struct DocumentIndex {
    chunks: Vec<IndexedChunk>,
    top_k: usize,
}

impl DocumentIndex {
    pub fn from_chunks(chunks: Vec<RetrievedPassage>, top_k: usize) -> Self {
        let chunks = chunks
            .into_iter()
            .filter(|c| !c.content.trim().is_empty())
            .map(|passage| {
                let mut term_counts = HashMap::new();
                for term in tokenize(&passage.content) {
                    *term_counts.entry(term).or_insert(0) += 1;
                }
                IndexedChunk {
                    passage,
                    term_counts,
                }
            })
            .collect();

        Self {
            chunks,
            top_k: top_k.max(1),
        }
    }

    /// Load a JSON array of `{content, source}` chunks.
    ///
    /// A missing file yields an empty index: retrieval then reports no
    /// content instead of failing the service at startup.
    pub async fn load(path: impl AsRef<Path>, top_k: usize) -> Result<Self> {
        let path = path.as_ref();

        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Document index not found, starting empty");
                return Ok(Self::from_chunks(Vec::new(), top_k));
            }
            Err(e) => return Err(e.into()),
        };

        let chunks: Vec<RetrievedPassage> = serde_json::from_str(&raw)?;
        let index = Self::from_chunks(chunks, top_k);

        info!(
            path = %path.display(),
            chunk_count = index.len(),
            top_k = index.top_k,
            "Document index loaded"
        );

        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Rank by number of distinct query terms matched, then by total term
    /// frequency; ties keep index order.
    fn rank(&self, query: &str) -> Vec<RetrievedPassage> {
        let mut terms = tokenize(query);
        terms.sort();
        terms.dedup();

        if terms.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, usize, usize)> = self
            .chunks
            .iter()
            .enumerate()
            .filter_map(|(position, chunk)| {
                let mut matched = 0;
                let mut frequency = 0;
                for term in &terms {
                    if let Some(count) = chunk.term_counts.get(term) {
                        matched += 1;
                        frequency += count;
                    }
                }
                (matched > 0).then_some((matched, frequency, position))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)).then(a.2.cmp(&b.2)));

        scored
            .into_iter()
            .take(self.top_k)
            .map(|(_, _, position)| self.chunks[position].passage.clone())
            .collect()
    }
}

#[async_trait]
impl Retriever for DocumentIndex {
    async fn search(&self, query: &str) -> Result<Vec<RetrievedPassage>> {
        let passages = self.rank(query);
        debug!(result_count = passages.len(), "Document index search");
        Ok(passages)
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_TERM_LEN)
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_index(top_k: usize) -> DocumentIndex {
        DocumentIndex::from_chunks(
            vec![
                RetrievedPassage::new("Leonardo framework contract renewed for avionics", "contracts/leonardo.md"),
                RetrievedPassage::new("Stellantis plant staffing plan", "contracts/stellantis.md"),
                RetrievedPassage::new("Aerospace practice: Leonardo avionics and Leonardo helicopters", "practice/aerospace.md"),
                RetrievedPassage::new("   ", "empty.md"),
            ],
            top_k,
        )
    }

    #[tokio::test]
    async fn test_ranks_by_matched_terms() {
        let index = sample_index(DEFAULT_TOP_K);
        let results = index.search("Leonardo avionics contract").await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source, "contracts/leonardo.md");
        assert_eq!(results[1].source, "practice/aerospace.md");
    }

    #[tokio::test]
    async fn test_top_k_limits_results() {
        let index = sample_index(1);
        let results = index.search("leonardo").await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source, "practice/aerospace.md");
    }

    #[tokio::test]
    async fn test_no_match_is_empty_not_error() {
        let index = sample_index(DEFAULT_TOP_K);
        assert!(index.search("quantum biology").await.unwrap().is_empty());
        assert!(index.search("a b").await.unwrap().is_empty());
        assert_eq!(index.len(), 3);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"content": "Ferrari luxury brand extension", "source": "clients/ferrari.md"}}]"#
        )
        .unwrap();

        let index = DocumentIndex::load(file.path(), DEFAULT_TOP_K).await.unwrap();
        let results = index.search("ferrari brand").await.unwrap();
        assert_eq!(results[0].source, "clients/ferrari.md");
    }

    #[tokio::test]
    async fn test_missing_file_gives_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        let index = DocumentIndex::load(dir.path().join("absent.json"), DEFAULT_TOP_K)
            .await
            .unwrap();
        assert!(index.is_empty());
    }
}
