//! In-memory similarity index over a seeded term list

use super::{cosine_similarity, IndexMatch, SimilarityIndex};
use crate::embeddings::Embedder;
use crate::errors::Result;
use async_trait::async_trait;
use std::sync::Arc;

struct Entry {
    text: String,
    embedding: Vec<f32>,
}

/// Brute-force cosine search over embedded reference terms
pub struct InMemoryIndex {
    embedder: Arc<dyn Embedder>,
    entries: Vec<Entry>,
}

impl InMemoryIndex {
    /// Embed every term up front
    pub async fn build(embedder: Arc<dyn Embedder>, terms: Vec<String>) -> Result<Self> {
        let embeddings = embedder.embed_batch(&terms).await?;
        let entries = terms
            .into_iter()
            .zip(embeddings)
            .map(|(text, embedding)| Entry { text, embedding })
            .collect();

        Ok(Self { embedder, entries })
    }
}

#[async_trait]
impl SimilarityIndex for InMemoryIndex {
    async fn query(&self, text: &str) -> Result<Option<IndexMatch>> {
        if self.entries.is_empty() {
            return Ok(None);
        }

        let query = self.embedder.embed(text).await?;

        let best = self
            .entries
            .iter()
            .map(|entry| (entry, cosine_similarity(&query, &entry.embedding)))
            .max_by(|a, b| a.1.total_cmp(&b.1));

        Ok(best.map(|(entry, score)| IndexMatch {
            text: entry.text.clone(),
            score,
        }))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
