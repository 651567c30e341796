//! Scoring and aggregation
//!
//! Every chunk is queried concurrently; the resulting matches are then
//! reduced against per-decomposition thresholds in a pure step.

use crate::chunker::{Chunk, ChunkKind};
use futures::future::try_join_all;
use profanity_common::errors::{AppError, Result};
use profanity_common::index::SimilarityIndex;
use profanity_common::metrics;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;

/// Result of querying one chunk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    /// The chunk that was queried
    pub chunk: Chunk,
    /// Closest reference text in the index
    pub text: String,
    /// Similarity score reported by the index
    pub score: f64,
}

/// Per-decomposition thresholds; a chunk flags when its score is strictly greater
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub word: f64,
    pub semantic: f64,
}

impl Thresholds {
    pub fn for_kind(&self, kind: ChunkKind) -> f64 {
        match kind {
            ChunkKind::Word => self.word,
            ChunkKind::Semantic => self.semantic,
        }
    }

    pub fn exceeded_by(&self, m: &Match) -> bool {
        m.score > self.for_kind(m.chunk.kind)
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            word: profanity_common::DEFAULT_WORD_THRESHOLD,
            semantic: profanity_common::DEFAULT_SEMANTIC_THRESHOLD,
        }
    }
}

/// Flagged candidates plus every observed match
#[derive(Debug, Clone, Default)]
pub struct ScoreSheet {
    /// Matches over threshold, deduplicated on `(score, text)`
    pub flagged: Vec<Match>,
    /// All matches in query order
    pub all: Vec<Match>,
}

/// Query every chunk concurrently; the first failure aborts the rest
pub async fn score_chunks(index: &dyn SimilarityIndex, chunks: Vec<Chunk>) -> Result<Vec<Match>> {
    try_join_all(chunks.into_iter().map(|chunk| query_chunk(index, chunk))).await
}

async fn query_chunk(index: &dyn SimilarityIndex, chunk: Chunk) -> Result<Match> {
    let start = Instant::now();
    let result = index.query(&chunk.text).await;
    let elapsed = start.elapsed().as_secs_f64();

    metrics::record_index_query(elapsed, index.name(), result.is_ok());

    match result? {
        Some(hit) => Ok(Match {
            chunk,
            text: hit.text,
            score: hit.score,
        }),
        None => {
            tracing::error!(chunk = %chunk.text, kind = chunk.kind.as_str(), "Index returned no entry");
            Err(AppError::EmptyIndex)
        }
    }
}

/// Reduce matches into a score sheet
pub fn aggregate(matches: Vec<Match>, thresholds: &Thresholds) -> ScoreSheet {
    let mut seen = HashSet::new();
    let flagged = matches
        .iter()
        .filter(|m| thresholds.exceeded_by(m))
        .filter(|m| seen.insert((m.score.to_bits(), m.text.clone())))
        .cloned()
        .collect();

    ScoreSheet { flagged, all: matches }
}
