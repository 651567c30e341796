//! End-to-end classification pipeline

use crate::chunker::{to_semantic_chunks, to_word_chunks, ChunkKind, TextSplitterWindows, WindowSplitter};
use crate::normalizer::{normalize, Whitelist};
use crate::resolver::{resolve, ClassificationResult};
use crate::scorer::{aggregate, score_chunks, Thresholds};
use profanity_common::config::ClassifierConfig;
use profanity_common::errors::Result;
use profanity_common::index::SimilarityIndex;
use profanity_common::metrics;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Classifies messages against a similarity index
pub struct Classifier {
    index: Arc<dyn SimilarityIndex>,
    splitter: Arc<dyn WindowSplitter>,
    thresholds: Thresholds,
    whitelist: Whitelist,
}

impl Classifier {
    pub fn new(
        index: Arc<dyn SimilarityIndex>,
        splitter: Arc<dyn WindowSplitter>,
        thresholds: Thresholds,
        whitelist: Whitelist,
    ) -> Self {
        Self {
            index,
            splitter,
            thresholds,
            whitelist,
        }
    }

    /// Build from the `classifier` configuration section
    pub fn from_config(index: Arc<dyn SimilarityIndex>, config: &ClassifierConfig) -> Result<Self> {
        let splitter = TextSplitterWindows::new(config.window_size, config.window_overlap)?;
        Ok(Self::new(
            index,
            Arc::new(splitter),
            Thresholds {
                word: config.word_threshold,
                semantic: config.semantic_threshold,
            },
            Whitelist::new(&config.whitelist),
        ))
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Classify a message
    ///
    /// Text whose every token is whitelisted is clean with a score of zero
    /// and never reaches the index.
    #[instrument(skip(self, text), fields(index = self.index.name(), len = text.len()))]
    pub async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let start = Instant::now();

        let normalized = normalize(text, &self.whitelist);
        if normalized.is_empty() {
            debug!("Nothing left after whitelist normalization");
            return Ok(ClassificationResult::clean());
        }

        let words = to_word_chunks(&normalized);
        let windows = to_semantic_chunks(&normalized, self.splitter.as_ref())?;
        metrics::record_chunks(ChunkKind::Word.as_str(), words.len());
        metrics::record_chunks(ChunkKind::Semantic.as_str(), windows.len());

        debug!(
            word_chunks = words.len(),
            semantic_chunks = windows.len(),
            "Querying similarity index"
        );

        let chunks = words.into_iter().chain(windows).collect();
        let matches = score_chunks(self.index.as_ref(), chunks).await?;
        let sheet = aggregate(matches, &self.thresholds);
        let result = resolve(&sheet)?;

        let elapsed = start.elapsed().as_secs_f64();
        metrics::record_classification(elapsed, result.is_profane);

        info!(
            is_profane = result.is_profane,
            score = result.score,
            flagged = sheet.flagged.len(),
            latency_ms = (elapsed * 1000.0) as u64,
            "Classification completed"
        );

        Ok(result)
    }
}
