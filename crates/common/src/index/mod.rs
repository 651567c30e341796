//! Similarity index clients
//!
//! The classifier talks to the index only through [`SimilarityIndex`]:
//! one query returns the closest reference entry and its score.
//! - REST vector database with server-side embedding
//! - In-memory index over a seeded term list

mod memory;
mod rest;

pub use memory::InMemoryIndex;
pub use rest::RestVectorIndex;

use crate::config::AppConfig;
use crate::embeddings::create_embedder;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Closest reference entry for a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMatch {
    /// Reference text stored in the index
    pub text: String,

    /// Similarity score, higher is more similar
    pub score: f64,
}

/// Nearest-neighbor lookup against known profane terms
#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    /// Return the closest entry, or `None` when the index holds nothing for this query
    async fn query(&self, text: &str) -> Result<Option<IndexMatch>>;

    /// Short name used in logs and metrics
    fn name(&self) -> &str;
}

/// Create a similarity index based on configuration
pub async fn create_index(config: &AppConfig) -> Result<Arc<dyn SimilarityIndex>> {
    match config.index.provider.as_str() {
        "rest" => {
            let url = config.index.url.clone().ok_or_else(|| AppError::Configuration {
                message: "index.url is required for the rest provider".to_string(),
            })?;
            let token = config.index.token.clone().ok_or_else(|| AppError::Configuration {
                message: "index.token is required for the rest provider".to_string(),
            })?;
            Ok(Arc::new(RestVectorIndex::new(url, token, &config.index)?))
        }
        "memory" => {
            let embedder = create_embedder(&config.embedding)?;
            let terms = load_seed_terms(config).await?;
            tracing::info!(
                terms = terms.len(),
                model = embedder.model_name(),
                "Building in-memory similarity index"
            );
            Ok(Arc::new(InMemoryIndex::build(embedder, terms).await?))
        }
        other => Err(AppError::Configuration {
            message: format!("Unknown index provider: {}", other),
        }),
    }
}

/// Collect reference terms from `index.seed_terms` and `index.seed_file`
async fn load_seed_terms(config: &AppConfig) -> Result<Vec<String>> {
    let mut terms = config.index.seed_terms.clone();

    if let Some(path) = &config.index.seed_file {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| AppError::Configuration {
            message: format!("Failed to read seed file {}: {}", path, e),
        })?;
        terms.extend(parse_seed_lines(&raw));
    }

    Ok(terms)
}

/// One term per line; blank lines and `#` comments are skipped
fn parse_seed_lines(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}

/// Cosine similarity between two vectors of equal length
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-9);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_parse_seed_lines() {
        let raw = "# reference terms\nscoundrel\n\n  knave  \n";
        let terms: Vec<String> = parse_seed_lines(raw).collect();
        assert_eq!(terms, vec!["scoundrel", "knave"]);
    }

    #[tokio::test]
    async fn test_rest_provider_requires_url() {
        let config = AppConfig::default();
        assert!(matches!(
            create_index(&config).await,
            Err(AppError::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn test_memory_provider_from_config() {
        let mut config = AppConfig::default();
        config.index.provider = "memory".to_string();
        config.index.seed_terms = vec!["scoundrel".to_string()];

        let index = create_index(&config).await.unwrap();
        let hit = index.query("scoundrel").await.unwrap().unwrap();
        assert_eq!(hit.text, "scoundrel");
        assert!(hit.score > 0.99);
    }
}
