//! Profanity Sieve Common Library
//!
//! Shared code for the Profanity Sieve services including:
//! - Similarity index clients
//! - Embedding client abstraction
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod embeddings;
pub mod errors;
pub mod index;
pub mod metrics;

// Re-export commonly used types
pub use errors::{AppError, Result};
pub use config::AppConfig;
pub use embeddings::Embedder;
pub use index::{IndexMatch, SimilarityIndex};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Word-level chunks need a near-exact match to be flagged
pub const DEFAULT_WORD_THRESHOLD: f64 = 0.95;

/// Default threshold for semantic window chunks
pub const DEFAULT_SEMANTIC_THRESHOLD: f64 = 0.86;
