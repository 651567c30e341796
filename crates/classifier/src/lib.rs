//! Profanity Sieve Classification Core
//!
//! Classifies short messages by similarity search instead of exact matching:
//! - Whitelist normalization
//! - Word and overlapping semantic-window chunking
//! - Concurrent index queries with per-granularity thresholds
//! - Deterministic selection of the most offending match

pub mod chunker;
pub mod normalizer;
pub mod pipeline;
pub mod resolver;
pub mod scorer;

pub use chunker::{Chunk, ChunkKind, TextSplitterWindows, WindowSplitter};
pub use normalizer::{normalize, Whitelist};
pub use pipeline::Classifier;
pub use resolver::ClassificationResult;
pub use scorer::{Match, ScoreSheet, Thresholds};
