//! Text chunking
//!
//! Produces the two decompositions compared against the index:
//! single words, and overlapping multi-word windows.

use profanity_common::errors::{AppError, Result};
use serde::Serialize;
use text_splitter::{ChunkCapacity, ChunkConfig, TextSplitter};
use tracing::debug;

/// Which decomposition a chunk came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    Word,
    Semantic,
}

impl ChunkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkKind::Word => "word",
            ChunkKind::Semantic => "semantic",
        }
    }
}

/// A span of normalized text to compare against the index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    /// The chunk content
    pub text: String,
    /// Originating decomposition
    pub kind: ChunkKind,
    /// Index of this chunk within its decomposition
    pub position: usize,
}

/// Splits text into ordered, overlapping windows covering the whole input
pub trait WindowSplitter: Send + Sync {
    fn split(&self, text: &str) -> Result<Vec<String>>;
}

/// Window splitter backed by `text-splitter`, sized in characters.
///
/// `text-splitter` breaks on Unicode word boundaries, which includes hyphens
/// and punctuation. Every range it yields is widened to the surrounding
/// whitespace so windows are always whole runs of input tokens.
#[derive(Debug, Clone)]
pub struct TextSplitterWindows {
    window_size: usize,
    overlap: usize,
}

impl TextSplitterWindows {
    pub fn new(window_size: usize, overlap: usize) -> Result<Self> {
        if window_size == 0 || overlap >= window_size {
            return Err(AppError::Configuration {
                message: format!(
                    "window overlap ({}) must be smaller than window size ({})",
                    overlap, window_size
                ),
            });
        }
        Ok(Self { window_size, overlap })
    }
}

impl Default for TextSplitterWindows {
    fn default() -> Self {
        Self {
            window_size: 25,
            overlap: 9,
        }
    }
}

impl WindowSplitter for TextSplitterWindows {
    fn split(&self, text: &str) -> Result<Vec<String>> {
        let longest_token = text
            .split_whitespace()
            .map(|t| t.chars().count())
            .max()
            .unwrap_or(0);

        let capacity = ChunkCapacity::new(self.window_size)
            .with_max(self.window_size.max(longest_token))
            .map_err(|e| AppError::Internal {
                message: format!("Invalid window capacity: {}", e),
            })?;

        let config = ChunkConfig::new(capacity)
            .with_overlap(self.overlap)
            .map_err(|e| AppError::Configuration {
                message: format!("Invalid window overlap: {}", e),
            })?;

        let splitter = TextSplitter::new(config);

        let mut windows = Vec::new();
        let mut covered_to = 0;
        for (offset, chunk) in splitter.chunk_indices(text) {
            let (start, end) = snap_to_tokens(text, offset, offset + chunk.len());
            // Widening can swallow a later range into the previous window
            if end <= covered_to || start == end {
                continue;
            }
            covered_to = end;
            windows.push(text[start..end].to_string());
        }
        Ok(windows)
    }
}

/// Widen a byte range so it starts and ends on whitespace (or the text edges)
fn snap_to_tokens(text: &str, start: usize, end: usize) -> (usize, usize) {
    let start = text[..start]
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(i, c)| i + c.len_utf8());
    let end = text[end..]
        .find(char::is_whitespace)
        .map_or(text.len(), |i| end + i);
    (start, end)
}

/// One chunk per whitespace-delimited token
pub fn to_word_chunks(text: &str) -> Vec<Chunk> {
    text.split_whitespace()
        .enumerate()
        .map(|(position, token)| Chunk {
            text: token.to_string(),
            kind: ChunkKind::Word,
            position,
        })
        .collect()
}

/// Overlapping windows; empty unless the text has more than one token
pub fn to_semantic_chunks(text: &str, splitter: &dyn WindowSplitter) -> Result<Vec<Chunk>> {
    if text.split_whitespace().nth(1).is_none() {
        return Ok(Vec::new());
    }

    let windows = splitter.split(text)?;

    debug!(
        input_len = text.len(),
        window_count = windows.len(),
        "Text split into semantic windows"
    );

    Ok(windows
        .into_iter()
        .filter(|w| !w.trim().is_empty())
        .enumerate()
        .map(|(position, window)| Chunk {
            text: window,
            kind: ChunkKind::Semantic,
            position,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn tokens(text: &str) -> Vec<&str> {
        text.split_whitespace().collect()
    }

    /// True when `needle` appears as a contiguous run inside `haystack`
    fn is_contiguous_run(haystack: &[&str], needle: &[&str]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_word_chunks() {
        let chunks = to_word_chunks("you are  a\tknave");
        let texts: Vec<_> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["you", "are", "a", "knave"]);
        assert!(chunks.iter().all(|c| c.kind == ChunkKind::Word));
        assert_eq!(chunks[3].position, 3);
    }

    #[test]
    fn test_single_word_yields_one_word_and_no_semantic_chunks() {
        let splitter = TextSplitterWindows::default();
        assert_eq!(to_word_chunks("knave").len(), 1);
        assert!(to_semantic_chunks("knave", &splitter).unwrap().is_empty());
    }

    #[test]
    fn test_empty_text() {
        let splitter = TextSplitterWindows::default();
        assert!(to_word_chunks("").is_empty());
        assert!(to_semantic_chunks("", &splitter).unwrap().is_empty());
    }

    #[test]
    fn test_short_text_is_one_window() {
        let splitter = TextSplitterWindows::default();
        let chunks = to_semantic_chunks("hello world", &splitter).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "hello world");
        assert_eq!(chunks[0].kind, ChunkKind::Semantic);
    }

    #[test]
    fn test_windows_cover_all_tokens_without_splitting_them() {
        let text = "the quick brown fox jumps over the lazy dog while the cat watches from a sunny windowsill";
        let splitter = TextSplitterWindows::default();
        let chunks = to_semantic_chunks(text, &splitter).unwrap();
        assert!(chunks.len() > 1);

        let all = tokens(text);
        for chunk in &chunks {
            assert!(is_contiguous_run(&all, &tokens(&chunk.text)), "{:?}", chunk.text);
        }
        for token in &all {
            assert!(chunks.iter().any(|c| tokens(&c.text).contains(token)));
        }
    }

    #[test]
    fn test_hyphenated_and_punctuated_tokens_stay_whole() {
        let splitter = TextSplitterWindows::default();
        let texts = [
            "you absolute mother-loving good-for-nothing son-of-a-gun",
            "shut up you stupid-ass jerk-face i really mean it today",
            "what utter nonsense, you dirty scoundrel!!",
            "re-re-re-peat after me: f.o.o b.a.r, ok?",
        ];

        for text in texts {
            let chunks = to_semantic_chunks(text, &splitter).unwrap();
            assert!(!chunks.is_empty(), "{:?}", text);

            let all = tokens(text);
            for chunk in &chunks {
                assert!(
                    is_contiguous_run(&all, &tokens(&chunk.text)),
                    "{:?} produced {:?}",
                    text,
                    chunk.text
                );
            }
            for token in &all {
                assert!(chunks.iter().any(|c| tokens(&c.text).contains(token)));
            }
        }
    }

    #[test]
    fn test_windows_advance_through_text() {
        let text = "you absolute mother-loving good-for-nothing son-of-a-gun";
        let splitter = TextSplitterWindows::default();
        let windows = assert_ok!(splitter.split(text));

        assert!(windows.len() > 1);
        assert!(windows.first().unwrap().starts_with("you "));
        assert!(windows.last().unwrap().ends_with("son-of-a-gun"));
        for pair in windows.windows(2) {
            assert_ne!(pair[0], pair[1]);
            assert!(!pair[0].contains(pair[1].as_str()));
        }
    }

    #[test]
    fn test_snap_to_tokens() {
        let text = "stupid-ass jerk-face";
        // "-ass jerk-" sits inside two tokens
        assert_eq!(snap_to_tokens(text, 6, 16), (0, text.len()));
        assert_eq!(snap_to_tokens(text, 11, 20), (11, 20));
        assert_eq!(snap_to_tokens("héllo wörld", 7, 8), (7, 13));
    }

    #[test]
    fn test_long_token_is_kept_whole() {
        let long = "pneumonoultramicroscopicsilicovolcanoconiosis";
        let text = format!("such {} indeed", long);
        let splitter = TextSplitterWindows::default();
        let chunks = to_semantic_chunks(&text, &splitter).unwrap();
        assert!(chunks.iter().any(|c| tokens(&c.text).contains(&long)));
    }

    #[test]
    fn test_invalid_overlap_rejected() {
        assert_err!(TextSplitterWindows::new(10, 10));
        assert_err!(TextSplitterWindows::new(0, 0));
        assert_ok!(TextSplitterWindows::new(25, 9));
    }
}
