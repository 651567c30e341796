//! Decision resolution
//!
//! Picks the single most offending match, or the closest overall score
//! when nothing was flagged.

use crate::chunker::ChunkKind;
use crate::scorer::{Match, ScoreSheet};
use profanity_common::errors::{AppError, Result};
use serde::Serialize;
use std::cmp::Ordering;

/// Final classification for one message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    #[serde(rename = "isProfanity")]
    pub is_profane: bool,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flagged_for: Option<String>,
}

impl ClassificationResult {
    /// Result for text with nothing left to compare
    pub fn clean() -> Self {
        Self {
            is_profane: false,
            score: 0.0,
            flagged_for: None,
        }
    }
}

/// Ordering used to pick the top match: higher score first, then word-level
/// before semantic, then earlier chunk position.
fn rank(a: &Match, b: &Match) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| kind_order(a.chunk.kind).cmp(&kind_order(b.chunk.kind)))
        .then_with(|| a.chunk.position.cmp(&b.chunk.position))
}

fn kind_order(kind: ChunkKind) -> u8 {
    match kind {
        ChunkKind::Word => 0,
        ChunkKind::Semantic => 1,
    }
}

fn top(matches: &[Match]) -> Option<&Match> {
    matches.iter().min_by(|a, b| rank(a, b))
}

/// Derive the classification from a score sheet
pub fn resolve(sheet: &ScoreSheet) -> Result<ClassificationResult> {
    if let Some(worst) = top(&sheet.flagged) {
        return Ok(ClassificationResult {
            is_profane: true,
            score: worst.score,
            flagged_for: Some(worst.text.clone()),
        });
    }

    let closest = top(&sheet.all).ok_or(AppError::NoScores)?;
    Ok(ClassificationResult {
        is_profane: false,
        score: closest.score,
        flagged_for: None,
    })
}
