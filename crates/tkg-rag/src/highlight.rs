//! Highlight-aware transcript search
//!
//! Users can mark transcript spans with a priority. Searching walks the
//! high-priority spans first, then unmarked text, then low-priority spans;
//! spans marked `-1` are never searched.
//!
//! Author: hephaex@gmail.com

use serde::{Deserialize, Serialize};

/// Priority that removes a span from search
pub const EXCLUDED: i32 = -1;

/// A highlighted span, in character offsets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub start: usize,
    pub end: usize,
    pub priority: i32,
}

/// Search tier of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriorityTier {
    High,
    Normal,
    Low,
}

impl PriorityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Normal => "NORMAL",
            Self::Low => "LOW",
        }
    }

    fn of(priority: Option<i32>) -> Option<Self> {
        match priority {
            None => Some(Self::Normal),
            Some(EXCLUDED) => None,
            Some(p) if p > 0 => Some(Self::High),
            Some(_) => Some(Self::Low),
        }
    }
}

/// A contiguous piece of the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    /// `None` for unhighlighted text
    pub priority: Option<i32>,
}

/// A search hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrioritisedMatch {
    pub tier: PriorityTier,
    pub text: String,
}

impl std::fmt::Display for PrioritisedMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] \u{2192} {}", self.tier.as_str(), self.text)
    }
}

/// Splits a transcript by highlight priority and searches it in tier order
#[derive(Debug, Clone)]
pub struct HighlightPrioritiser {
    segments: Vec<Segment>,
}

impl HighlightPrioritiser {
    pub fn new(transcript: &str, highlights: &[Highlight]) -> Self {
        Self {
            segments: build_segments(transcript, highlights),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// First segment containing `query` (case-insensitive), by tier
    pub fn best_match(&self, query: &str) -> Option<PrioritisedMatch> {
        let needle = query.to_lowercase();

        for tier in [PriorityTier::High, PriorityTier::Normal, PriorityTier::Low] {
            let hit = self
                .segments
                .iter()
                .filter(|s| PriorityTier::of(s.priority) == Some(tier))
                .find(|s| s.text.to_lowercase().contains(&needle));

            if let Some(segment) = hit {
                return Some(PrioritisedMatch {
                    tier,
                    text: segment.text.trim().to_string(),
                });
            }
        }

        None
    }
}

/// Overlapping highlights are clipped to start where the previous one ended;
/// offsets past the end of the transcript are clamped.
fn build_segments(transcript: &str, highlights: &[Highlight]) -> Vec<Segment> {
    let chars: Vec<char> = transcript.chars().collect();
    let slice = |from: usize, to: usize| chars[from..to].iter().collect::<String>();

    let mut sorted: Vec<&Highlight> = highlights.iter().collect();
    sorted.sort_by_key(|h| h.start);

    let mut segments = Vec::new();
    let mut last_end = 0;

    for h in sorted {
        let start = h.start.clamp(last_end, chars.len());
        let end = h.end.clamp(start, chars.len());

        if start > last_end {
            segments.push(Segment {
                text: slice(last_end, start),
                priority: None,
            });
        }
        if end > start {
            segments.push(Segment {
                text: slice(start, end),
                priority: Some(h.priority),
            });
        }
        last_end = last_end.max(end);
    }

    if last_end < chars.len() {
        segments.push(Segment {
            text: slice(last_end, chars.len()),
            priority: None,
        });
    }

    segments
}
