//! LLM-based triple extraction
//!
//! Prompts a chat model for `(SUBJECT, PREDICATE, OBJECT)` triples and parses
//! the free-text reply. Long transcripts are split into overlapping sentence
//! windows first.
//!
//! Author: hephaex@gmail.com

use std::sync::OnceLock;

use regex::Regex;
use tkg_core::{LlmClient, Result, Triple};
use tracing::{debug, warn};

/// Reply meaning "no triples in this text"
pub const NO_TRIPLES: &str = "NONE";

/// Configuration for LLM triple extraction
#[derive(Debug, Clone)]
pub struct LlmTripleConfig {
    /// Instructions and worked examples sent before the text
    pub system_prompt: String,
    /// Sentences per chunk
    pub chunk_sentences: usize,
    /// Sentences shared between neighbouring chunks
    pub chunk_overlap: usize,
}

impl Default for LlmTripleConfig {
    fn default() -> Self {
        Self {
            system_prompt: include_str!("prompts/triple_extraction.txt").to_string(),
            chunk_sentences: 4,
            chunk_overlap: 1,
        }
    }
}

/// LLM-based triple extractor
#[derive(Debug, Clone, Default)]
pub struct LlmTripleExtractor {
    pub config: LlmTripleConfig,
}

impl LlmTripleExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LlmTripleConfig) -> Self {
        Self { config }
    }

    /// Build the extraction prompt for one chunk
    pub fn build_prompt(&self, text: &str) -> String {
        format!(
            "{}\nYOUR TURN\n{}\nOutput:",
            self.config.system_prompt.trim_end(),
            text.trim()
        )
    }

    /// Parse a model reply into triples
    pub fn parse_response(&self, reply: &str) -> Vec<Triple> {
        parse_llm_triples(reply)
    }

    /// Split text into the chunks sent to the model
    pub fn chunks(&self, text: &str) -> Vec<String> {
        chunk_by_sentence(text, self.config.chunk_sentences, self.config.chunk_overlap)
    }

    /// Extract triples from text, one model call per chunk.
    ///
    /// Duplicate triples across overlapping chunks are dropped; order of first
    /// appearance is kept.
    pub async fn extract(&self, llm: &dyn LlmClient, text: &str) -> Result<Vec<Triple>> {
        let mut triples: Vec<Triple> = Vec::new();

        for chunk in self.chunks(text) {
            let reply = llm.generate(&self.build_prompt(&chunk)).await?;
            let parsed = self.parse_response(&reply);
            if parsed.is_empty() {
                debug!(chunk_len = chunk.len(), "No triples in chunk");
            }
            for triple in parsed {
                if !triples.contains(&triple) {
                    triples.push(triple);
                }
            }
        }

        Ok(triples)
    }
}

fn think_block_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?s)<think>.*?</think>").ok())
        .as_ref()
}

fn triple_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\(([^)]*)\)").ok())
        .as_ref()
}

/// Strip reasoning-model `<think>...</think>` blocks and trim
pub fn remove_think_blocks(text: &str) -> String {
    match think_block_pattern() {
        Some(pattern) => pattern.replace_all(text, "").trim().to_string(),
        None => text.trim().to_string(),
    }
}

/// Parse `(S, P, O)|(S, P, O)` text.
///
/// The object keeps any further commas. Groups with fewer than three
/// non-empty parts are skipped.
pub fn parse_llm_triples(reply: &str) -> Vec<Triple> {
    let cleaned = remove_think_blocks(reply);
    if cleaned == NO_TRIPLES {
        return Vec::new();
    }

    let Some(pattern) = triple_pattern() else {
        return Vec::new();
    };

    pattern
        .captures_iter(&cleaned)
        .filter_map(|caps| {
            let group = caps.get(1)?.as_str();
            let parts: Vec<&str> = group.splitn(3, ',').map(str::trim).collect();
            match parts.as_slice() {
                [s, p, o] if !s.is_empty() && !p.is_empty() && !o.is_empty() => {
                    Some(Triple::new(*s, *p, *o))
                }
                _ => {
                    warn!(group = %group, "Skipping malformed triple");
                    None
                }
            }
        })
        .collect()
}

/// Split text into windows of `size` sentences, neighbouring windows sharing
/// `overlap` sentences
pub fn chunk_by_sentence(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return Vec::new();
    }

    let size = size.max(1);
    let step = size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < sentences.len() {
        let end = (start + size).min(sentences.len());
        chunks.push(sentences[start..end].join(" "));
        if end == sentences.len() {
            break;
        }
        start += step;
    }

    chunks
}

/// Sentences ending in `.`, `!` or `?`; a trailing fragment counts as one
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

// ============================================================================
// Tests
// ============================================================================
