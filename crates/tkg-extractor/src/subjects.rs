//! Subject extraction
//!
//! [`SubjectExtractor`] owns one tagged sentence and lazily runs the
//! classify -> group -> merge -> connect pipeline over it. The analysis is
//! cached until the sentence is replaced.
//!
//! Author: hephaex@gmail.com

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tkg_core::{Result, Speakers};
use tracing::debug;

use crate::classifier::{render_classified, ClassifiedToken, WordClassifier};
use crate::grouping::{connect_sentence, group_sentence, merge_qualities, render_phrases, Phrase};
use crate::roles::{Role, RoleTable};
use crate::tagger::{TaggedToken, Tagger};

/// Every intermediate stage for one sentence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceAnalysis {
    pub classified: Vec<ClassifiedToken>,
    pub grouped: Vec<Phrase>,
    pub merged: Vec<Phrase>,
    pub connected: Vec<Phrase>,
}

impl SentenceAnalysis {
    /// Texts of the Subject phrases in the final pass, in order
    pub fn subjects(&self) -> Vec<String> {
        self.connected
            .iter()
            .filter(|p| p.role == Role::Subject)
            .map(|p| p.text.clone())
            .collect()
    }
}

impl std::fmt::Display for SentenceAnalysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", render_classified(&self.classified))?;
        writeln!(f, "Grouped: {}", render_phrases(&self.grouped))?;
        writeln!(f, "Merged: {}", render_phrases(&self.merged))?;
        write!(f, "Connected: {}", render_phrases(&self.connected))
    }
}

/// Run every stage over a tagged sentence
pub fn analyze(
    tokens: &[TaggedToken],
    classifier: &WordClassifier,
    speakers: &Speakers,
) -> Result<SentenceAnalysis> {
    let classified = classifier.classify(tokens)?;
    let grouped = group_sentence(&classified, classifier.table(), speakers);
    let merged = merge_qualities(&grouped);
    let connected = connect_sentence(&merged);

    Ok(SentenceAnalysis {
        classified,
        grouped,
        merged,
        connected,
    })
}

/// Extracts subject phrases from one sentence at a time.
///
/// Reuse across sentences via [`reset_sentence`](Self::reset_sentence);
/// instances are not meant to be shared between threads mid-analysis.
pub struct SubjectExtractor {
    classifier: WordClassifier,
    speakers: Speakers,
    tokens: Vec<TaggedToken>,
    analysis: Option<SentenceAnalysis>,
}

impl SubjectExtractor {
    pub fn new(tagger: Arc<dyn Tagger>, table: Arc<RoleTable>, speakers: Speakers) -> Self {
        Self {
            classifier: WordClassifier::new(tagger, table),
            speakers,
            tokens: Vec::new(),
            analysis: None,
        }
    }

    /// Build over an existing classifier, starting from raw text
    pub fn for_sentence(
        classifier: WordClassifier,
        speakers: Speakers,
        sentence: &str,
    ) -> Result<Self> {
        let mut extractor = Self {
            classifier,
            speakers,
            tokens: Vec::new(),
            analysis: None,
        };
        extractor.reset_sentence(sentence)?;
        Ok(extractor)
    }

    /// Replace the current sentence with raw text
    pub fn reset_sentence(&mut self, sentence: &str) -> Result<()> {
        let tokens = self.classifier.tagger().tag(sentence)?;
        self.reset_tagged(tokens);
        Ok(())
    }

    /// Replace the current sentence with pre-tagged tokens
    pub fn reset_tagged(&mut self, tokens: Vec<TaggedToken>) {
        self.tokens = tokens;
        self.analysis = None;
    }

    pub fn tokens(&self) -> &[TaggedToken] {
        &self.tokens
    }

    pub fn speakers(&self) -> &Speakers {
        &self.speakers
    }

    /// Cached analysis of the current sentence
    pub fn analysis(&mut self) -> Result<&SentenceAnalysis> {
        if self.analysis.is_none() {
            let analysis = analyze(&self.tokens, &self.classifier, &self.speakers)?;
            debug!(
                tokens = self.tokens.len(),
                phrases = analysis.connected.len(),
                "Analyzed sentence"
            );
            self.analysis = Some(analysis);
        }
        Ok(self.analysis.get_or_insert_with(SentenceAnalysis::default))
    }

    pub fn classified(&mut self) -> Result<Vec<ClassifiedToken>> {
        Ok(self.analysis()?.classified.clone())
    }

    pub fn grouped(&mut self) -> Result<Vec<Phrase>> {
        Ok(self.analysis()?.grouped.clone())
    }

    pub fn merged(&mut self) -> Result<Vec<Phrase>> {
        Ok(self.analysis()?.merged.clone())
    }

    pub fn connected(&mut self) -> Result<Vec<Phrase>> {
        Ok(self.analysis()?.connected.clone())
    }

    /// Subject phrases of the current sentence, or of `sentence` if given
    pub fn get_subjects(&mut self, sentence: Option<&str>) -> Result<Vec<String>> {
        if let Some(sentence) = sentence {
            self.reset_sentence(sentence)?;
        }
        Ok(self.analysis()?.subjects())
    }
}

// ============================================================================
// Tests
// ============================================================================
