//! Interview transcripts to triples
//!
//! A transcript is segmented into question/response pairs; each pair yields
//! a fixed set of structural triples plus one `mentions` triple per subject
//! phrase found in the response.
//!
//! Author: hephaex@gmail.com

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tkg_core::{Result, Speakers, Triple};
use tracing::{debug, info};

use crate::roles::RoleTable;
use crate::subjects::SubjectExtractor;
use crate::tagger::{LexiconTagger, Tagger};
use crate::TripleExtractor;

/// Relation names used for interview structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterviewRelation {
    /// interviewee -> question
    Answered,
    /// question -> response
    HasResponse,
    /// response -> interviewee
    AnsweredBy,
    /// response -> subject phrase
    Mentions,
}

impl InterviewRelation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Answered => "answered",
            Self::HasResponse => "hasResponse",
            Self::AnsweredBy => "answeredBy",
            Self::Mentions => "mentions",
        }
    }

    pub fn all() -> &'static [InterviewRelation] {
        &[
            Self::Answered,
            Self::HasResponse,
            Self::AnsweredBy,
            Self::Mentions,
        ]
    }
}

impl std::fmt::Display for InterviewRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Segmentation
// ============================================================================

/// One question and the response that followed it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub question: String,
    pub response: String,
}

/// Ordered question -> response map.
///
/// A repeated question overwrites the earlier response but keeps the
/// position of its first occurrence.
#[derive(Debug, Clone, Default)]
pub struct QaPairs {
    pairs: Vec<QuestionResponse>,
    index: HashMap<String, usize>,
}

impl QaPairs {
    pub fn insert(&mut self, question: String, response: String) {
        match self.index.get(&question) {
            Some(&i) => self.pairs[i].response = response,
            None => {
                self.index.insert(question.clone(), self.pairs.len());
                self.pairs.push(QuestionResponse { question, response });
            }
        }
    }

    pub fn get(&self, question: &str) -> Option<&str> {
        self.index
            .get(question)
            .map(|&i| self.pairs[i].response.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuestionResponse> {
        self.pairs.iter()
    }

    pub fn into_vec(self) -> Vec<QuestionResponse> {
        self.pairs
    }
}

/// Split a transcript into question/response pairs.
///
/// `?` closes a question; `.`, `!` and `;` close a response sentence.
/// Text before the first question and unterminated trailing text are
/// dropped.
pub fn segment_questions(text: &str) -> QaPairs {
    let mut pairs = QaPairs::default();
    let mut current = String::new();
    let mut response = String::new();
    let mut question: Option<String> = None;

    for ch in text.chars() {
        current.push(ch);
        match ch {
            '?' => {
                let response = std::mem::take(&mut response);
                if let Some(previous) = question.take() {
                    pairs.insert(previous, response);
                }
                question = Some(current.trim().to_string());
                current.clear();
            }
            '.' | '!' | ';' => {
                push_sentence(&mut response, current.trim());
                current.clear();
            }
            _ => {}
        }
    }

    // End of input never overwrites a stored pair
    if let Some(question) = question {
        if pairs.get(&question).is_none() {
            pairs.insert(question, response);
        }
    }
    pairs
}

/// Append a sentence followed by a space. A bare run of terminators
/// (an ellipsis) attaches to the sentence before it.
fn push_sentence(response: &mut String, sentence: &str) {
    if sentence.is_empty() {
        return;
    }
    let bare_terminator = sentence.chars().all(|c| matches!(c, '.' | '!' | ';'));
    if bare_terminator && response.ends_with(' ') {
        response.pop();
    }
    response.push_str(sentence);
    response.push(' ');
}

// ============================================================================
// Basic Triple Extractor
// ============================================================================

/// Rule-based interview triple extractor
#[derive(Clone)]
pub struct BasicTripleExtractor {
    tagger: Arc<dyn Tagger>,
    table: Arc<RoleTable>,
}

impl BasicTripleExtractor {
    pub fn new(tagger: Arc<dyn Tagger>, table: Arc<RoleTable>) -> Self {
        Self { tagger, table }
    }

    /// Question/response pairs of a transcript
    pub fn get_questions(&self, text: &str) -> QaPairs {
        segment_questions(text)
    }

    /// Extract every triple from a transcript.
    ///
    /// Fails on the first response containing a tag the role table does not
    /// know; no partial result is returned.
    pub fn get_triples(
        &self,
        text: &str,
        interviewer_id: &str,
        interviewee_id: &str,
    ) -> Result<Vec<Triple>> {
        let speakers = Speakers::new(interviewer_id, interviewee_id);
        let pairs = segment_questions(text);
        let mut subjects = SubjectExtractor::new(
            Arc::clone(&self.tagger),
            Arc::clone(&self.table),
            speakers.clone(),
        );

        let mut triples = Vec::new();
        for pair in pairs.iter() {
            triples.push(Triple::new(
                &speakers.interviewee,
                InterviewRelation::Answered.as_str(),
                &pair.question,
            ));
            triples.push(Triple::new(
                &pair.question,
                InterviewRelation::HasResponse.as_str(),
                &pair.response,
            ));
            triples.push(Triple::new(
                &pair.response,
                InterviewRelation::AnsweredBy.as_str(),
                &speakers.interviewee,
            ));

            let mentioned = subjects.get_subjects(Some(&pair.response))?;
            debug!(question = %pair.question, subjects = mentioned.len(), "Extracted subjects");
            for subject in mentioned {
                triples.push(Triple::new(
                    &pair.response,
                    InterviewRelation::Mentions.as_str(),
                    subject,
                ));
            }
        }

        info!(pairs = pairs.len(), triples = triples.len(), "Extracted interview triples");
        Ok(triples)
    }
}

impl Default for BasicTripleExtractor {
    fn default() -> Self {
        Self::new(
            Arc::new(LexiconTagger::new()),
            Arc::new(RoleTable::penn_treebank()),
        )
    }
}

impl TripleExtractor for BasicTripleExtractor {
    fn extract(&self, text: &str, speakers: &Speakers) -> Result<Vec<Triple>> {
        self.get_triples(text, &speakers.interviewer, &speakers.interviewee)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn qa(pairs: &QaPairs) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|p| (p.question.clone(), p.response.clone()))
            .collect()
    }

    fn owned(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected
            .iter()
            .map(|(q, r)| (q.to_string(), r.to_string()))
            .collect()
    }

    #[test]
    fn test_segment_two_pairs() {
        let pairs = segment_questions("How are you? I am fine. What is your name? Alice.");
        assert_eq!(
            qa(&pairs),
            owned(&[
                ("How are you?", "I am fine. "),
                ("What is your name?", "Alice. "),
            ])
        );
    }

    #[test]
    fn test_segment_empty_text() {
        assert!(segment_questions("").is_empty());
    }

    #[test]
    fn test_segment_question_without_response() {
        let pairs = segment_questions("Any questions?");
        assert_eq!(qa(&pairs), owned(&[("Any questions?", "")]));
    }

    #[test]
    fn test_segment_drops_preamble_and_trailing_text() {
        let pairs = segment_questions("Hello there. Ready? Yes! Let's go; now. and then");
        assert_eq!(qa(&pairs), owned(&[("Ready?", "Yes! Let's go; now. ")]));
    }

    #[test]
    fn test_segment_repeated_question_last_write_wins() {
        let pairs = segment_questions("Why? A. How? B. Why? C. When? D.");
        assert_eq!(
            qa(&pairs),
            owned(&[("Why?", "C. "), ("How?", "B. "), ("When?", "D. ")])
        );
    }

    #[test]
    fn test_segment_final_repeated_question_keeps_first_answer() {
        let pairs = segment_questions("Why? A. How? B. Why? C.");
        assert_eq!(qa(&pairs), owned(&[("Why?", "A. "), ("How?", "B. ")]));
        assert_eq!(pairs.get("Why?"), Some("A. "));
    }

    #[test]
    fn test_segment_ellipsis_stays_attached() {
        let pairs = segment_questions("Sure? Well... I think so.");
        assert_eq!(qa(&pairs), owned(&[("Sure?", "Well... I think so. ")]));
    }

    #[test]
    fn test_relation_names() {
        let names: Vec<&str> = InterviewRelation::all().iter().map(|r| r.as_str()).collect();
        assert_eq!(names, vec!["answered", "hasResponse", "answeredBy", "mentions"]);
    }

    #[test]
    fn test_get_triples() {
        let extractor = BasicTripleExtractor::default();
        let triples = extractor
            .get_triples(
                "How are you? I am fine. What is your name? Alice.",
                "Josh",
                "John",
            )
            .unwrap();

        assert_eq!(
            triples,
            vec![
                Triple::new("John", "answered", "How are you?"),
                Triple::new("How are you?", "hasResponse", "I am fine. "),
                Triple::new("I am fine. ", "answeredBy", "John"),
                Triple::new("I am fine. ", "mentions", "Josh"),
                Triple::new("John", "answered", "What is your name?"),
                Triple::new("What is your name?", "hasResponse", "Alice. "),
                Triple::new("Alice. ", "answeredBy", "John"),
                Triple::new("Alice. ", "mentions", "Alice"),
            ]
        );
    }

    #[test]
    fn test_get_triples_without_questions() {
        let extractor = BasicTripleExtractor::default();
        let triples = extractor.get_triples("No questions here.", "A", "B").unwrap();
        assert!(triples.is_empty());
    }

    #[test]
    fn test_trait_uses_speakers() {
        let extractor = BasicTripleExtractor::default();
        let triples = extractor
            .extract("Ready? Yes.", &Speakers::default())
            .unwrap();
        assert_eq!(triples[0], Triple::new("Speaker", "answered", "Ready?"));
        assert_eq!(triples.len(), 3);
    }
}
