//! Word classification
//!
//! Assigns a [`Role`] to every tagged token. Sentence-initial capitalised
//! words are re-tagged in lower case first, so a capital letter only marks a
//! proper noun when it appears mid-sentence.
//!
//! Author: hephaex@gmail.com

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tkg_core::{Result, TkgError};
use tracing::warn;

use crate::roles::{Role, RoleTable};
use crate::tagger::{TaggedToken, Tagger};

/// Tag that marks a sentence boundary
pub const SENTENCE_END_TAG: &str = ".";

/// A token with its original tag and the role it was classified into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedToken {
    pub word: String,
    pub tag: String,
    pub role: Role,
}

impl ClassifiedToken {
    pub fn new(word: impl Into<String>, tag: impl Into<String>, role: Role) -> Self {
        Self {
            word: word.into(),
            tag: tag.into(),
            role,
        }
    }
}

impl std::fmt::Display for ClassifiedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Word: {}, Tag: {}, Classified as: {}",
            self.word, self.tag, self.role
        )
    }
}

/// Classifies tagged tokens into roles
#[derive(Clone)]
pub struct WordClassifier {
    tagger: Arc<dyn Tagger>,
    table: Arc<RoleTable>,
}

impl WordClassifier {
    pub fn new(tagger: Arc<dyn Tagger>, table: Arc<RoleTable>) -> Self {
        Self { tagger, table }
    }

    pub fn table(&self) -> &RoleTable {
        &self.table
    }

    pub fn tagger(&self) -> &Arc<dyn Tagger> {
        &self.tagger
    }

    /// Tag raw text and classify every token
    pub fn classify_text(&self, text: &str) -> Result<Vec<ClassifiedToken>> {
        let tokens = self.tagger.tag(text)?;
        self.classify(&tokens)
    }

    /// Classify an already tagged sentence.
    ///
    /// Fails on the first token whose tag has no entry in the role table.
    pub fn classify(&self, tokens: &[TaggedToken]) -> Result<Vec<ClassifiedToken>> {
        let mut classified = Vec::with_capacity(tokens.len());
        let mut sentence_start = true;

        for token in tokens {
            let role = self.classify_word(&token.word, &token.tag, sentence_start)?;
            classified.push(ClassifiedToken::new(&token.word, &token.tag, role));
            sentence_start = token.tag == SENTENCE_END_TAG;
        }

        Ok(classified)
    }

    /// Classify a single word given its tag and position
    pub fn classify_word(&self, word: &str, tag: &str, sentence_start: bool) -> Result<Role> {
        let multi_char = word.chars().count() > 1;

        // Capitalised mid-sentence words are proper nouns
        if !sentence_start && multi_char && word.chars().next().is_some_and(char::is_uppercase) {
            return Ok(Role::Subject);
        }

        if let Some(role) = self.table.role_for_word(word) {
            return Ok(role);
        }

        let mut tag = tag.to_string();
        let lower = word.to_lowercase();
        if sentence_start && multi_char && lower != word {
            if let Some(retagged) = self.tagger.tag_word(&lower)? {
                tag = retagged;
            }
        }

        self.table.role_for_tag(&tag).ok_or_else(|| {
            warn!(word = %word, tag = %tag, "Unrecognized POS tag");
            TkgError::UnrecognizedTag {
                word: word.to_string(),
                tag,
            }
        })
    }
}

impl std::fmt::Debug for WordClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordClassifier")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

/// One line per classified token
pub fn render_classified(tokens: &[ClassifiedToken]) -> String {
    tokens
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::LexiconTagger;

    /// Tags every word from a fixed map
    struct FixedTagger(Vec<(&'static str, &'static str)>);

    impl Tagger for FixedTagger {
        fn tag(&self, text: &str) -> Result<Vec<TaggedToken>> {
            Ok(text
                .split_whitespace()
                .map(|w| {
                    let tag = self
                        .0
                        .iter()
                        .find(|(word, _)| *word == w)
                        .map(|(_, tag)| *tag)
                        .unwrap_or("NN");
                    TaggedToken::new(w, tag)
                })
                .collect())
        }
    }

    fn classifier() -> WordClassifier {
        WordClassifier::new(
            Arc::new(LexiconTagger::new()),
            Arc::new(RoleTable::penn_treebank()),
        )
    }

    fn roles(tokens: &[ClassifiedToken]) -> Vec<Role> {
        tokens.iter().map(|t| t.role).collect()
    }

    #[test]
    fn test_classify_simple_sentence() {
        let tokens = classifier().classify_text("I went to the park.").unwrap();
        assert_eq!(
            roles(&tokens),
            vec![
                Role::SelfPronoun,
                Role::Connector,
                Role::Connector,
                Role::Ignore,
                Role::Subject,
                Role::Separator,
            ]
        );
        assert_eq!(tokens[0].tag, "PRP");
    }

    #[test]
    fn test_capitalised_word_mid_sentence_is_subject() {
        let tokens = vec![
            TaggedToken::new("I", "PRP"),
            TaggedToken::new("like", "VBP"),
            TaggedToken::new("Summer", "VBP"),
        ];
        let classified = classifier().classify(&tokens).unwrap();
        assert_eq!(classified[2].role, Role::Subject);
        assert_eq!(classified[2].tag, "VBP");
    }

    #[test]
    fn test_sentence_start_is_retagged_in_lower_case() {
        let tagger = FixedTagger(vec![("Running", "NNP"), ("running", "VBG")]);
        let classifier = WordClassifier::new(Arc::new(tagger), Arc::new(RoleTable::default()));

        let tokens = classifier.classify_text("Running").unwrap();
        assert_eq!(tokens[0].role, Role::Connector);
        assert_eq!(tokens[0].tag, "NNP");
    }

    #[test]
    fn test_mid_sentence_clitic_is_not_a_subject() {
        let tokens = classifier().classify_text("the dog's bone").unwrap();
        assert_eq!(tokens[2].word, "'s");
        assert_eq!(tokens[2].tag, "POS");
        assert_eq!(
            roles(&tokens),
            vec![Role::Ignore, Role::Subject, Role::Ignore, Role::Subject]
        );
    }

    #[test]
    fn test_capital_after_sentence_end_is_not_forced() {
        let tokens = vec![
            TaggedToken::new("fine", "JJ"),
            TaggedToken::new(".", "."),
            TaggedToken::new("Great", "JJ"),
        ];
        let classified = classifier().classify(&tokens).unwrap();
        assert_eq!(classified[2].role, Role::Quality);
    }

    #[test]
    fn test_lexical_pronouns_override_tag() {
        let tokens = vec![
            TaggedToken::new("these", "DT"),
            TaggedToken::new("us", "PRP"),
            TaggedToken::new("you", "PRP"),
        ];
        let classified = classifier().classify(&tokens).unwrap();
        assert_eq!(
            roles(&classified),
            vec![Role::SubjectPronoun, Role::SelfPronoun, Role::Pronoun]
        );
    }

    #[test]
    fn test_unrecognized_tag_fails() {
        let tokens = vec![TaggedToken::new("dog", "NN"), TaggedToken::new("--", "SYM")];
        let err = classifier().classify(&tokens).unwrap_err();
        match err {
            TkgError::UnrecognizedTag { word, tag } => {
                assert_eq!(word, "--");
                assert_eq!(tag, "SYM");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_render_classified() {
        let tokens = vec![ClassifiedToken::new("dog", "NN", Role::Subject)];
        assert_eq!(
            render_classified(&tokens),
            "Word: dog, Tag: NN, Classified as: Subject"
        );
    }
}
