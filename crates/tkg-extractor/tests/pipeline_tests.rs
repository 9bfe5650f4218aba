//! End-to-end tests for the rule-based extraction pipeline

use std::sync::Arc;

use proptest::prelude::*;
use tkg_core::{Result, Speakers, TkgError};
use tkg_extractor::grouping::{group_separator, TokenContext};
use tkg_extractor::{
    connect_sentence, group_sentence, merge_qualities, segment_questions, BasicTripleExtractor,
    ClassifiedToken, EngineState, LexiconTagger, Phrase, Role, RoleTable, SubjectExtractor,
    TaggedToken, Tagger, WordClassifier,
};

/// Returns the same tag for every whitespace-separated word
struct UniformTagger(String);

impl Tagger for UniformTagger {
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>> {
        Ok(text
            .split_whitespace()
            .map(|w| TaggedToken::new(w, self.0.clone()))
            .collect())
    }
}

fn lexicon_extractor(speakers: Speakers) -> SubjectExtractor {
    SubjectExtractor::new(
        Arc::new(LexiconTagger::new()),
        Arc::new(RoleTable::penn_treebank()),
        speakers,
    )
}

#[test]
fn test_reset_is_idempotent() {
    let mut extractor = lexicon_extractor(Speakers::default());

    extractor.reset_sentence("My dog likes the big red ball.").unwrap();
    let classified = extractor.classified().unwrap();
    let grouped = extractor.grouped().unwrap();

    extractor.reset_sentence("My dog likes the big red ball.").unwrap();
    assert_eq!(extractor.classified().unwrap(), classified);
    assert_eq!(extractor.grouped().unwrap(), grouped);
}

#[test]
fn test_every_table_tag_is_classified() {
    let table = Arc::new(RoleTable::penn_treebank());
    let tags: Vec<(String, Role)> = table
        .tags()
        .map(|(tag, role)| (tag.to_string(), role))
        .collect();

    for (tag, role) in tags {
        let classifier = WordClassifier::new(Arc::new(UniformTagger(tag.clone())), table.clone());
        let tokens = vec![TaggedToken::new("word", tag.as_str())];
        let classified = classifier.classify(&tokens).unwrap();
        assert_eq!(classified[0].role, role, "tag {tag}");
    }
}

#[test]
fn test_pronoun_resolves_to_interviewer() {
    let mut extractor = lexicon_extractor(Speakers::new("Interviewer", "Speaker"));
    let grouped = extractor
        .reset_sentence("I went to the park.")
        .and_then(|_| extractor.grouped())
        .unwrap();

    assert_eq!(grouped[0], Phrase::new("Interviewer", Role::Subject));
    assert!(grouped.iter().all(|p| p.text != "I"));
}

#[test]
fn test_quality_merges_into_following_subject() {
    let tokens = vec![
        ClassifiedToken::new("big", "JJ", Role::Quality),
        ClassifiedToken::new("dog", "NN", Role::Subject),
    ];
    let grouped = group_sentence(&tokens, &RoleTable::penn_treebank(), &Speakers::default());
    let merged = merge_qualities(&grouped);

    assert_eq!(merged, vec![Phrase::new("big dog", Role::Subject)]);
}

#[test]
fn test_question_response_segmentation() {
    let pairs = segment_questions("How are you? I am fine. What is your name? Alice.");
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs.get("How are you?"), Some("I am fine. "));
    assert_eq!(pairs.get("What is your name?"), Some("Alice. "));
}

#[test]
fn test_triple_shape_per_pair() {
    let extractor = BasicTripleExtractor::default();
    let text = "What do you use? I use the chatbot for summaries and quick checks.";

    let pairs = extractor.get_questions(text);
    let pair = pairs.iter().next().unwrap();
    let subjects = lexicon_extractor(Speakers::new("Josh", "John"))
        .get_subjects(Some(&pair.response))
        .unwrap();

    let triples = extractor.get_triples(text, "Josh", "John").unwrap();
    assert_eq!(triples.len(), 3 + subjects.len());
    assert!(!subjects.is_empty());

    let predicates: Vec<&str> = triples.iter().map(|t| t.predicate.as_str()).collect();
    assert_eq!(&predicates[..3], &["answered", "hasResponse", "answeredBy"]);
    assert!(predicates[3..].iter().all(|p| *p == "mentions"));
}

#[test]
fn test_unknown_tag_fails_without_partial_result() {
    let classifier = WordClassifier::new(
        Arc::new(LexiconTagger::new()),
        Arc::new(RoleTable::penn_treebank()),
    );
    let tokens = vec![
        TaggedToken::new("dogs", "NNS"),
        TaggedToken::new("bark", "VBP"),
        TaggedToken::new("there", "EX"),
    ];

    let result = classifier.classify(&tokens);
    assert!(matches!(result, Err(TkgError::UnrecognizedTag { ref tag, .. }) if tag == "EX"));
}

#[test]
fn test_unknown_tag_aborts_triple_extraction() {
    let extractor = BasicTripleExtractor::new(
        Arc::new(UniformTagger("XX".to_string())),
        Arc::new(RoleTable::penn_treebank()),
    );
    let result = extractor.get_triples("Why? Because.", "A", "B");
    assert!(matches!(result, Err(TkgError::UnrecognizedTag { .. })));
}

#[test]
fn test_separator_flushes_connector_before_subject() {
    let state = EngineState {
        subject: Some("my dog".to_string()),
        connector: Some("likes".to_string()),
        output: Vec::new(),
    };
    let separator = ClassifiedToken::new(".", ".", Role::Separator);
    let ctx = TokenContext {
        token: &separator,
        prev: None,
        next: None,
    };

    let roles: Vec<Role> = group_separator(state, &ctx)
        .output
        .iter()
        .map(|p| p.role)
        .collect();
    assert_eq!(roles, vec![Role::Connector, Role::Subject, Role::Separator]);
}

// ============================================================================
// Property tests
// ============================================================================

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Subject),
        Just(Role::Quality),
        Just(Role::Connector),
        Just(Role::Separator),
        Just(Role::Ignore),
        Just(Role::Pronoun),
        Just(Role::SelfPronoun),
        Just(Role::SubjectPronoun),
        Just(Role::Other),
    ]
}

fn table_tag_strategy() -> impl Strategy<Value = String> {
    let tags: Vec<String> = RoleTable::penn_treebank()
        .tags()
        .map(|(tag, _)| tag.to_string())
        .collect();
    prop::sample::select(tags)
}

fn token_strategy() -> impl Strategy<Value = ClassifiedToken> {
    ("[a-z]{1,6}", role_strategy()).prop_map(|(word, role)| ClassifiedToken::new(word, "", role))
}

proptest! {
    #[test]
    fn prop_connected_has_no_adjacent_duplicate_roles(
        tokens in prop::collection::vec(token_strategy(), 0..24)
    ) {
        let grouped = group_sentence(&tokens, &RoleTable::penn_treebank(), &Speakers::default());
        let connected = connect_sentence(&merge_qualities(&grouped));

        for pair in connected.windows(2) {
            prop_assert_ne!(pair[0].role, pair[1].role);
        }
        prop_assert_eq!(connect_sentence(&connected), connected.clone());
    }

    #[test]
    fn prop_classification_is_one_to_one(
        input in prop::collection::vec(("[a-z]{1,6}", table_tag_strategy()), 0..24)
    ) {
        let tokens: Vec<TaggedToken> = input
            .iter()
            .map(|(word, tag)| TaggedToken::new(word.as_str(), tag.as_str()))
            .collect();
        let classifier = WordClassifier::new(
            Arc::new(UniformTagger("NN".to_string())),
            Arc::new(RoleTable::penn_treebank()),
        );

        let classified = classifier.classify(&tokens).unwrap();
        prop_assert_eq!(classified.len(), tokens.len());
        for (token, out) in tokens.iter().zip(&classified) {
            prop_assert_eq!(&out.word, &token.word);
            prop_assert_eq!(&out.tag, &token.tag);
        }
    }

    #[test]
    fn prop_separators_survive_grouping(
        tokens in prop::collection::vec(token_strategy(), 0..24)
    ) {
        let grouped = group_sentence(&tokens, &RoleTable::penn_treebank(), &Speakers::default());
        let separator_tokens = tokens.iter().filter(|t| t.role == Role::Separator).count();
        let separator_phrases = grouped.iter().filter(|p| p.role == Role::Separator).count();
        prop_assert_eq!(separator_phrases, separator_tokens);
    }

    #[test]
    fn prop_grouped_phrases_are_never_empty(
        tokens in prop::collection::vec(token_strategy(), 0..24)
    ) {
        let grouped = group_sentence(&tokens, &RoleTable::penn_treebank(), &Speakers::default());
        prop_assert!(grouped.iter().all(|p| !p.text.is_empty()));
        prop_assert!(grouped.len() <= tokens.len());
    }

    #[test]
    fn prop_lexicon_pipeline_never_panics(text in "[A-Za-z ,.?!']{0,80}") {
        let extractor = BasicTripleExtractor::default();
        match extractor.get_triples(&text, "Josh", "John") {
            Ok(triples) => {
                let pairs = segment_questions(&text);
                prop_assert!(triples.len() >= 3 * pairs.len());
            }
            Err(err) => prop_assert!(matches!(err, TkgError::UnrecognizedTag { .. }), "unexpected error: {:?}", err),
        }
    }
}
