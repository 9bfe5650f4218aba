//! POS tagging
//!
//! The [`Tagger`] trait is the seam for any Penn-Treebank-compatible
//! tokenizer/tagger. [`LexiconTagger`] is a deterministic, dependency-free
//! implementation built from closed-class word lists, small open-class
//! lexicons, capitalisation and suffix heuristics, using one token of left
//! context.
//!
//! Author: hephaex@gmail.com

use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tkg_core::{Result, TkgError};

/// A (word, tag) pair produced by a tagger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedToken {
    pub word: String,
    pub tag: String,
}

impl TaggedToken {
    pub fn new(word: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            tag: tag.into(),
        }
    }
}

impl<W: Into<String>, T: Into<String>> From<(W, T)> for TaggedToken {
    fn from((word, tag): (W, T)) -> Self {
        Self::new(word, tag)
    }
}

/// Trait for tokenizer/taggers
pub trait Tagger: Send + Sync {
    /// Tokenize and tag raw text, preserving token order
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>>;

    /// Tag a single word in isolation
    fn tag_word(&self, word: &str) -> Result<Option<String>> {
        Ok(self.tag(word)?.into_iter().next().map(|t| t.tag))
    }
}

// ============================================================================
// Lexicons
// ============================================================================

const DETERMINERS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "every", "each", "some", "any", "no",
    "all", "another", "both", "either", "neither",
];

const PERSONAL_PRONOUNS: &[&str] = &[
    "i", "me", "you", "he", "him", "she", "it", "we", "us", "they", "them", "myself",
    "yourself", "himself", "herself", "itself", "ourselves", "yourselves", "themselves",
];

const POSSESSIVE_PRONOUNS: &[&str] = &["my", "your", "his", "her", "its", "our", "their"];

const PREPOSITIONS: &[&str] = &[
    "in", "on", "at", "of", "for", "with", "about", "from", "by", "as", "into", "than", "over",
    "under", "after", "before", "between", "through", "during", "without", "within", "because",
    "if", "since", "while", "although", "though", "whether", "upon", "against", "toward",
    "towards", "across", "around", "until", "unless", "whilst", "per", "via", "onto", "among",
    "beyond", "despite",
];

const CONJUNCTIONS: &[&str] = &["and", "but", "or", "nor", "yet", "plus"];

const MODALS: &[&str] = &[
    "can", "could", "will", "would", "shall", "should", "may", "might", "must", "ca", "wo",
];

const WH_DETERMINERS: &[&str] = &["which", "whichever", "whatever"];
const WH_PRONOUNS: &[&str] = &["what", "who", "whom", "whoever", "whose"];
const WH_ADVERBS: &[&str] = &["how", "when", "where", "why", "whenever", "wherever"];
const PARTICLES: &[&str] = &["up", "out", "off", "down"];

/// Interjections and `there` are folded into RB; the role table has no
/// UH or EX entry.
const ADVERBS: &[&str] = &[
    "not", "also", "very", "too", "just", "only", "really", "sometimes", "always", "never",
    "often", "even", "still", "already", "then", "now", "here", "there", "so", "quite",
    "rather", "almost", "again", "ever", "soon", "maybe", "perhaps", "else", "however", "once",
    "away", "back", "well", "together", "yes", "yeah", "okay", "ok", "hi", "hello", "oh", "um",
    "uh", "please",
];

const COMPARATIVE_ADVERBS: &[&str] = &["more", "less"];

const ADJECTIVES: &[&str] = &[
    "good", "bad", "big", "small", "new", "old", "long", "short", "real", "helpful",
    "frustrating", "simple", "tough", "wrong", "right", "fine", "deep", "great", "hard", "easy",
    "fast", "quick", "own", "other", "many", "much", "few", "several", "first", "last",
    "different", "same", "important", "personal", "critical", "guilty", "useful", "true",
    "false", "high", "low", "happy", "sad", "mad", "red", "shiny", "sure", "able", "ready",
    "whole", "full", "free", "open", "clear", "main", "general", "human", "social",
];

const COMPARATIVE_ADJECTIVES: &[&str] = &[
    "better", "worse", "bigger", "smaller", "faster", "easier", "harder", "deeper", "simpler",
    "higher", "lower", "greater", "longer",
];

const SUPERLATIVE_ADJECTIVES: &[&str] = &[
    "best", "worst", "most", "least", "biggest", "fastest", "easiest", "hardest", "deepest",
];

/// Auxiliaries with a fixed tag
const AUXILIARIES: &[(&str, &str)] = &[
    ("am", "VBP"),
    ("are", "VBP"),
    ("is", "VBZ"),
    ("was", "VBD"),
    ("were", "VBD"),
    ("be", "VB"),
    ("been", "VBN"),
    ("being", "VBG"),
    ("has", "VBZ"),
    ("does", "VBZ"),
    ("did", "VBD"),
    ("done", "VBN"),
];

/// Base-form verbs; the tag depends on left context
const VERBS: &[&str] = &[
    "have", "do", "like", "go", "use", "get", "make", "feel", "think", "know", "want", "see",
    "learn", "ask", "help", "need", "trust", "rely", "depend", "study", "run", "work", "say",
    "give", "take", "find", "tell", "try", "read", "write", "teach", "combine", "build",
    "finish", "check", "describe", "explain", "practice", "talk", "answer", "brainstorm",
    "skip", "waste", "boost", "correct", "influence", "love", "hate", "enjoy", "believe",
    "mean", "seem", "become", "keep", "let", "put", "come", "look", "show", "play", "move",
    "live", "start", "call", "follow", "remember", "understand", "prefer", "spend", "hope",
];

/// Irregular simple-past forms (VBN after a be/have auxiliary)
const IRREGULAR_PAST: &[&str] = &[
    "went", "had", "made", "got", "gave", "felt", "thought", "knew", "saw", "said", "took",
    "found", "told", "came", "ran", "wrote", "taught", "built", "meant", "became", "kept",
    "spent", "understood",
];

const PAST_PARTICIPLES: &[&str] = &["gone", "given", "taken", "known", "seen", "written"];

/// Words after which a past form reads as a participle
const HAVE_BE: &[&str] = &[
    "have", "has", "had", "'ve", "'d", "am", "is", "are", "was", "were", "be", "been", "being",
    "'m", "'re", "'s",
];

/// Left-context tags after which a verb-looking word is nominal
const NOMINAL_CONTEXT: &[&str] = &["DT", "PRP$", "JJ", "JJR", "JJS", "POS", "CD"];

const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "ive", "able", "ible", "less", "ical"];

/// `-est` words that are not superlatives
const NON_SUPERLATIVE_EST: &[&str] = &[
    "arrest", "contest", "digest", "forest", "harvest", "interest", "invest", "manifest",
    "protest", "quest", "request", "suggest",
];

const CLITICS: &[&str] = &["'s", "'m", "'re", "'ve", "'ll", "'d"];

/// Characters dropped during tokenization
const DROPPED: &[char] = &['"', '\'', '`', '(', ')', '[', ']', '{', '}'];

// ============================================================================
// Lexicon Tagger
// ============================================================================

/// Rule-based Penn Treebank tagger
pub struct LexiconTagger {
    token_pattern: Option<Regex>,
    /// Closed-class and fixed-tag words (lowercase word -> tag)
    lexicon: HashMap<&'static str, &'static str>,
    verbs: HashSet<&'static str>,
    irregular_past: HashSet<&'static str>,
    have_be: HashSet<&'static str>,
}

impl LexiconTagger {
    /// Create a tagger with the built-in English lexicons
    pub fn new() -> Self {
        let token_pattern = Regex::new(
            r"\p{N}+(?:[.,]\p{N}+)*|[\p{L}\p{N}]+(?:['\-][\p{L}\p{N}]+)*|\.{3}|[^\s\p{L}\p{N}]",
        )
        .ok();

        let mut tagger = Self {
            token_pattern,
            lexicon: HashMap::new(),
            verbs: VERBS.iter().copied().collect(),
            irregular_past: IRREGULAR_PAST.iter().copied().collect(),
            have_be: HAVE_BE.iter().copied().collect(),
        };
        tagger.init_lexicon();
        tagger
    }

    fn init_lexicon(&mut self) {
        self.add_words(DETERMINERS, "DT");
        self.add_words(PERSONAL_PRONOUNS, "PRP");
        self.add_words(POSSESSIVE_PRONOUNS, "PRP$");
        self.add_words(PREPOSITIONS, "IN");
        self.add_words(CONJUNCTIONS, "CC");
        self.add_words(MODALS, "MD");
        self.add_words(WH_DETERMINERS, "WDT");
        self.add_words(WH_PRONOUNS, "WP");
        self.add_words(WH_ADVERBS, "WRB");
        self.add_words(PARTICLES, "RP");
        self.add_words(ADVERBS, "RB");
        self.add_words(COMPARATIVE_ADVERBS, "RBR");
        self.add_words(ADJECTIVES, "JJ");
        self.add_words(COMPARATIVE_ADJECTIVES, "JJR");
        self.add_words(SUPERLATIVE_ADJECTIVES, "JJS");
        self.add_words(PAST_PARTICIPLES, "VBN");
        self.lexicon.insert("to", "TO");
        for (word, tag) in AUXILIARIES {
            self.lexicon.insert(word, tag);
        }
    }

    fn add_words(&mut self, words: &[&'static str], tag: &'static str) {
        for word in words {
            self.lexicon.insert(word, tag);
        }
    }

    /// Split text into Treebank-style tokens
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let Some(pattern) = self.token_pattern.as_ref() else {
            return Vec::new();
        };
        let normalized = text
            .replace(['\u{2019}', '\u{2018}'], "'")
            .replace(['\u{201c}', '\u{201d}'], "\"");

        let mut tokens = Vec::new();
        for m in pattern.find_iter(&normalized) {
            let word = m.as_str();
            if word.chars().count() == 1 && word.chars().all(|c| DROPPED.contains(&c)) {
                continue;
            }
            split_clitics(word, &mut tokens);
        }
        tokens
    }

    fn tag_token(&self, word: &str, prev: Option<(&str, &str)>) -> &'static str {
        let lower = word.to_lowercase();
        let prev_tag = prev.map(|(_, tag)| tag).unwrap_or("");
        let prev_word = prev.map(|(w, _)| w.to_lowercase()).unwrap_or_default();
        let after_nominal = NOMINAL_CONTEXT.contains(&prev_tag);

        if let Some(tag) = punctuation_tag(word) {
            return tag;
        }
        if word.chars().next().is_some_and(|c| c.is_numeric()) {
            return "CD";
        }

        match lower.as_str() {
            "n't" => return "RB",
            "'m" | "'re" | "'ve" => return "VBP",
            "'ll" | "'d" => return "MD",
            "'s" => {
                return if matches!(prev_tag, "PRP" | "WP" | "DT" | "WRB") {
                    "VBZ"
                } else {
                    "POS"
                }
            }
            _ => {}
        }

        if let Some(tag) = self.lexicon.get(lower.as_str()) {
            return tag;
        }

        if self.verbs.contains(lower.as_str()) {
            return if matches!(prev_tag, "TO" | "MD") {
                "VB"
            } else if after_nominal || prev_tag == "IN" {
                "NN"
            } else if lower == "like" && prev_tag.starts_with("VB") {
                "IN"
            } else {
                "VBP"
            };
        }
        if self.is_third_person_verb(&lower) {
            return if after_nominal { "NNS" } else { "VBZ" };
        }
        if self.irregular_past.contains(lower.as_str()) {
            return if self.have_be.contains(prev_word.as_str()) {
                "VBN"
            } else {
                "VBD"
            };
        }

        if word.chars().next().is_some_and(|c| c.is_uppercase()) {
            return "NNP";
        }

        let len = lower.chars().count();
        if len > 4 && lower.ends_with("ing") {
            return if after_nominal { "NN" } else { "VBG" };
        }
        if len > 3 && lower.ends_with("ed") {
            return if self.have_be.contains(prev_word.as_str()) {
                "VBN"
            } else if after_nominal || prev_tag == "RB" {
                "JJ"
            } else {
                "VBD"
            };
        }
        if len > 3 && lower.ends_with("ly") {
            return "RB";
        }
        if len > 4 && lower.ends_with("est") && !NON_SUPERLATIVE_EST.contains(&lower.as_str()) {
            return "JJS";
        }
        if len > 4 && ADJECTIVE_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
            return "JJ";
        }
        if len > 3
            && lower.ends_with('s')
            && !(lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is"))
        {
            return "NNS";
        }
        "NN"
    }

    /// `likes`, `teaches`, `studies` for a known base verb
    fn is_third_person_verb(&self, lower: &str) -> bool {
        if let Some(stem) = lower.strip_suffix("ies") {
            return self.verbs.contains(format!("{stem}y").as_str());
        }
        if let Some(stem) = lower.strip_suffix("es") {
            if self.verbs.contains(stem) {
                return true;
            }
        }
        lower
            .strip_suffix('s')
            .is_some_and(|stem| self.verbs.contains(stem))
    }
}

impl Default for LexiconTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl Tagger for LexiconTagger {
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>> {
        if self.token_pattern.is_none() {
            return Err(TkgError::Tagger("token pattern failed to compile".to_string()));
        }

        let mut tagged: Vec<TaggedToken> = Vec::new();
        for word in self.tokenize(text) {
            let prev = tagged.last().map(|t| (t.word.as_str(), t.tag.as_str()));
            let tag = self.tag_token(&word, prev);
            tagged.push(TaggedToken::new(word, tag));
        }
        Ok(tagged)
    }
}

fn punctuation_tag(word: &str) -> Option<&'static str> {
    let tag = match word {
        "." | "?" | "!" | "..." => ".",
        "," | ";" | ":" | "-" | "\u{2014}" | "\u{2013}" => ",",
        "&" => "CC",
        "%" => "NN",
        "$" => "$",
        "#" => "#",
        _ if word.chars().all(|c| !c.is_alphanumeric()) => "SYM",
        _ => return None,
    };
    Some(tag)
}

fn split_clitics(word: &str, tokens: &mut Vec<String>) {
    let lower = word.to_lowercase();

    if lower.ends_with("n't") && lower.len() > 3 {
        let split = word.len() - 3;
        tokens.push(word[..split].to_string());
        tokens.push(word[split..].to_string());
        return;
    }

    if let Some(idx) = word.rfind('\'') {
        if idx > 0 && CLITICS.contains(&word[idx..].to_lowercase().as_str()) {
            tokens.push(word[..idx].to_string());
            tokens.push(word[idx..].to_string());
            return;
        }
    }

    tokens.push(word.to_string());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(text: &str) -> Vec<(String, String)> {
        LexiconTagger::new()
            .tag(text)
            .unwrap()
            .into_iter()
            .map(|t| (t.word, t.tag))
            .collect()
    }

    fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected
            .iter()
            .map(|(w, t)| (w.to_string(), t.to_string()))
            .collect()
    }

    #[test]
    fn test_token_pattern_compiles() {
        let tagger = LexiconTagger::new();
        assert!(tagger.token_pattern.is_some());
        assert_eq!(tagger.tokenize("Hi, Jo."), vec!["Hi", ",", "Jo", "."]);
    }

    #[test]
    fn test_simple_sentence() {
        assert_eq!(
            tags("I went to the park."),
            pairs(&[
                ("I", "PRP"),
                ("went", "VBD"),
                ("to", "TO"),
                ("the", "DT"),
                ("park", "NN"),
                (".", "."),
            ])
        );
    }

    #[test]
    fn test_question_and_possessive() {
        assert_eq!(
            tags("What is your name?"),
            pairs(&[
                ("What", "WP"),
                ("is", "VBZ"),
                ("your", "PRP$"),
                ("name", "NN"),
                ("?", "."),
            ])
        );
    }

    #[test]
    fn test_contractions_split() {
        let tokens = LexiconTagger::new().tokenize("I don\u{2019}t think it's Josh's.");
        assert_eq!(
            tokens,
            vec!["I", "do", "n't", "think", "it", "'s", "Josh", "'s", "."]
        );

        let tagged = tags("it's Josh's");
        assert_eq!(tagged[1], ("'s".to_string(), "VBZ".to_string()));
        assert_eq!(tagged[3], ("'s".to_string(), "POS".to_string()));
    }

    #[test]
    fn test_verb_context() {
        assert_eq!(
            tags("I like to run"),
            pairs(&[("I", "PRP"), ("like", "VBP"), ("to", "TO"), ("run", "VB")])
        );
        assert_eq!(tags("the work")[1].1, "NN");
        assert_eq!(tags("it feels like")[2].1, "IN");
        assert_eq!(tags("she teaches")[1].1, "VBZ");
        assert_eq!(tags("the uses")[1].1, "NNS");
    }

    #[test]
    fn test_past_forms() {
        assert_eq!(tags("I have taught")[2].1, "VBN");
        assert_eq!(tags("I taught")[1].1, "VBD");
        assert_eq!(tags("it was corrected")[2].1, "VBN");
        assert_eq!(tags("they checked")[1].1, "VBD");
        assert_eq!(tags("the personalized feedback")[1].1, "JJ");
    }

    #[test]
    fn test_suffix_heuristics() {
        assert_eq!(tags("quickly")[0].1, "RB");
        assert_eq!(tags("accessible")[0].1, "JJ");
        assert_eq!(tags("summaries")[0].1, "NNS");
        assert_eq!(tags("class")[0].1, "NN");
        assert_eq!(tags("learning")[0].1, "VBG");
        assert_eq!(tags("my learning")[1].1, "NN");
        assert_eq!(tags("the cleanest room")[1].1, "JJS");
        assert_eq!(tags("the cleanest room")[2].1, "NN");
        assert_eq!(tags("an interest")[1].1, "NN");
    }

    #[test]
    fn test_capitalised_unknown_is_proper_noun() {
        assert_eq!(tags("Alice")[0].1, "NNP");
        assert_eq!(tags("alice")[0].1, "NN");
        assert_eq!(tags("The")[0].1, "DT");
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            tags("yes, no; maybe \u{2014} 15 $ @"),
            pairs(&[
                ("yes", "RB"),
                (",", ","),
                ("no", "DT"),
                (";", ","),
                ("maybe", "RB"),
                ("\u{2014}", ","),
                ("15", "CD"),
                ("$", "$"),
                ("@", "SYM"),
            ])
        );
    }

    #[test]
    fn test_quotes_and_brackets_dropped() {
        let tokens = LexiconTagger::new().tokenize("\u{201c}Hello\u{201d} (world)");
        assert_eq!(tokens, vec!["Hello", "world"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(LexiconTagger::new().tag("").unwrap().is_empty());
        assert_eq!(LexiconTagger::new().tag_word("").unwrap(), None);
    }
}
