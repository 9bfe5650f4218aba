//! Role classification table
//!
//! Partitions Penn Treebank POS tags into the semantic roles used by the
//! grouping engine. The table is built once and handed to the classifier
//! explicitly, so tests can swap in alternative tag sets.
//!
//! Author: hephaex@gmail.com

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

// ============================================================================
// Roles
// ============================================================================

/// Semantic bucket a token is classified into before grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Subject,
    Quality,
    Connector,
    Separator,
    Ignore,
    Pronoun,
    SelfPronoun,
    SubjectPronoun,
    MainSubject,
    Other,
}

impl Role {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subject => "Subject",
            Self::Quality => "Quality",
            Self::Connector => "Connector",
            Self::Separator => "Separator",
            Self::Ignore => "Ignore",
            Self::Pronoun => "Pronoun",
            Self::SelfPronoun => "SelfPronoun",
            Self::SubjectPronoun => "SubjectPronoun",
            Self::MainSubject => "MainSubject",
            Self::Other => "Other",
        }
    }

    /// Any of the three pronoun roles
    pub fn is_pronoun(&self) -> bool {
        matches!(self, Self::Pronoun | Self::SelfPronoun | Self::SubjectPronoun)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Default Penn Treebank partition
// ============================================================================

pub const SUBJECT_TAGS: &[&str] = &["NN", "NNS", "NNP", "CD"];
pub const QUALITY_TAGS: &[&str] = &["JJ", "JJS", "JJR"];
pub const CONNECTOR_TAGS: &[&str] = &["VBP", "VBG", "VBZ", "VB", "TO", "MD", "VBN", "RBR", "VBD"];
pub const SEPARATOR_TAGS: &[&str] = &[",", ".", "CC", "WRB"];
pub const IGNORE_TAGS: &[&str] = &["DT", "RB", "RP", "WP", "POS", "WDT", "IN"];
pub const PRONOUN_TAGS: &[&str] = &["PRP", "PRP$"];

/// First-person words, resolved to the interviewer
pub const SELF_PRONOUNS: &[&str] = &["i", "me", "we", "myself", "our", "ourselves", "us"];

/// Third-person words, resolved to the interviewee
pub const SUBJECT_PRONOUNS: &[&str] = &["it", "he", "she", "they", "these"];

/// Words the tagger tends to mislabel as nouns; never grouped as a subject
pub const SUBJECT_BAD_APPLES: &[&str] = &["on"];

// ============================================================================
// Role Table
// ============================================================================

/// Immutable tag -> role mapping plus the lexical pronoun sets
#[derive(Debug, Clone)]
pub struct RoleTable {
    tags: HashMap<String, Role>,
    self_pronouns: HashSet<String>,
    subject_pronouns: HashSet<String>,
    subject_bad_apples: HashSet<String>,
}

impl RoleTable {
    /// An empty table; every lookup fails until tags are added
    pub fn empty() -> Self {
        Self {
            tags: HashMap::new(),
            self_pronouns: HashSet::new(),
            subject_pronouns: HashSet::new(),
            subject_bad_apples: HashSet::new(),
        }
    }

    /// The default table keyed on Penn Treebank tags
    pub fn penn_treebank() -> Self {
        let mut table = Self::empty();

        table.add_tags(SUBJECT_TAGS, Role::Subject);
        table.add_tags(QUALITY_TAGS, Role::Quality);
        table.add_tags(CONNECTOR_TAGS, Role::Connector);
        table.add_tags(SEPARATOR_TAGS, Role::Separator);
        table.add_tags(PRONOUN_TAGS, Role::Pronoun);
        table.add_tags(IGNORE_TAGS, Role::Ignore);

        table.self_pronouns = to_set(SELF_PRONOUNS);
        table.subject_pronouns = to_set(SUBJECT_PRONOUNS);
        table.subject_bad_apples = to_set(SUBJECT_BAD_APPLES);
        table
    }

    /// Add or replace a single tag mapping
    pub fn with_tag(mut self, tag: impl Into<String>, role: Role) -> Self {
        self.tags.insert(tag.into(), role);
        self
    }

    /// Remove a tag mapping
    pub fn without_tag(mut self, tag: &str) -> Self {
        self.tags.remove(tag);
        self
    }

    fn add_tags(&mut self, tags: &[&str], role: Role) {
        for tag in tags {
            self.tags.insert((*tag).to_string(), role);
        }
    }

    /// Role for a POS tag, if the tag is known
    pub fn role_for_tag(&self, tag: &str) -> Option<Role> {
        self.tags.get(tag).copied()
    }

    /// Role from the lexical pronoun sets, matched on the lower-cased word
    pub fn role_for_word(&self, word: &str) -> Option<Role> {
        let lower = word.to_lowercase();
        if self.self_pronouns.contains(&lower) {
            Some(Role::SelfPronoun)
        } else if self.subject_pronouns.contains(&lower) {
            Some(Role::SubjectPronoun)
        } else {
            None
        }
    }

    /// Whether a word must never join a subject phrase
    pub fn is_bad_subject(&self, word: &str) -> bool {
        self.subject_bad_apples.contains(&word.to_lowercase())
    }

    /// All tags known to the table
    pub fn tags(&self) -> impl Iterator<Item = (&str, Role)> {
        self.tags.iter().map(|(tag, role)| (tag.as_str(), *role))
    }
}

impl Default for RoleTable {
    fn default() -> Self {
        Self::penn_treebank()
    }
}

fn to_set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

// ============================================================================
// Tests
// ============================================================================
