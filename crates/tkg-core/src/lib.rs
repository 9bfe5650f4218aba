//! TKG Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout the TKG system:
//! - Knowledge triples and speaker identities
//! - Common error types
//! - Chat message types and the LLM client trait
//! - Configuration management
//!
//! Author: hephaex@gmail.com

pub mod config;

pub use config::{
    AppConfig, ConfigError, GraphBackend, GraphConfig, LlmConfig, LlmProvider, LoggingConfig,
    RetrievalConfig, SpeakerConfig,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for TKG operations
#[derive(Error, Debug)]
pub enum TkgError {
    /// A POS tag with no entry in the role table. Fatal for the current
    /// extraction call.
    #[error("Unrecognized POS tag: {tag} | word: {word}")]
    UnrecognizedTag { word: String, tag: String },

    #[error("Tagger error: {0}")]
    Tagger(String),

    #[error("Graph store error: {0}")]
    Graph(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ConfigError> for TkgError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TkgError>;

// ============================================================================
// Speakers
// ============================================================================

/// The two participants of an interview.
///
/// Pronouns detected during phrase grouping are replaced by one of these
/// identifiers. They live only for the duration of one extraction call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speakers {
    /// Person asking the questions
    pub interviewer: String,

    /// Person answering the questions
    pub interviewee: String,
}

impl Speakers {
    pub fn new(interviewer: impl Into<String>, interviewee: impl Into<String>) -> Self {
        Self {
            interviewer: interviewer.into(),
            interviewee: interviewee.into(),
        }
    }
}

impl Default for Speakers {
    fn default() -> Self {
        Self::new("Interviewer", "Speaker")
    }
}

// ============================================================================
// Knowledge Triples
// ============================================================================

/// A relationship triple (Subject, Predicate, Object)
///
/// Subject and object are opaque phrase strings (people, concepts, whole
/// responses); the predicate is a short relation name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    /// Create a new triple
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

impl<S, P, O> From<(S, P, O)> for Triple
where
    S: Into<String>,
    P: Into<String>,
    O: Into<String>,
{
    fn from((subject, predicate, object): (S, P, O)) -> Self {
        Self::new(subject, predicate, object)
    }
}

// ============================================================================
// Chat Types
// ============================================================================

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single chat message sent to or received from an LLM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Trait for LLM clients
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a conversation and return the model's reply
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Send a single user prompt
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.chat(&[ChatMessage::user(prompt)]).await
    }
}

// ============================================================================
// Tests
// ============================================================================
