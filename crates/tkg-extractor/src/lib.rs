//! TKG Extractor - Interview triple extraction
//!
//! Rule-based pipeline turning interview transcripts into knowledge triples:
//! POS tagging, role classification, three-pass phrase grouping, subject
//! extraction and question/response segmentation. An LLM-backed extractor
//! is provided alongside for free-form text.
//!
//! Author: hephaex@gmail.com

use tkg_core::{Result, Speakers, Triple};

pub mod classifier;
pub mod grouping;
pub mod interview;
pub mod llm_triples;
pub mod roles;
pub mod subjects;
pub mod tagger;

pub use classifier::{ClassifiedToken, WordClassifier};
pub use grouping::{connect_sentence, group_sentence, merge_qualities, EngineState, Phrase};
pub use interview::{
    segment_questions, BasicTripleExtractor, InterviewRelation, QaPairs, QuestionResponse,
};
pub use llm_triples::{
    chunk_by_sentence, parse_llm_triples, remove_think_blocks, LlmTripleConfig,
    LlmTripleExtractor,
};
pub use roles::{Role, RoleTable};
pub use subjects::{analyze, SentenceAnalysis, SubjectExtractor};
pub use tagger::{LexiconTagger, TaggedToken, Tagger};

/// Trait for transcript triple extractors
pub trait TripleExtractor: Send + Sync {
    fn extract(&self, text: &str, speakers: &Speakers) -> Result<Vec<Triple>>;
}
