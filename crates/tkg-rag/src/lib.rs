//! TKG RAG - Question answering over interview graphs
//!
//! Wires the extractor and the graph store together:
//! - ingestion of transcripts into the store, rule-based or LLM-based
//! - context retrieval from the subjects (or LLM triples) of a question
//! - LLM chat grounded on the retrieved triples
//!
//! Highlight prioritisation lives here too since it searches the same
//! transcripts the pipeline ingests.
//!
//! Author: hephaex@gmail.com

pub mod cache;
pub mod chat;
pub mod highlight;
pub mod llm;
pub mod pipeline;
pub mod retriever;

pub use cache::{CacheConfig, CacheStatsReport, SubjectCache};
pub use chat::{triple_system_prompt, InterviewAssistant, PromptBuilder, NO_ANSWER};
pub use highlight::{Highlight, HighlightPrioritiser, PrioritisedMatch, PriorityTier, Segment};
pub use llm::{create_llm_client, OllamaClient, OpenAiClient};
pub use pipeline::{IngestReport, KnowledgeGraphPipeline};
pub use retriever::{
    format_context, ContextRetriever, LlmTripleContextRetriever, TripleContextRetriever,
};
