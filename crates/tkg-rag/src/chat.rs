//! Question answering over retrieved triples
//!
//! Author: hephaex@gmail.com

use std::sync::Arc;

use tkg_core::{ChatMessage, LlmClient, Result};
use tracing::{debug, info};

use crate::retriever::ContextRetriever;

/// Reply the model is told to give when the triples do not cover a question
pub const NO_ANSWER: &str = "The answer is not available from the provided transcripts.";

const CONCISE_ASSISTANT: &str = "You are a helpful, highly concise assistant.";

// ============================================================================
// Prompt Builder
// ============================================================================

/// Builder for structured system prompts
pub struct PromptBuilder {
    system_instruction: String,
    context_sections: Vec<String>,
    instructions: Vec<String>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            system_instruction: String::new(),
            context_sections: Vec::new(),
            instructions: Vec::new(),
        }
    }

    pub fn system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    pub fn add_context(mut self, context: impl Into<String>) -> Self {
        self.context_sections.push(context.into());
        self
    }

    pub fn add_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instructions.push(instruction.into());
        self
    }

    pub fn build(self) -> String {
        let mut prompt = String::new();

        if !self.system_instruction.is_empty() {
            prompt.push_str(&self.system_instruction);
            prompt.push_str("\n\n");
        }

        if !self.context_sections.is_empty() {
            prompt.push_str("<triples>\n");
            for section in &self.context_sections {
                prompt.push_str(section.trim_end());
                prompt.push('\n');
            }
            prompt.push_str("</triples>\n\n");
        }

        if !self.instructions.is_empty() {
            prompt.push_str("Rules:\n");
            for (i, inst) in self.instructions.iter().enumerate() {
                prompt.push_str(&format!("{}. {}\n", i + 1, inst));
            }
        }

        prompt
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// System prompt restricting the answer to the given triples
pub fn triple_system_prompt(context: &str) -> String {
    PromptBuilder::new()
        .system("You answer questions about interview transcripts using only the knowledge triples below.")
        .add_context(context)
        .add_instruction("Use only facts stated in the triples.")
        .add_instruction(format!(
            "If the triples do not support an answer, reply exactly: '{NO_ANSWER}'"
        ))
        .add_instruction("Give a short, factual answer that stays within the question's scope.")
        .build()
}

// ============================================================================
// Interview Assistant
// ============================================================================

/// Answers questions with graph context when there is any
pub struct InterviewAssistant {
    llm: Arc<dyn LlmClient>,
    retriever: Arc<dyn ContextRetriever>,
}

impl InterviewAssistant {
    pub fn new(llm: Arc<dyn LlmClient>, retriever: Arc<dyn ContextRetriever>) -> Self {
        Self { llm, retriever }
    }

    /// Messages sent to the model for a question and its context
    pub fn messages(question: &str, context: &str) -> Vec<ChatMessage> {
        let system = if context.trim().is_empty() {
            CONCISE_ASSISTANT.to_string()
        } else {
            triple_system_prompt(context)
        };
        vec![ChatMessage::system(system), ChatMessage::user(question)]
    }

    pub async fn answer(&self, question: &str) -> Result<String> {
        let context = self.retriever.get_context(question).await?;
        info!(
            has_context = !context.trim().is_empty(),
            "Answering question"
        );
        debug!(context = %context, "Retrieved context");

        self.llm.chat(&Self::messages(question, &context)).await
    }
}
