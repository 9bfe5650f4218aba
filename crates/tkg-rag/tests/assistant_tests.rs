//! Ingest a transcript, then answer a question from the stored graph

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tkg_core::{ChatMessage, ChatRole, LlmClient, Result, Speakers};
use tkg_graph::{GraphStore, MemoryGraphStore};
use tkg_rag::{InterviewAssistant, KnowledgeGraphPipeline, TripleContextRetriever};

#[derive(Default)]
struct RecordingLlm {
    prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

#[async_trait]
impl LlmClient for RecordingLlm {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        Ok("He said he was fine.".to_string())
    }
}

#[tokio::test]
async fn test_ingest_then_answer() {
    let store = Arc::new(MemoryGraphStore::new());
    let report = KnowledgeGraphPipeline::new(store.clone())
        .ingest_transcript("How are you? I am fine.", "Josh", "John", "session-1")
        .await
        .unwrap();
    assert_eq!(report.stored, 4);

    let llm = Arc::new(RecordingLlm::default());
    let retriever = Arc::new(TripleContextRetriever::new(
        store.clone(),
        Speakers::new("Josh", "John"),
    ));
    let assistant = InterviewAssistant::new(llm.clone(), retriever);

    let answer = assistant.answer("John.").await.unwrap();
    assert_eq!(answer, "He said he was fine.");

    let prompts = llm.prompts.lock().unwrap();
    let system = &prompts[0][0];
    assert_eq!(system.role, ChatRole::System);
    assert!(system.content.contains("John answered How are you?,"));
}

#[tokio::test]
async fn test_removed_context_is_not_retrieved() {
    let store = Arc::new(MemoryGraphStore::new());
    let pipeline = KnowledgeGraphPipeline::new(store.clone());
    pipeline
        .ingest_transcript("How are you? I am fine.", "Josh", "John", "session-1")
        .await
        .unwrap();
    pipeline.remove_context("session-1").await.unwrap();
    assert_eq!(store.triple_count().await.unwrap(), 0);

    let llm = Arc::new(RecordingLlm::default());
    let retriever = Arc::new(TripleContextRetriever::new(store, Speakers::default()));
    InterviewAssistant::new(llm.clone(), retriever)
        .answer("John.")
        .await
        .unwrap();

    let prompts = llm.prompts.lock().unwrap();
    assert_eq!(
        prompts[0][0].content,
        "You are a helpful, highly concise assistant."
    );
}
