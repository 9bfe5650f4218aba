//! Transcript ingestion into the graph store
//!
//! Author: hephaex@gmail.com

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tkg_core::{LlmClient, Result, Speakers, TkgError, Triple};
use tkg_extractor::{BasicTripleExtractor, LlmTripleConfig, LlmTripleExtractor, TripleExtractor};
use tkg_graph::GraphStore;
use tracing::{info, warn};

/// Outcome of one ingestion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub context_id: String,
    pub extracted: usize,
    pub stored: usize,
    pub failed: usize,
}

/// Extracts triples from transcripts and stores them under a context id
pub struct KnowledgeGraphPipeline {
    store: Arc<dyn GraphStore>,
    extractor: Arc<dyn TripleExtractor>,
    llm: Option<Arc<dyn LlmClient>>,
    llm_extractor: LlmTripleExtractor,
}

impl KnowledgeGraphPipeline {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            extractor: Arc::new(BasicTripleExtractor::default()),
            llm: None,
            llm_extractor: LlmTripleExtractor::new(),
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn TripleExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>, config: LlmTripleConfig) -> Self {
        self.llm = Some(llm);
        self.llm_extractor = LlmTripleExtractor::with_config(config);
        self
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    /// Rule-based ingestion. Extraction errors abort; store errors are
    /// counted.
    pub async fn ingest_transcript(
        &self,
        text: &str,
        interviewer: &str,
        interviewee: &str,
        context_id: &str,
    ) -> Result<IngestReport> {
        let speakers = Speakers::new(interviewer, interviewee);
        let triples = self.extractor.extract(text, &speakers)?;
        Ok(self.store_all(&triples, context_id).await)
    }

    /// LLM-based ingestion over sentence chunks
    pub async fn ingest_with_llm(&self, text: &str, context_id: &str) -> Result<IngestReport> {
        let llm = self
            .llm
            .as_ref()
            .ok_or_else(|| TkgError::Config("No LLM client configured".to_string()))?;

        let triples = self.llm_extractor.extract(llm.as_ref(), text).await?;
        Ok(self.store_all(&triples, context_id).await)
    }

    pub async fn remove_context(&self, context_id: &str) -> Result<usize> {
        self.store.remove_context(context_id).await
    }

    async fn store_all(&self, triples: &[Triple], context_id: &str) -> IngestReport {
        let mut report = IngestReport {
            context_id: context_id.to_string(),
            extracted: triples.len(),
            ..IngestReport::default()
        };

        for triple in triples {
            match self.store.store_triple(triple, context_id).await {
                Ok(()) => report.stored += 1,
                Err(e) => {
                    warn!(triple = %triple, error = %e, "Failed to store triple");
                    report.failed += 1;
                }
            }
        }

        info!(
            context_id = %context_id,
            extracted = report.extracted,
            stored = report.stored,
            failed = report.failed,
            "Ingestion complete"
        );
        report
    }
}
