//! Graph context retrieval
//!
//! Turns a user question into a flat `"subject predicate object, "` context
//! string by looking up entities from the question in the graph store.
//!
//! Author: hephaex@gmail.com

use std::sync::Arc;

use async_trait::async_trait;
use tkg_core::{LlmClient, Result, RetrievalConfig, Speakers, Triple};
use tkg_extractor::{LexiconTagger, LlmTripleExtractor, RoleTable, SubjectExtractor, Tagger};
use tkg_graph::GraphStore;
use tracing::{debug, warn};

use crate::cache::{CacheConfig, SubjectCache};

/// Trait for context retrievers
#[async_trait]
pub trait ContextRetriever: Send + Sync {
    /// Context relevant to `query`; empty when nothing was found
    async fn get_context(&self, query: &str) -> Result<String>;
}

/// Render triples as `"s p o, "` fragments
pub fn format_context(triples: &[Triple]) -> String {
    triples.iter().map(|t| format!("{t}, ")).collect()
}

fn push_unique(into: &mut Vec<Triple>, found: Vec<Triple>, limit: usize) {
    for triple in found {
        if into.len() >= limit {
            return;
        }
        if !into.contains(&triple) {
            into.push(triple);
        }
    }
}

// ============================================================================
// Subject-based retrieval
// ============================================================================

/// Looks up the subject phrases of the query
pub struct TripleContextRetriever {
    store: Arc<dyn GraphStore>,
    tagger: Arc<dyn Tagger>,
    table: Arc<RoleTable>,
    speakers: Speakers,
    cache: SubjectCache,
    max_triples: usize,
}

impl TripleContextRetriever {
    pub fn new(store: Arc<dyn GraphStore>, speakers: Speakers) -> Self {
        Self::with_config(store, speakers, &RetrievalConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn GraphStore>,
        speakers: Speakers,
        config: &RetrievalConfig,
    ) -> Self {
        Self {
            store,
            tagger: Arc::new(LexiconTagger::new()),
            table: Arc::new(RoleTable::penn_treebank()),
            speakers,
            cache: SubjectCache::with_config(&CacheConfig {
                max_capacity: config.subject_cache_capacity,
                ..CacheConfig::default()
            }),
            max_triples: config.max_context_triples,
        }
    }

    /// Replace the tagger and role table
    pub fn with_tagger(mut self, tagger: Arc<dyn Tagger>, table: Arc<RoleTable>) -> Self {
        self.tagger = tagger;
        self.table = table;
        self
    }

    pub fn cache(&self) -> &SubjectCache {
        &self.cache
    }

    /// Subject phrases of a query, memoised
    pub async fn subjects(&self, query: &str) -> Result<Arc<Vec<String>>> {
        if let Some(cached) = self.cache.get(query).await {
            return Ok(cached);
        }

        let mut extractor = SubjectExtractor::new(
            Arc::clone(&self.tagger),
            Arc::clone(&self.table),
            self.speakers.clone(),
        );
        let subjects = extractor.get_subjects(Some(query))?;
        Ok(self.cache.put(query, subjects).await)
    }
}

#[async_trait]
impl ContextRetriever for TripleContextRetriever {
    async fn get_context(&self, query: &str) -> Result<String> {
        let subjects = match self.subjects(query).await {
            Ok(subjects) => subjects,
            Err(e) => {
                warn!(error = %e, "Could not classify query, using empty context");
                return Ok(String::new());
            }
        };

        let mut triples = Vec::new();
        for subject in subjects.iter() {
            let found = self.store.search_by_entity(subject).await?;
            push_unique(&mut triples, found, self.max_triples);
        }

        debug!(subjects = subjects.len(), triples = triples.len(), "Retrieved context");
        Ok(format_context(&triples))
    }
}

// ============================================================================
// LLM-based retrieval
// ============================================================================

/// Asks the model for triples in the query, then looks up both ends
pub struct LlmTripleContextRetriever {
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn GraphStore>,
    extractor: LlmTripleExtractor,
    max_triples: usize,
}

impl LlmTripleContextRetriever {
    pub fn new(llm: Arc<dyn LlmClient>, store: Arc<dyn GraphStore>) -> Self {
        Self {
            llm,
            store,
            extractor: LlmTripleExtractor::new(),
            max_triples: RetrievalConfig::default().max_context_triples,
        }
    }

    pub fn with_max_triples(mut self, max: usize) -> Self {
        self.max_triples = max;
        self
    }
}

#[async_trait]
impl ContextRetriever for LlmTripleContextRetriever {
    async fn get_context(&self, query: &str) -> Result<String> {
        let query_triples = self.extractor.extract(self.llm.as_ref(), query).await?;

        let mut triples = Vec::new();
        for triple in &query_triples {
            for entity in [&triple.subject, &triple.object] {
                let found = self.store.search_by_entity(entity).await?;
                push_unique(&mut triples, found, self.max_triples);
            }
        }

        debug!(
            query_triples = query_triples.len(),
            triples = triples.len(),
            "Retrieved context"
        );
        Ok(format_context(&triples))
    }
}
