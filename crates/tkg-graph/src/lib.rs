//! TKG Graph - Triple store abstraction
//!
//! Stores interview triples as a labelled property graph: one node per
//! distinct subject/object name, one edge per (subject, relation, object).
//! Every edge carries the id of the context (transcript) it came from so a
//! whole transcript can be removed at once.
//!
//! Author: hephaex@gmail.com

use std::sync::Arc;

use async_trait::async_trait;
use tkg_core::{GraphBackend, GraphConfig, Result, Triple};
use tracing::info;

pub mod memory;
pub mod surrealdb_store;

pub use memory::MemoryGraphStore;
pub use surrealdb_store::SurrealDbStore;

/// Trait for graph database operations
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Merge both endpoint nodes and the edge between them, tagging the edge
    /// with `context_id`
    async fn store_triple(&self, triple: &Triple, context_id: &str) -> Result<()>;

    /// Outgoing edges of the node named exactly `entity`
    async fn search_by_entity(&self, entity: &str) -> Result<Vec<Triple>>;

    /// Delete every edge tagged with `context_id`, then any node left
    /// without edges. Returns the number of edges removed.
    async fn remove_context(&self, context_id: &str) -> Result<usize>;

    /// Delete everything
    async fn clear(&self) -> Result<()>;

    /// Number of stored edges
    async fn triple_count(&self) -> Result<usize>;

    /// Store a batch, stopping at the first failure
    async fn store_triples(&self, triples: &[Triple], context_id: &str) -> Result<usize> {
        for triple in triples {
            self.store_triple(triple, context_id).await?;
        }
        Ok(triples.len())
    }
}

/// Relation type for a predicate: trimmed, lower-cased, runs of anything
/// outside `[a-z0-9]` collapsed to `_`, then upper-cased.
///
/// `"has Response"` becomes `HAS_RESPONSE`; `"answeredBy"` becomes
/// `ANSWEREDBY`.
pub fn slugify_relation(predicate: &str) -> String {
    let mut slug = String::with_capacity(predicate.len());
    let mut in_gap = false;

    for ch in predicate.trim().to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            slug.push(ch.to_ascii_uppercase());
            in_gap = false;
        } else if !in_gap {
            slug.push('_');
            in_gap = true;
        }
    }

    slug
}

/// Open the store selected by configuration
pub async fn connect(config: &GraphConfig) -> Result<Arc<dyn GraphStore>> {
    match config.backend {
        GraphBackend::Memory => {
            info!("Using in-memory graph store");
            Ok(Arc::new(MemoryGraphStore::new()))
        }
        GraphBackend::SurrealDb => {
            info!(url = %config.surrealdb_url, "Connecting to SurrealDB");
            let store = SurrealDbStore::new(config).await?;
            store.init_schema().await?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_relation() {
        assert_eq!(slugify_relation("answered"), "ANSWERED");
        assert_eq!(slugify_relation("hasResponse"), "HASRESPONSE");
        assert_eq!(slugify_relation("  likes to cook "), "LIKES_TO_COOK");
        assert_eq!(slugify_relation("is a -- part of"), "IS_A_PART_OF");
        assert_eq!(slugify_relation("won't"), "WON_T");
        assert_eq!(slugify_relation("step 2"), "STEP_2");
    }

    #[test]
    fn test_slugify_keeps_edge_gaps() {
        assert_eq!(slugify_relation("(is)"), "_IS_");
        assert_eq!(slugify_relation(""), "");
    }

    #[tokio::test]
    async fn test_connect_memory_backend() {
        let store = connect(&GraphConfig::default()).await.unwrap();
        store
            .store_triple(&Triple::new("a", "b", "c"), "ctx")
            .await
            .unwrap();
        assert_eq!(store.triple_count().await.unwrap(), 1);
    }
}
