//! In-memory graph store
//!
//! A petgraph `StableDiGraph` behind an async lock. Node and edge indices
//! stay valid across removals, so the name index never needs rebuilding.
//!
//! Author: hephaex@gmail.com

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;
use tkg_core::{Result, Triple};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::{slugify_relation, GraphStore};

/// Edge payload
#[derive(Debug, Clone)]
pub struct EdgeRecord {
    pub id: Uuid,
    /// Predicate as first stored
    pub predicate: String,
    /// Slugified predicate; part of the merge key
    pub relation: String,
    pub context_id: String,
    pub created_at: DateTime<Utc>,
    seq: u64,
}

#[derive(Debug, Default)]
struct Inner {
    graph: StableDiGraph<String, EdgeRecord>,
    nodes: HashMap<String, NodeIndex>,
    next_seq: u64,
}

impl Inner {
    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.nodes.insert(name.to_string(), idx);
        idx
    }

    fn find_edge(&self, from: NodeIndex, to: NodeIndex, relation: &str) -> Option<EdgeIndex> {
        self.graph
            .edges_directed(from, Direction::Outgoing)
            .find(|e| e.target() == to && e.weight().relation == relation)
            .map(|e| e.id())
    }

    fn name(&self, idx: NodeIndex) -> &str {
        self.graph.node_weight(idx).map(String::as_str).unwrap_or_default()
    }
}

/// Graph store kept entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    inner: RwLock<Inner>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-loaded with triples
    pub async fn from_triples(triples: &[Triple], context_id: &str) -> Result<Self> {
        let store = Self::new();
        store.store_triples(triples, context_id).await?;
        Ok(store)
    }

    pub async fn node_count(&self) -> usize {
        self.inner.read().await.graph.node_count()
    }

    /// Every stored edge with its context id, in insertion order
    pub async fn triples(&self) -> Vec<(Triple, String)> {
        let inner = self.inner.read().await;
        let mut edges: Vec<_> = inner.graph.edge_references().collect();
        edges.sort_by_key(|e| e.weight().seq);

        edges
            .into_iter()
            .map(|e| {
                let triple = Triple::new(
                    inner.name(e.source()),
                    &e.weight().predicate,
                    inner.name(e.target()),
                );
                (triple, e.weight().context_id.clone())
            })
            .collect()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn store_triple(&self, triple: &Triple, context_id: &str) -> Result<()> {
        let relation = slugify_relation(&triple.predicate);
        let mut inner = self.inner.write().await;

        let from = inner.node(&triple.subject);
        let to = inner.node(&triple.object);

        if let Some(edge) = inner.find_edge(from, to, &relation) {
            if let Some(record) = inner.graph.edge_weight_mut(edge) {
                record.context_id = context_id.to_string();
            }
            debug!(relation = %relation, "Merged existing edge");
            return Ok(());
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.graph.add_edge(
            from,
            to,
            EdgeRecord {
                id: Uuid::new_v4(),
                predicate: triple.predicate.clone(),
                relation,
                context_id: context_id.to_string(),
                created_at: Utc::now(),
                seq,
            },
        );
        Ok(())
    }

    async fn search_by_entity(&self, entity: &str) -> Result<Vec<Triple>> {
        let inner = self.inner.read().await;
        let Some(&idx) = inner.nodes.get(entity) else {
            return Ok(Vec::new());
        };

        let mut edges: Vec<_> = inner.graph.edges_directed(idx, Direction::Outgoing).collect();
        edges.sort_by_key(|e| e.weight().seq);

        Ok(edges
            .into_iter()
            .map(|e| Triple::new(entity, &e.weight().predicate, inner.name(e.target())))
            .collect())
    }

    async fn remove_context(&self, context_id: &str) -> Result<usize> {
        let mut inner = self.inner.write().await;

        let doomed: Vec<EdgeIndex> = inner
            .graph
            .edge_references()
            .filter(|e| e.weight().context_id == context_id)
            .map(|e| e.id())
            .collect();
        for edge in &doomed {
            inner.graph.remove_edge(*edge);
        }

        let orphans: Vec<NodeIndex> = inner
            .graph
            .node_indices()
            .filter(|&n| inner.graph.neighbors_undirected(n).next().is_none())
            .collect();
        for node in orphans {
            if let Some(name) = inner.graph.remove_node(node) {
                inner.nodes.remove(&name);
            }
        }

        debug!(context_id = %context_id, removed = doomed.len(), "Removed context");
        Ok(doomed.len())
    }

    async fn clear(&self) -> Result<()> {
        *self.inner.write().await = Inner::default();
        Ok(())
    }

    async fn triple_count(&self) -> Result<usize> {
        Ok(self.inner.read().await.graph.edge_count())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(s, p, o)
    }

    #[tokio::test]
    async fn test_store_and_search() {
        let store = MemoryGraphStore::new();
        store.store_triple(&t("John", "answered", "Q1"), "c1").await.unwrap();
        store.store_triple(&t("John", "answered", "Q2"), "c1").await.unwrap();
        store.store_triple(&t("Q1", "hasResponse", "R1"), "c1").await.unwrap();

        let found = store.search_by_entity("John").await.unwrap();
        assert_eq!(found, vec![t("John", "answered", "Q1"), t("John", "answered", "Q2")]);
        assert!(store.search_by_entity("john").await.unwrap().is_empty());
        assert_eq!(store.node_count().await, 4);
    }

    #[tokio::test]
    async fn test_edges_merge_on_relation_type() {
        let store = MemoryGraphStore::new();
        store.store_triple(&t("Jae", "likes to cook", "steak"), "c1").await.unwrap();
        store.store_triple(&t("Jae", "Likes  to-cook", "steak"), "c2").await.unwrap();
        store.store_triple(&t("Jae", "eats", "steak"), "c1").await.unwrap();

        assert_eq!(store.triple_count().await.unwrap(), 2);
        let all = store.triples().await;
        assert_eq!(all[0], (t("Jae", "likes to cook", "steak"), "c2".to_string()));
    }

    #[tokio::test]
    async fn test_remove_context_drops_orphans() {
        let store = MemoryGraphStore::new();
        store.store_triple(&t("John", "answered", "Q1"), "c1").await.unwrap();
        store.store_triple(&t("John", "answered", "Q2"), "c2").await.unwrap();

        let removed = store.remove_context("c1").await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.node_count().await, 2);
        assert!(store.search_by_entity("Q1").await.unwrap().is_empty());
        assert_eq!(store.search_by_entity("John").await.unwrap().len(), 1);

        assert_eq!(store.remove_context("missing").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_node_reused_after_removal() {
        let store = MemoryGraphStore::new();
        store.store_triple(&t("a", "r", "b"), "c1").await.unwrap();
        store.remove_context("c1").await.unwrap();
        store.store_triple(&t("a", "r", "b"), "c2").await.unwrap();

        assert_eq!(store.search_by_entity("a").await.unwrap(), vec![t("a", "r", "b")]);
        assert_eq!(store.node_count().await, 2);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = MemoryGraphStore::from_triples(&[t("a", "r", "b")], "c1")
            .await
            .unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.triple_count().await.unwrap(), 0);
        assert_eq!(store.node_count().await, 0);
    }

    #[tokio::test]
    async fn test_self_loop() {
        let store = MemoryGraphStore::new();
        store.store_triple(&t("a", "is", "a"), "c1").await.unwrap();
        assert_eq!(store.search_by_entity("a").await.unwrap(), vec![t("a", "is", "a")]);
        assert_eq!(store.remove_context("c1").await.unwrap(), 1);
        assert_eq!(store.node_count().await, 0);
    }
}
