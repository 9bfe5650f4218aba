//! SurrealDB implementation for graph storage
//!
//! Nodes live in the `entity` table with the entity name as record id;
//! edges are `relates` relation records carrying the original predicate,
//! its relation type and the context id.
//!
//! Author: hephaex@gmail.com

use async_trait::async_trait;
use serde::Deserialize;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tkg_core::{GraphConfig, Result, TkgError, Triple};
use tracing::debug;

use crate::{slugify_relation, GraphStore};

/// SurrealDB graph store implementation
pub struct SurrealDbStore {
    client: Surreal<Client>,
}

impl SurrealDbStore {
    /// Create a new SurrealDB connection
    pub async fn new(config: &GraphConfig) -> Result<Self> {
        // The ws engine adds the scheme itself
        let url = config
            .surrealdb_url
            .strip_prefix("ws://")
            .or_else(|| config.surrealdb_url.strip_prefix("wss://"))
            .unwrap_or(&config.surrealdb_url);

        let client = Surreal::new::<Ws>(url)
            .await
            .map_err(|e| graph_error("SurrealDB connection failed", e))?;

        client
            .signin(Root {
                username: &config.surrealdb_user,
                password: &config.surrealdb_pass,
            })
            .await
            .map_err(|e| graph_error("SurrealDB auth failed", e))?;

        client
            .use_ns(&config.surrealdb_namespace)
            .use_db(&config.surrealdb_database)
            .await
            .map_err(|e| graph_error("SurrealDB namespace error", e))?;

        Ok(Self { client })
    }

    /// Initialize schema (idempotent)
    pub async fn init_schema(&self) -> Result<()> {
        self.client
            .query(
                r#"
                DEFINE TABLE IF NOT EXISTS entity SCHEMALESS;
                DEFINE FIELD IF NOT EXISTS name ON entity TYPE string;
                DEFINE INDEX IF NOT EXISTS idx_entity_name ON entity FIELDS name;
                DEFINE TABLE IF NOT EXISTS relates TYPE RELATION SCHEMALESS;
                DEFINE INDEX IF NOT EXISTS idx_relates_context ON relates FIELDS context_id;
                DEFINE INDEX IF NOT EXISTS idx_relates_relation ON relates FIELDS relation;
            "#,
            )
            .await
            .and_then(|r| r.check())
            .map_err(|e| graph_error("Schema init failed", e))?;

        Ok(())
    }
}

fn graph_error(context: &str, err: surrealdb::Error) -> TkgError {
    TkgError::Graph(format!("{context}: {err}"))
}

/// Edge row returned by entity search
#[derive(Debug, Deserialize)]
struct TripleRecord {
    subject: String,
    predicate: String,
    object: String,
}

#[derive(Debug, Deserialize)]
struct CountRecord {
    count: usize,
}

#[async_trait]
impl GraphStore for SurrealDbStore {
    async fn store_triple(&self, triple: &Triple, context_id: &str) -> Result<()> {
        let relation = slugify_relation(&triple.predicate);

        // Merge nodes, then retag a matching edge if there is one
        let mut response = self
            .client
            .query(
                r#"
                LET $from = type::thing('entity', $subject);
                LET $to = type::thing('entity', $object);
                UPSERT $from SET name = $subject;
                UPSERT $to SET name = $object;
                UPDATE relates SET context_id = $context_id
                    WHERE in = $from AND out = $to AND relation = $relation
                    RETURN VALUE relation;
            "#,
            )
            .bind(("subject", triple.subject.clone()))
            .bind(("object", triple.object.clone()))
            .bind(("relation", relation.clone()))
            .bind(("context_id", context_id.to_string()))
            .await
            .map_err(|e| graph_error("Failed to store triple", e))?;

        let merged: Vec<String> = response
            .take(4)
            .map_err(|e| graph_error("Failed to store triple", e))?;
        if !merged.is_empty() {
            debug!(relation = %relation, "Merged existing edge");
            return Ok(());
        }

        self.client
            .query(
                r#"
                LET $from = type::thing('entity', $subject);
                LET $to = type::thing('entity', $object);
                RELATE $from->relates->$to SET
                    predicate = $predicate,
                    relation = $relation,
                    context_id = $context_id,
                    created_at = time::now();
            "#,
            )
            .bind(("subject", triple.subject.clone()))
            .bind(("object", triple.object.clone()))
            .bind(("predicate", triple.predicate.clone()))
            .bind(("relation", relation))
            .bind(("context_id", context_id.to_string()))
            .await
            .and_then(|r| r.check())
            .map_err(|e| graph_error("Failed to store triple", e))?;

        Ok(())
    }

    async fn search_by_entity(&self, entity: &str) -> Result<Vec<Triple>> {
        let records: Vec<TripleRecord> = self
            .client
            .query(
                "SELECT in.name AS subject, predicate, out.name AS object FROM relates \
                 WHERE in = type::thing('entity', $entity)",
            )
            .bind(("entity", entity.to_string()))
            .await
            .map_err(|e| graph_error("Query failed", e))?
            .take(0)
            .map_err(|e| graph_error("Result extraction failed", e))?;

        Ok(records
            .into_iter()
            .map(|r| Triple::new(r.subject, r.predicate, r.object))
            .collect())
    }

    async fn remove_context(&self, context_id: &str) -> Result<usize> {
        let mut response = self
            .client
            .query(
                r#"
                SELECT count() FROM relates WHERE context_id = $context_id GROUP ALL;
                DELETE relates WHERE context_id = $context_id;
                DELETE entity WHERE array::len(<-relates) = 0 AND array::len(->relates) = 0;
            "#,
            )
            .bind(("context_id", context_id.to_string()))
            .await
            .map_err(|e| graph_error("Failed to remove context", e))?;

        let removed: Vec<CountRecord> = response
            .take(0)
            .map_err(|e| graph_error("Failed to remove context", e))?;
        let removed = removed.first().map(|c| c.count).unwrap_or(0);

        debug!(context_id = %context_id, removed, "Removed context");
        Ok(removed)
    }

    async fn clear(&self) -> Result<()> {
        self.client
            .query("DELETE relates; DELETE entity;")
            .await
            .and_then(|r| r.check())
            .map_err(|e| graph_error("Failed to clear graph", e))?;
        Ok(())
    }

    async fn triple_count(&self) -> Result<usize> {
        let counts: Vec<CountRecord> = self
            .client
            .query("SELECT count() FROM relates GROUP ALL")
            .await
            .map_err(|e| graph_error("Query failed", e))?
            .take(0)
            .map_err(|e| graph_error("Result extraction failed", e))?;

        Ok(counts.first().map(|c| c.count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires a running SurrealDB instance"]
    async fn test_store_search_remove() {
        let store = SurrealDbStore::new(&GraphConfig::default()).await.unwrap();
        store.init_schema().await.unwrap();
        store.clear().await.unwrap();

        let triple = Triple::new("John", "answered", "How are you?");
        store.store_triple(&triple, "ctx-1").await.unwrap();
        store.store_triple(&triple, "ctx-2").await.unwrap();
        assert_eq!(store.triple_count().await.unwrap(), 1);
        assert_eq!(store.search_by_entity("John").await.unwrap(), vec![triple]);

        assert_eq!(store.remove_context("ctx-1").await.unwrap(), 0);
        assert_eq!(store.remove_context("ctx-2").await.unwrap(), 1);
        assert!(store.search_by_entity("John").await.unwrap().is_empty());
    }
}
