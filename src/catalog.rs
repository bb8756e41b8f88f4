//! The block catalog: an ordered, append-only registry of kinds.
//!
//! Kinds are registered once at startup and the set is immutable
//! afterwards; iteration preserves registration order because clients
//! rely on a stable listing.

use std::collections::HashMap;

use serde::Serialize;

use crate::block::Block;

/// Serializable summary of a registered kind, for catalog listings.
#[derive(Clone, Debug, Serialize)]
pub struct CatalogEntry {
    /// Stable kind identifier.
    pub kind: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Suggested read ratio, if the kind declares one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_read_ratio: Option<f64>,
}

/// An ordered registry of block kinds.
#[derive(Default)]
pub struct Catalog {
    blocks: Vec<Box<dyn Block>>,
    by_kind: HashMap<&'static str, usize>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog with every built-in kind registered, in the
    /// order clients expect to see them listed.
    pub fn builtin() -> Self {
        use crate::blocks;

        let mut catalog = Self::new();
        catalog.register(Box::new(blocks::User));
        catalog.register(Box::new(blocks::LoadBalancer));
        catalog.register(Box::new(blocks::ApiGateway));
        catalog.register(Box::new(blocks::Cdn));
        catalog.register(Box::new(blocks::Service));
        catalog.register(Box::new(blocks::Worker));
        catalog.register(Box::new(blocks::Analytics));
        catalog.register(Box::new(blocks::Redis));
        catalog.register(Box::new(blocks::SqlDatastore));
        catalog.register(Box::new(blocks::Kafka));
        catalog.register(Box::new(blocks::Elasticsearch));
        catalog.register(Box::new(blocks::DocStore));
        catalog.register(Box::new(blocks::KvStore));
        catalog.register(Box::new(blocks::S3));
        catalog
    }

    /// Appends a kind. Registering the same kind twice keeps the first
    /// entry authoritative for lookups.
    pub fn register(&mut self, block: Box<dyn Block>) {
        let kind = block.kind();
        let index = self.blocks.len();
        self.blocks.push(block);
        self.by_kind.entry(kind).or_insert(index);
    }

    /// Iterates over all kinds in registration order.
    pub fn all(&self) -> impl Iterator<Item = &dyn Block> {
        self.blocks.iter().map(AsRef::as_ref)
    }

    /// Looks up a kind by identifier.
    pub fn by_kind(&self, kind: &str) -> Option<&dyn Block> {
        self.by_kind.get(kind).map(|&i| self.blocks[i].as_ref())
    }

    /// Returns the number of registered kinds.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if no kinds are registered.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Serializable summaries for the catalog listing surface.
    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.blocks
            .iter()
            .map(|b| CatalogEntry {
                kind: b.kind(),
                name: b.display_name(),
                default_read_ratio: b.profile().default_read_ratio,
            })
            .collect()
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("kinds", &self.blocks.iter().map(|b| b.kind()).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registration_order() {
        let catalog = Catalog::builtin();
        let kinds: Vec<_> = catalog.all().map(|b| b.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                "user",
                "load_balancer",
                "api_gateway",
                "cdn",
                "service",
                "worker",
                "analytics",
                "redis",
                "sql_datastore",
                "kafka",
                "elasticsearch",
                "docstore",
                "kv_store",
                "s3",
            ]
        );
    }

    #[test]
    fn test_by_kind_lookup() {
        let catalog = Catalog::builtin();
        let sql = catalog.by_kind("sql_datastore").unwrap();
        assert_eq!(sql.display_name(), "SQL Datastore");
        assert!(catalog.by_kind("mainframe").is_none());
    }

    #[test]
    fn test_entries_carry_default_read_ratio() {
        let catalog = Catalog::builtin();
        let entries = catalog.entries();
        assert_eq!(entries.len(), catalog.len());

        let sql = entries.iter().find(|e| e.kind == "sql_datastore").unwrap();
        assert_eq!(sql.default_read_ratio, Some(0.7));

        let redis = entries.iter().find(|e| e.kind == "redis").unwrap();
        assert!(redis.default_read_ratio.is_none());
    }
}
