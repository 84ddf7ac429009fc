//! Bidirectional id <-> resource catalog

use std::collections::HashMap;
use std::hash::Hash;

/// One configured catalog entry, possibly malformed
#[derive(Debug, Clone)]
pub struct CatalogEntry<R> {
    pub id: Option<String>,
    pub resource: Option<R>,
}

impl<R> CatalogEntry<R> {
    pub fn new(id: impl Into<String>, resource: R) -> Self {
        Self {
            id: Some(id.into()),
            resource: Some(resource),
        }
    }
}

/// Read-only lookup table between stable ids and resources
#[derive(Debug)]
pub struct Catalog<R> {
    /// Label used in log messages ("material", "prefab")
    kind: &'static str,
    /// Ids in registration order
    order: Vec<String>,
    by_id: HashMap<String, R>,
    /// Reverse index, first registered id wins
    by_resource: HashMap<R, String>,
}

impl<R> Default for Catalog<R> {
    fn default() -> Self {
        Self {
            kind: "resource",
            order: Vec::new(),
            by_id: HashMap::new(),
            by_resource: HashMap::new(),
        }
    }
}

impl<R: Clone + Eq + Hash> Catalog<R> {
    /// Build a catalog from configured entries.
    ///
    /// Entries missing an id or a resource are skipped with a warning, as are
    /// repeated ids (the first registration is kept).
    pub fn build(kind: &'static str, entries: impl IntoIterator<Item = CatalogEntry<R>>) -> Self {
        let mut catalog = Self {
            kind,
            ..Self::default()
        };

        for (index, entry) in entries.into_iter().enumerate() {
            let id = match entry.id.map(|s| s.trim().to_string()) {
                Some(id) if !id.is_empty() => id,
                _ => {
                    tracing::warn!("{} catalog entry #{} has no id, skipping", kind, index);
                    continue;
                }
            };
            let Some(resource) = entry.resource else {
                tracing::warn!("{} catalog entry '{}' has no resource, skipping", kind, id);
                continue;
            };
            if catalog.by_id.contains_key(&id) {
                tracing::warn!("{} catalog id '{}' registered twice, keeping the first", kind, id);
                continue;
            }

            catalog
                .by_resource
                .entry(resource.clone())
                .or_insert_with(|| id.clone());
            catalog.by_id.insert(id.clone(), resource);
            catalog.order.push(id);
        }

        tracing::debug!("{} catalog built with {} entries", kind, catalog.len());
        catalog
    }

    /// Get a resource by id
    pub fn get_by_id(&self, id: &str) -> Option<&R> {
        self.by_id.get(id)
    }

    /// Reverse lookup: the id a resource was first registered under
    pub fn get_id(&self, resource: &R) -> Option<&str> {
        self.by_resource.get(resource).map(|s| s.as_str())
    }

    /// All ids in registration order
    pub fn all_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
