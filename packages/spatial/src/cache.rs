//! Session-lifetime catalog cache.
//!
//! Boundary documents are large and change rarely, so each kind is
//! fetched at most once per session. Switching datasets does not
//! invalidate the cache; [`CatalogCache::invalidate`] and
//! [`CatalogCache::clear`] do.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use energy_map_geography_models::RegionKind;

use crate::SpatialError;
use crate::catalog::RegionCatalog;

/// Loaded catalogs keyed by region kind.
#[derive(Debug, Default)]
pub struct CatalogCache {
    catalogs: BTreeMap<RegionKind, Arc<RegionCatalog>>,
}

impl CatalogCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached catalog for `kind`, if loaded.
    #[must_use]
    pub fn get(&self, kind: RegionKind) -> Option<Arc<RegionCatalog>> {
        self.catalogs.get(&kind).cloned()
    }

    /// Stores a catalog under its own kind, replacing any previous one.
    pub fn insert(&mut self, catalog: RegionCatalog) -> Arc<RegionCatalog> {
        let catalog = Arc::new(catalog);
        self.catalogs.insert(catalog.kind(), Arc::clone(&catalog));
        catalog
    }

    /// Returns the cached catalog for `kind`, calling `fetch` only on a
    /// miss. A failed fetch leaves the cache unchanged.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `fetch`.
    pub async fn load_with<F, Fut>(
        &mut self,
        kind: RegionKind,
        fetch: F,
    ) -> Result<Arc<RegionCatalog>, SpatialError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<RegionCatalog, SpatialError>>,
    {
        if let Some(catalog) = self.get(kind) {
            log::debug!("Using cached {kind} catalog");
            return Ok(catalog);
        }

        let catalog = fetch().await?;
        if catalog.kind() != kind {
            log::warn!(
                "Requested {kind} boundaries but the document holds {}",
                catalog.kind()
            );
        }
        let catalog = Arc::new(catalog);
        self.catalogs.insert(kind, Arc::clone(&catalog));
        Ok(catalog)
    }

    /// Drops the cached catalog for `kind`. Returns whether one was cached.
    pub fn invalidate(&mut self, kind: RegionKind) -> bool {
        self.catalogs.remove(&kind).is_some()
    }

    /// Drops every cached catalog.
    pub fn clear(&mut self) {
        self.catalogs.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn empty(kind: RegionKind) -> RegionCatalog {
        RegionCatalog::new(kind, Vec::new())
    }

    fn counted(
        fetches: &Cell<usize>,
        kind: RegionKind,
    ) -> impl Future<Output = Result<RegionCatalog, SpatialError>> {
        fetches.set(fetches.get() + 1);
        async move { Ok(empty(kind)) }
    }

    #[tokio::test]
    async fn fetches_once_per_kind() {
        let fetches = Cell::new(0);
        let mut cache = CatalogCache::new();

        for _ in 0..3 {
            let catalog = cache
                .load_with(RegionKind::State, || counted(&fetches, RegionKind::State))
                .await
                .unwrap();
            assert_eq!(catalog.kind(), RegionKind::State);
        }
        assert_eq!(fetches.get(), 1);

        cache
            .load_with(RegionKind::ControlArea, || {
                counted(&fetches, RegionKind::ControlArea)
            })
            .await
            .unwrap();
        assert_eq!(fetches.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let mut cache = CatalogCache::new();
        let result = cache
            .load_with(RegionKind::State, || async {
                Err(SpatialError::InvalidCollection {
                    message: "offline".to_string(),
                })
            })
            .await;
        assert!(result.is_err());
        assert!(cache.get(RegionKind::State).is_none());
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let fetches = Cell::new(0);
        let mut cache = CatalogCache::new();
        cache.insert(empty(RegionKind::ControlArea));

        assert!(cache.invalidate(RegionKind::ControlArea));
        assert!(!cache.invalidate(RegionKind::ControlArea));

        cache
            .load_with(RegionKind::ControlArea, || {
                counted(&fetches, RegionKind::ControlArea)
            })
            .await
            .unwrap();
        assert_eq!(fetches.get(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
