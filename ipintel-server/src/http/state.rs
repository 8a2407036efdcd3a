use std::sync::Arc;

use ipintel_core::{CacheStore, Enricher, Invalidator, RegistryLookup};

use super::edge::EdgeContextProvider;

/// Shared application state, passed to handlers via `State(Arc<AppState>)`.
///
/// The cache store is built once per process and shared by the enrichment
/// and invalidation paths.
pub struct AppState {
    pub enricher: Enricher,
    pub invalidator: Invalidator,
    pub edge_provider: Arc<dyn EdgeContextProvider>,
}

impl AppState {
    pub fn new(
        registry: Arc<dyn RegistryLookup>,
        cache: Arc<dyn CacheStore>,
        edge_provider: Arc<dyn EdgeContextProvider>,
    ) -> Self {
        Self {
            enricher: Enricher::new(registry, Arc::clone(&cache)),
            invalidator: Invalidator::new(cache),
            edge_provider,
        }
    }
}
