use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::cache::{cache_key, CacheStore, RECORD_TTL};
use crate::edge::EdgeContext;
use crate::rdap::{RegistryLookup, RegistryOutcome};

/// Edge context merged with registry data; the unit that gets cached.
///
/// Never patched after creation. A refresh produces a new record that
/// replaces the cached one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntelligenceRecord {
    #[serde(flatten)]
    pub edge: EdgeContext,
    pub rdap: RegistryOutcome,
    pub abuse_contact: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl IntelligenceRecord {
    pub fn new(edge: EdgeContext, rdap: RegistryOutcome, timestamp: DateTime<Utc>) -> Self {
        let abuse_contact = abuse_contact(&rdap);
        Self {
            edge,
            rdap,
            abuse_contact,
            timestamp,
        }
    }
}

/// Name of the first entity holding the `abuse` role.
///
/// `None` when the lookup failed, no entity has the role, or the matching
/// entity has neither a vCard name nor a handle.
pub fn abuse_contact(rdap: &RegistryOutcome) -> Option<String> {
    rdap.record()?.entity_with_role("abuse")?.name.clone()
}

/// Resolves intelligence records, consulting the cache before the registry.
///
/// Concurrent misses for the same IP are not coalesced: each one queries the
/// registry and the last write wins.
#[derive(Clone)]
pub struct Enricher {
    registry: Arc<dyn RegistryLookup>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl Enricher {
    pub fn new(registry: Arc<dyn RegistryLookup>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            registry,
            cache,
            ttl: RECORD_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Returns the record for `ip`, merged with `edge` when freshly built.
    ///
    /// With `bypass_cache` the cache is neither read nor written. Registry
    /// and cache failures degrade the record instead of failing the call.
    #[instrument(skip(self, edge), fields(ip = %ip))]
    pub async fn enrich(
        &self,
        ip: &str,
        edge: &EdgeContext,
        bypass_cache: bool,
    ) -> IntelligenceRecord {
        let key = cache_key(ip);

        if !bypass_cache {
            if let Some(record) = self.cached(&key).await {
                debug!("Serving cached record");
                return record;
            }
        }

        let rdap = RegistryOutcome::from(self.registry.lookup(ip).await);
        if let RegistryOutcome::Failed(err) = &rdap {
            warn!(error = %err, "Registry lookup failed, embedding error in record");
        }

        let record = IntelligenceRecord::new(edge.clone(), rdap, Utc::now());

        if !bypass_cache {
            self.store(&key, &record).await;
        }

        record
    }

    async fn cached(&self, key: &str) -> Option<IntelligenceRecord> {
        let raw = match self.cache.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "Cache miss");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    async fn store(&self, key: &str, record: &IntelligenceRecord) {
        let value = match serde_json::to_string(record) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Record serialization failed, not caching");
                return;
            }
        };

        if let Err(e) = self.cache.put(key, value, self.ttl).await {
            warn!(key, error = %e, "Cache write failed");
        }
    }
}
