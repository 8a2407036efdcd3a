pub mod cache;
pub mod edge;
pub mod enrich;
pub mod error;
pub mod invalidate;
pub mod output;
pub mod rdap;

pub use error::{IntelError, Result};

pub use cache::{cache_key, CacheStore, MemoryCacheStore, TtlCache, RECORD_TTL};
pub use edge::EdgeContext;
pub use enrich::{abuse_contact, Enricher, IntelligenceRecord};
pub use invalidate::{Invalidation, InvalidationRequest, Invalidator};
pub use output::{project, project_invalidation, Endpoint, Projection};
pub use rdap::{
    Entity, RdapClient, RegistryError, RegistryErrorKind, RegistryLookup, RegistryOutcome,
    RegistryRecord,
};
