mod client;
mod types;
pub mod vcard;

pub use client::{RdapClient, RegistryLookup, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use types::{
    Entity, RdapEntity, RdapRemark, RdapResponse, RegistryError, RegistryErrorKind,
    RegistryOutcome, RegistryRecord,
};
