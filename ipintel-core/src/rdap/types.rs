use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::vcard;

/// Upstream RDAP IP network object (RFC 9083 §5.4), limited to the members the
/// normalizer reads. Collections are optional so that an explicit `null`
/// decodes the same as an absent member.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RdapResponse {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    #[serde(rename = "type")]
    pub network_type: Option<String>,

    #[serde(default)]
    pub handle: Option<String>,

    #[serde(default)]
    pub start_address: Option<String>,

    #[serde(default)]
    pub end_address: Option<String>,

    #[serde(default)]
    pub entities: Option<Vec<RdapEntity>>,

    #[serde(default)]
    pub remarks: Option<Vec<RdapRemark>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RdapEntity {
    #[serde(default)]
    pub handle: Option<String>,

    #[serde(default)]
    pub roles: Option<Vec<String>>,

    #[serde(default)]
    pub vcard_array: Option<serde_json::Value>,
}

impl RdapEntity {
    /// Display name: the vCard `fn` property, falling back to the handle.
    pub fn get_name(&self) -> Option<String> {
        self.vcard_array
            .as_ref()
            .and_then(vcard::formatted_name)
            .or_else(|| self.handle.clone().filter(|h| !h.is_empty()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RdapRemark {
    #[serde(default)]
    pub title: Option<String>,

    /// Usually an array of lines, but some registries send a bare string.
    #[serde(default)]
    pub description: Option<serde_json::Value>,
}

impl RdapRemark {
    fn lines(&self) -> Vec<String> {
        match &self.description {
            Some(serde_json::Value::String(line)) => vec![line.clone()],
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(String::from))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// A party registered against the network block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub handle: Option<String>,
}

impl Entity {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

impl From<RdapEntity> for Entity {
    fn from(entity: RdapEntity) -> Self {
        let name = entity.get_name();
        Self {
            name,
            roles: entity.roles.unwrap_or_default(),
            handle: entity.handle,
        }
    }
}

/// Normalized registry view of one IP network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryRecord {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub network_type: Option<String>,
    pub handle: Option<String>,
    pub start_address: Option<String>,
    pub end_address: Option<String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub remarks: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl RegistryRecord {
    pub fn from_response(response: RdapResponse, fetched_at: DateTime<Utc>) -> Self {
        let entities = response
            .entities
            .unwrap_or_default()
            .into_iter()
            .map(Entity::from)
            .collect();

        let remarks = response
            .remarks
            .unwrap_or_default()
            .iter()
            .flat_map(RdapRemark::lines)
            .collect();

        Self {
            name: response.name,
            network_type: response.network_type,
            handle: response.handle,
            start_address: response.start_address,
            end_address: response.end_address,
            entities,
            remarks,
            timestamp: fetched_at,
        }
    }

    /// First entity, in registry order, carrying the given role.
    pub fn entity_with_role(&self, role: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.has_role(role))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryErrorKind {
    /// The registry answered, but not with a usable record.
    LookupFailed,
    /// The registry could not be reached in time.
    TransportFailure,
}

impl std::fmt::Display for RegistryErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryErrorKind::LookupFailed => write!(f, "RDAP lookup failed"),
            RegistryErrorKind::TransportFailure => write!(f, "RDAP transport failure"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct RegistryError {
    #[serde(rename = "error")]
    pub kind: RegistryErrorKind,
    pub message: String,
}

impl RegistryError {
    pub fn lookup_failed(message: impl Into<String>) -> Self {
        Self {
            kind: RegistryErrorKind::LookupFailed,
            message: message.into(),
        }
    }

    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self {
            kind: RegistryErrorKind::TransportFailure,
            message: message.into(),
        }
    }
}

/// Registry half of an intelligence record: the normalized record, or the
/// reason it could not be fetched.
///
/// `Failed` is listed first so untagged decoding tries the shape with
/// required members before the all-optional record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegistryOutcome {
    Failed(RegistryError),
    Record(RegistryRecord),
}

impl RegistryOutcome {
    pub fn record(&self) -> Option<&RegistryRecord> {
        match self {
            RegistryOutcome::Record(record) => Some(record),
            RegistryOutcome::Failed(_) => None,
        }
    }
}

impl From<std::result::Result<RegistryRecord, RegistryError>> for RegistryOutcome {
    fn from(result: std::result::Result<RegistryRecord, RegistryError>) -> Self {
        match result {
            Ok(record) => RegistryOutcome::Record(record),
            Err(err) => RegistryOutcome::Failed(err),
        }
    }
}
