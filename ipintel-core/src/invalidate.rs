use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::cache::{cache_key, CacheStore};
use crate::error::{IntelError, Result};

/// Parsed body of an invalidation request: `{"ip": "<optional>"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationRequest {
    pub ip: Option<String>,
}

impl InvalidationRequest {
    /// Parses a request body.
    ///
    /// The body must be a JSON object. `ip` may be absent, `null`, empty, or
    /// a string; any other type is rejected. Unknown members are ignored.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| IntelError::MalformedInvalidationRequest(e.to_string()))?;

        let Value::Object(fields) = value else {
            return Err(IntelError::MalformedInvalidationRequest(
                "expected a JSON object".to_string(),
            ));
        };

        let ip = match fields.get("ip") {
            None | Some(Value::Null) => None,
            Some(Value::String(ip)) if ip.is_empty() => None,
            Some(Value::String(ip)) => Some(ip.clone()),
            Some(other) => {
                return Err(IntelError::MalformedInvalidationRequest(format!(
                    "`ip` must be a string, got {}",
                    other
                )))
            }
        };

        Ok(Self { ip })
    }

    /// IP to invalidate: the named one, else the requester's own.
    pub fn target<'a>(&'a self, requester_ip: Option<&'a str>) -> Result<&'a str> {
        self.ip
            .as_deref()
            .or(requester_ip.filter(|ip| !ip.is_empty()))
            .ok_or(IntelError::MissingTargetIp)
    }
}

/// Acknowledgement of a completed invalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invalidation {
    pub ip: String,
    pub key: String,
}

/// Removes cached records one IP at a time. There is no bulk form.
#[derive(Clone)]
pub struct Invalidator {
    cache: Arc<dyn CacheStore>,
}

impl Invalidator {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self { cache }
    }

    /// Parses `body` and deletes the entry for its target IP.
    ///
    /// Nothing is deleted when the body is rejected.
    pub async fn invalidate(&self, body: &[u8], requester_ip: Option<&str>) -> Result<Invalidation> {
        let request = InvalidationRequest::from_slice(body)?;
        let ip = request.target(requester_ip)?;
        self.invalidate_ip(ip).await
    }

    pub async fn invalidate_ip(&self, ip: &str) -> Result<Invalidation> {
        let key = cache_key(ip);
        self.cache.delete(&key).await?;
        info!(ip, key = %key, "Cache entry invalidated");

        Ok(Invalidation {
            ip: ip.to_string(),
            key,
        })
    }
}
