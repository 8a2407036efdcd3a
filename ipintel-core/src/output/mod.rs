//! Endpoint-specific views of edge context and intelligence records.

mod json;

use crate::cache::RECORD_TTL;
use crate::edge::EdgeContext;
use crate::enrich::IntelligenceRecord;
use crate::invalidate::Invalidation;

pub use json::to_pretty_json;

pub const TEXT_PLAIN: &str = "text/plain";
pub const APPLICATION_JSON: &str = "application/json";

/// Body for the ISP view when the edge knows no AS organization.
pub const UNKNOWN_ISP: &str = "Unknown ISP";

/// A view together with the data it is rendered from.
///
/// The plain-text views need only edge context; the full view needs the
/// merged record.
#[derive(Debug, Clone, Copy)]
pub enum Endpoint<'a> {
    /// Requester IP as plain text.
    Ip(&'a EdgeContext),
    /// AS organization as plain text.
    Isp(&'a EdgeContext),
    /// Full merged record as JSON.
    Full(&'a IntelligenceRecord),
}

/// A rendered response body with the headers it must be served with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub body: String,
    pub content_type: &'static str,
    pub cache_control: Option<String>,
    pub allow_any_origin: bool,
}

impl Projection {
    fn text(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: TEXT_PLAIN,
            cache_control: None,
            allow_any_origin: false,
        }
    }

    fn json(body: String) -> Self {
        Self {
            body,
            content_type: APPLICATION_JSON,
            cache_control: None,
            allow_any_origin: true,
        }
    }

    fn publicly_cacheable(mut self) -> Self {
        self.cache_control = Some(public_cache_control());
        self
    }

    /// Header pairs to attach, content type first.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![("content-type", self.content_type.to_string())];
        if let Some(cache_control) = &self.cache_control {
            headers.push(("cache-control", cache_control.clone()));
        }
        if self.allow_any_origin {
            headers.push(("access-control-allow-origin", "*".to_string()));
        }
        headers
    }
}

/// `cache-control` value matching the record TTL.
pub fn public_cache_control() -> String {
    format!("public, max-age={}", RECORD_TTL.as_secs())
}

pub fn project(endpoint: Endpoint<'_>) -> Projection {
    let projection = match endpoint {
        Endpoint::Ip(edge) => Projection::text(edge.client_ip().unwrap_or_default()),
        Endpoint::Isp(edge) => Projection::text(
            edge.organization
                .as_deref()
                .filter(|isp| !isp.is_empty())
                .unwrap_or(UNKNOWN_ISP),
        ),
        Endpoint::Full(record) => Projection::json(to_pretty_json(record)),
    };
    projection.publicly_cacheable()
}

/// Plain-text acknowledgement for a completed invalidation. Never cached.
pub fn project_invalidation(invalidation: &Invalidation) -> Projection {
    Projection {
        cache_control: Some("no-store".to_string()),
        ..Projection::text(format!("Cache invalidated for IP: {}", invalidation.ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::rdap::{RegistryError, RegistryOutcome};

    fn edge() -> EdgeContext {
        EdgeContext {
            organization: Some("Example Net".into()),
            ..EdgeContext::for_ip("192.0.2.10")
        }
    }

    #[test]
    fn test_ip_view() {
        let projection = project(Endpoint::Ip(&edge()));
        assert_eq!(projection.body, "192.0.2.10");
        assert_eq!(projection.content_type, TEXT_PLAIN);
        assert!(!projection.allow_any_origin);

        let projection = project(Endpoint::Ip(&EdgeContext::default()));
        assert_eq!(projection.body, "");
    }

    #[test]
    fn test_isp_view_with_fallback() {
        assert_eq!(project(Endpoint::Isp(&edge())).body, "Example Net");

        let anonymous = EdgeContext::for_ip("192.0.2.10");
        assert_eq!(project(Endpoint::Isp(&anonymous)).body, UNKNOWN_ISP);
    }

    #[test]
    fn test_full_view_is_pretty_json_with_cors() {
        let record = IntelligenceRecord::new(
            edge(),
            RegistryOutcome::Failed(RegistryError::transport_failure("timed out")),
            Utc::now(),
        );
        let projection = project(Endpoint::Full(&record));

        assert_eq!(projection.content_type, APPLICATION_JSON);
        assert!(projection.allow_any_origin);
        assert!(projection.body.contains("\n  \"ip\": \"192.0.2.10\""));

        let value: serde_json::Value = serde_json::from_str(&projection.body).unwrap();
        assert_eq!(value["rdap"]["error"], "transport_failure");
        assert!(value["abuseContact"].is_null());
    }

    fn record() -> IntelligenceRecord {
        IntelligenceRecord::new(
            edge(),
            RegistryOutcome::Failed(RegistryError::lookup_failed("status 404")),
            Utc::now(),
        )
    }

    #[test]
    fn test_views_carry_public_cache_control() {
        let edge = edge();
        let record = record();
        for endpoint in [
            Endpoint::Ip(&edge),
            Endpoint::Isp(&edge),
            Endpoint::Full(&record),
        ] {
            let projection = project(endpoint);
            assert_eq!(
                projection.cache_control.as_deref(),
                Some("public, max-age=1209600")
            );
        }
    }

    #[test]
    fn test_headers() {
        let headers = project(Endpoint::Full(&record())).headers();
        assert_eq!(
            headers,
            vec![
                ("content-type", "application/json".to_string()),
                ("cache-control", "public, max-age=1209600".to_string()),
                ("access-control-allow-origin", "*".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalidation_ack() {
        let projection = project_invalidation(&Invalidation {
            ip: "198.51.100.7".into(),
            key: "ip-data:198.51.100.7".into(),
        });
        assert_eq!(projection.body, "Cache invalidated for IP: 198.51.100.7");
        assert_eq!(projection.content_type, TEXT_PLAIN);
        assert_eq!(projection.cache_control.as_deref(), Some("no-store"));
    }
}
