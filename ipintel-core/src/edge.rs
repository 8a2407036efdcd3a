use serde::{Deserialize, Serialize};

/// Network-path metadata known at the edge before any registry lookup.
///
/// Supplied per request by an edge context provider and only read by the
/// core. Every field is optional; absent ones serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeContext {
    pub ip: Option<String>,
    pub asn: Option<u32>,
    /// Organization operating the autonomous system.
    #[serde(rename = "isp")]
    pub organization: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    /// Point of presence that received the request.
    #[serde(rename = "colo")]
    pub point_of_presence: Option<String>,
    pub timezone: Option<String>,
}

impl EdgeContext {
    pub fn for_ip(ip: impl Into<String>) -> Self {
        Self {
            ip: Some(ip.into()),
            ..Self::default()
        }
    }

    /// Requester IP, treating an empty string as unknown.
    pub fn client_ip(&self) -> Option<&str> {
        self.ip.as_deref().filter(|ip| !ip.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_field_names() {
        let edge = EdgeContext {
            ip: Some("192.0.2.10".into()),
            asn: Some(64496),
            organization: Some("Example Net".into()),
            country: Some("NL".into()),
            city: Some("Amsterdam".into()),
            region: Some("North Holland".into()),
            point_of_presence: Some("AMS".into()),
            timezone: Some("Europe/Amsterdam".into()),
        };
        let value = serde_json::to_value(&edge).unwrap();

        assert_eq!(value["isp"], "Example Net");
        assert_eq!(value["colo"], "AMS");
        assert_eq!(value["asn"], 64496);
    }

    #[test]
    fn test_absent_fields_render_null() {
        let value = serde_json::to_value(EdgeContext::for_ip("192.0.2.10")).unwrap();
        assert_eq!(value["ip"], "192.0.2.10");
        assert!(value["isp"].is_null());
        assert!(value["timezone"].is_null());
    }

    #[test]
    fn test_empty_ip_is_unknown() {
        assert_eq!(EdgeContext::for_ip("").client_ip(), None);
        assert_eq!(EdgeContext::default().client_ip(), None);
        assert_eq!(EdgeContext::for_ip("::1").client_ip(), Some("::1"));
    }
}
