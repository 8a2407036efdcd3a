use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use tracing::{debug, instrument};

use super::types::{RdapResponse, RegistryError, RegistryRecord};
use crate::error::{IntelError, Result};

pub const DEFAULT_BASE_URL: &str = "https://rdap.org";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("ipintel/", env!("CARGO_PKG_VERSION"), " (RDAP Client)");

/// Source of registry ownership data for a single IP address.
///
/// Implementations report every failure as a [`RegistryError`] value; nothing
/// escapes as a panic or a transport-level error type.
#[async_trait]
pub trait RegistryLookup: Send + Sync {
    async fn lookup(&self, ip: &str) -> std::result::Result<RegistryRecord, RegistryError>;
}

/// RDAP client bound to one base URL; queries `<base>/ip/<ip>`.
#[derive(Debug, Clone)]
pub struct RdapClient {
    http: Client,
    base_url: Url,
    timeout: Duration,
}

impl RdapClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| IntelError::InvalidRegistryUrl(format!("{}: {}", base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(IntelError::InvalidRegistryUrl(format!(
                "{}: not a hierarchical URL",
                base_url
            )));
        }

        let http = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            http,
            base_url: parsed,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the lookup URL, appending the IP as one encoded path segment.
    pub fn lookup_url(&self, ip: &str) -> Url {
        let mut url = self.base_url.clone();
        // Cannot fail: hierarchical base checked in `new`.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("ip").push(ip);
        }
        url
    }
}

#[async_trait]
impl RegistryLookup for RdapClient {
    #[instrument(skip(self), fields(ip = %ip))]
    async fn lookup(&self, ip: &str) -> std::result::Result<RegistryRecord, RegistryError> {
        if ip.is_empty() {
            return Err(RegistryError::lookup_failed("no IP address to look up"));
        }

        let url = self.lookup_url(ip);
        debug!(url = %url, "Querying RDAP");

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/rdap+json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::lookup_failed(format!(
                "RDAP query failed with status {}",
                status
            )));
        }

        let body = response.bytes().await.map_err(transport_error)?;
        let rdap: RdapResponse = serde_json::from_slice(&body).map_err(|e| {
            RegistryError::lookup_failed(format!("RDAP response is not valid JSON: {}", e))
        })?;

        Ok(RegistryRecord::from_response(rdap, Utc::now()))
    }
}

fn transport_error(err: reqwest::Error) -> RegistryError {
    if err.is_timeout() {
        RegistryError::transport_failure(format!("RDAP query timed out: {}", err))
    } else {
        RegistryError::transport_failure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdap::RegistryErrorKind;

    #[test]
    fn test_lookup_url_without_trailing_slash() {
        let client = RdapClient::new("https://rdap.org").unwrap();
        assert_eq!(client.lookup_url("8.8.8.8").as_str(), "https://rdap.org/ip/8.8.8.8");
    }

    #[test]
    fn test_lookup_url_keeps_base_path() {
        let client = RdapClient::new("https://rdap.example.net/rdap/").unwrap();
        assert_eq!(
            client.lookup_url("2001:db8::1").as_str(),
            "https://rdap.example.net/rdap/ip/2001:db8::1"
        );
    }

    #[test]
    fn test_lookup_url_encodes_path_characters() {
        let client = RdapClient::new("https://rdap.org").unwrap();
        assert_eq!(
            client.lookup_url("1.2.3.4/../admin").as_str(),
            "https://rdap.org/ip/1.2.3.4%2F..%2Fadmin"
        );
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        assert!(matches!(
            RdapClient::new("not a url"),
            Err(IntelError::InvalidRegistryUrl(_))
        ));
        assert!(matches!(
            RdapClient::new("mailto:rdap@example.net"),
            Err(IntelError::InvalidRegistryUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_ip_fails_without_network() {
        let client = RdapClient::new("http://127.0.0.1:9").unwrap();
        let err = client.lookup("").await.unwrap_err();
        assert_eq!(err.kind, RegistryErrorKind::LookupFailed);
    }
}
