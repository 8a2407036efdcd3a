use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use ipintel_core::EdgeContext;

use super::state::AppState;

/// Supplies per-request edge context (requester IP, geolocation, AS data).
pub trait EdgeContextProvider: Send + Sync {
    fn context(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> EdgeContext;
}

/// Reads edge context from headers set by a CDN or edge proxy.
///
/// | field | header |
/// |---|---|
/// | ip | `cf-connecting-ip`, first `x-forwarded-for` hop, `x-real-ip`, then the socket peer |
/// | country / city / region / timezone | `cf-ipcountry` / `cf-ipcity` / `cf-region` / `cf-timezone` |
/// | point of presence | suffix of `cf-ray` after the last `-` |
/// | asn / organization | `x-edge-asn` / `x-edge-as-organization` |
///
/// Only deploy behind a proxy that overwrites these headers; clients can
/// otherwise claim any IP.
#[derive(Debug, Clone, Default)]
pub struct HeaderEdgeContextProvider;

impl EdgeContextProvider for HeaderEdgeContextProvider {
    fn context(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> EdgeContext {
        let ip = header(headers, "cf-connecting-ip")
            .or_else(|| {
                header(headers, "x-forwarded-for")
                    .and_then(|hops| hops.split(',').next().map(|hop| hop.trim().to_string()))
                    .filter(|hop| !hop.is_empty())
            })
            .or_else(|| header(headers, "x-real-ip"))
            .or_else(|| peer.map(|addr| addr.ip().to_string()));

        EdgeContext {
            ip,
            asn: header(headers, "x-edge-asn").and_then(|asn| parse_asn(&asn)),
            organization: header(headers, "x-edge-as-organization"),
            country: header(headers, "cf-ipcountry"),
            city: header(headers, "cf-ipcity"),
            region: header(headers, "cf-region"),
            point_of_presence: header(headers, "cf-ray").and_then(|ray| colo_from_ray(&ray)),
            timezone: header(headers, "cf-timezone"),
        }
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
}

/// `AS13335`, `as13335` and `13335` all parse to 13335.
fn parse_asn(raw: &str) -> Option<u32> {
    let digits = raw
        .strip_prefix("AS")
        .or_else(|| raw.strip_prefix("as"))
        .unwrap_or(raw);
    digits.parse().ok()
}

/// `8a1b2c3d4e5f6789-AMS` → `AMS`.
fn colo_from_ray(ray: &str) -> Option<String> {
    ray.rsplit_once('-')
        .map(|(_, colo)| colo)
        .filter(|colo| !colo.is_empty())
        .map(String::from)
}

/// Extractor running the configured [`EdgeContextProvider`].
pub struct Edge(pub EdgeContext);

impl FromRequestParts<Arc<AppState>> for Edge {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Edge(state.edge_provider.context(&parts.headers, peer)))
    }
}
