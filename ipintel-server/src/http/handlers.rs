use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use ipintel_core::{project, project_invalidation, Endpoint, IntelError, Projection};

use super::edge::Edge;
use super::error::ApiError;
use super::state::AppState;

/// Query flag that skips both the cache read and the cache write. Present
/// with or without a value.
const BYPASS_FLAG: &str = "nocache";

/// A projected view rendered as a 200 response.
pub struct View(pub Projection);

impl IntoResponse for View {
    fn into_response(self) -> Response {
        let headers = self.0.headers();
        let mut response = self.0.body.into_response();
        let map = response.headers_mut();
        for (name, value) in headers {
            if let Ok(value) = HeaderValue::from_str(&value) {
                map.insert(name, value);
            }
        }
        response
    }
}

/// `GET /ip`: requester IP, from edge context only.
pub async fn client_ip(Edge(edge): Edge) -> View {
    View(project(Endpoint::Ip(&edge)))
}

/// `GET /isp`: AS organization, from edge context only.
pub async fn client_isp(Edge(edge): Edge) -> View {
    View(project(Endpoint::Isp(&edge)))
}

/// `POST /invalidate`: drops the cached record for the body's `ip`, or for
/// the requester when none is named.
///
/// A body that cannot be read (including one over the size limit) is
/// rejected like any other malformed body.
pub async fn invalidate(
    State(state): State<Arc<AppState>>,
    Edge(edge): Edge,
    body: Result<Bytes, BytesRejection>,
) -> Result<View, ApiError> {
    let body = body
        .map_err(|rejection| IntelError::MalformedInvalidationRequest(rejection.body_text()))?;
    let invalidation = state.invalidator.invalidate(&body, edge.client_ip()).await?;
    Ok(View(project_invalidation(&invalidation)))
}

/// `GET <any other path>`: full merged record for the requester.
pub async fn full_record(
    State(state): State<Arc<AppState>>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
    Edge(edge): Edge,
) -> Result<View, ApiError> {
    if method != Method::GET && method != Method::HEAD {
        return Err(ApiError::MethodNotAllowed);
    }

    let ip = edge.client_ip().unwrap_or_default().to_string();
    // Without a requester IP there is nothing worth caching under.
    let bypass_cache = params.contains_key(BYPASS_FLAG) || ip.is_empty();

    let record = state.enricher.enrich(&ip, &edge, bypass_cache).await;
    Ok(View(project(Endpoint::Full(&record))))
}
