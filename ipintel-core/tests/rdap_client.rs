use std::time::Duration;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use ipintel_core::{RdapClient, RegistryErrorKind, RegistryLookup};
use serde_json::json;

async fn registry(Path(ip): Path<String>, headers: HeaderMap) -> axum::response::Response {
    if headers.get("accept").and_then(|v| v.to_str().ok()) != Some("application/rdap+json") {
        return StatusCode::NOT_ACCEPTABLE.into_response();
    }

    match ip.as_str() {
        "192.0.2.10" => Json(json!({
            "objectClassName": "ip network",
            "handle": "NET-192-0-2-0-1",
            "startAddress": "192.0.2.0",
            "endAddress": "192.0.2.255",
            "name": "TEST-NET-1",
            "type": "IANA SPECIAL USE",
            "entities": [
                {
                    "handle": "IANA",
                    "roles": ["registrant"],
                    "vcardArray": ["vcard", [["fn", {}, "text", "Internet Assigned Numbers Authority"]]]
                },
                {"handle": "IANA-IP-ARIN", "roles": ["abuse", "technical"]}
            ],
            "remarks": [{"title": "Documentation", "description": ["RFC 5737", "Do not route"]}]
        }))
        .into_response(),
        "203.0.113.5" => (StatusCode::OK, "<html>maintenance</html>").into_response(),
        "198.51.100.9" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({})).into_response()
        }
        _ => (StatusCode::NOT_FOUND, Json(json!({"errorCode": 404}))).into_response(),
    }
}

async fn spawn_registry() -> String {
    let router = Router::new().route("/ip/{ip}", get(registry));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn normalizes_successful_lookup() {
    let client = RdapClient::new(&spawn_registry().await).unwrap();

    let record = client.lookup("192.0.2.10").await.unwrap();

    assert_eq!(record.name.as_deref(), Some("TEST-NET-1"));
    assert_eq!(record.network_type.as_deref(), Some("IANA SPECIAL USE"));
    assert_eq!(record.start_address.as_deref(), Some("192.0.2.0"));
    assert_eq!(record.end_address.as_deref(), Some("192.0.2.255"));
    assert_eq!(
        record.entities[0].name.as_deref(),
        Some("Internet Assigned Numbers Authority")
    );
    assert_eq!(record.entities[1].name.as_deref(), Some("IANA-IP-ARIN"));
    assert_eq!(
        record.entity_with_role("abuse").and_then(|e| e.handle.as_deref()),
        Some("IANA-IP-ARIN")
    );
    assert_eq!(record.remarks, vec!["RFC 5737", "Do not route"]);
}

#[tokio::test]
async fn non_success_status_is_lookup_failure() {
    let client = RdapClient::new(&spawn_registry().await).unwrap();

    let err = client.lookup("10.0.0.1").await.unwrap_err();

    assert_eq!(err.kind, RegistryErrorKind::LookupFailed);
    assert!(err.message.contains("404"), "message: {}", err.message);
}

#[tokio::test]
async fn non_json_body_is_lookup_failure() {
    let client = RdapClient::new(&spawn_registry().await).unwrap();

    let err = client.lookup("203.0.113.5").await.unwrap_err();

    assert_eq!(err.kind, RegistryErrorKind::LookupFailed);
}

#[tokio::test]
async fn slow_registry_is_transport_failure() {
    let client = RdapClient::new(&spawn_registry().await)
        .unwrap()
        .with_timeout(Duration::from_millis(200));

    let err = client.lookup("198.51.100.9").await.unwrap_err();

    assert_eq!(err.kind, RegistryErrorKind::TransportFailure);
    assert!(err.message.contains("timed out"), "message: {}", err.message);
}

#[tokio::test]
async fn unreachable_registry_is_transport_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = RdapClient::new(&format!("http://{}", addr)).unwrap();
    let err = client.lookup("192.0.2.10").await.unwrap_err();

    assert_eq!(err.kind, RegistryErrorKind::TransportFailure);
}
