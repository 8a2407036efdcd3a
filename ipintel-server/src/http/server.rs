use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use super::router::build_router;
use super::state::AppState;

/// Run the HTTP server until `shutdown` resolves, then drain in-flight
/// connections.
pub async fn run_http_server(
    state: Arc<AppState>,
    listen: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen).await?;

    tracing::info!(%listen, "HTTP server listening");
    let app = router.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
