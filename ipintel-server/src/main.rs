mod http;
mod sweeper;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ipintel_core::rdap::DEFAULT_BASE_URL;
use ipintel_core::{MemoryCacheStore, RdapClient};
use tracing_subscriber::EnvFilter;

use crate::http::edge::HeaderEdgeContextProvider;
use crate::http::server::run_http_server;
use crate::http::state::AppState;

#[derive(Parser)]
#[command(name = "ipintel")]
#[command(about = "Edge IP intelligence - merges edge context with cached RDAP ownership data")]
#[command(version)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "IPINTEL_LISTEN", default_value = "0.0.0.0:8080")]
    listen: SocketAddr,

    /// RDAP service base URL; lookups go to <base>/ip/<address>
    #[arg(long, env = "IPINTEL_RDAP_BASE_URL", default_value = DEFAULT_BASE_URL)]
    rdap_base_url: String,

    /// Seconds before a registry lookup is abandoned as a transport failure
    #[arg(long, env = "IPINTEL_REGISTRY_TIMEOUT_SECS", default_value_t = 10)]
    registry_timeout_secs: u64,

    /// Seconds between sweeps of expired cache entries (0 disables sweeping)
    #[arg(long, env = "IPINTEL_SWEEP_INTERVAL_SECS", default_value_t = 300)]
    sweep_interval_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let registry = RdapClient::new(&cli.rdap_base_url)?
        .with_timeout(Duration::from_secs(cli.registry_timeout_secs));
    let cache = Arc::new(MemoryCacheStore::new());

    let state = Arc::new(AppState::new(
        Arc::new(registry),
        cache.clone(),
        Arc::new(HeaderEdgeContextProvider),
    ));

    let sweeper = (cli.sweep_interval_secs > 0).then(|| {
        sweeper::spawn_sweeper(cache, Duration::from_secs(cli.sweep_interval_secs))
    });

    tracing::info!(
        rdap = %cli.rdap_base_url,
        timeout_secs = cli.registry_timeout_secs,
        "Starting ipintel"
    );

    let result = run_http_server(state, cli.listen, shutdown_signal()).await;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    tracing::info!("ipintel stopped");

    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
