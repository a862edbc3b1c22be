use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use workpulse_server::{app_state, seed, store::Store};

#[derive(Debug, Parser)]
#[command(name = "workpulse-server", about = "In-memory stand-in for the workpulse REST API")]
struct Cli {
    /// Address to bind
    #[arg(long, env = "WORKPULSE_BIND", default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Port to listen on
    #[arg(long, env = "WORKPULSE_PORT", default_value = "3720")]
    port: u16,

    /// Start with demo tasks and departments
    #[arg(long)]
    seed: bool,

    /// Make every status update fail, to exercise client rollback
    #[arg(long)]
    fail_status_updates: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let store = if cli.seed {
        seed::demo_store(Utc::now())
    } else {
        Store::new(seed::roster())
    };
    let state = app_state(store);
    if cli.fail_status_updates {
        warn!("status updates will be refused");
        state.set_fail_status_updates(true);
    }

    let addr = SocketAddr::new(cli.bind, cli.port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("workpulse-server listening on http://{addr}/api");

    workpulse_server::serve(listener, state).await
}
