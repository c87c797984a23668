use anyhow::Context;
use clap::Parser;
use ledger_core::LedgerService;
use ledger_node::{router, shutdown_signal, sync_loop, AppState, Args, HttpChainFetcher};
use std::{net::SocketAddr, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.ledger_config();
    config.validate()?;

    let fetcher = Arc::new(HttpChainFetcher::new(args.fetch_timeout())?);
    let service = Arc::new(LedgerService::new(config, fetcher));
    for peer in &args.peers {
        service
            .add_node(peer)
            .await
            .with_context(|| format!("registering peer `{peer}`"))?;
    }

    if let Some(interval) = args.sync_interval() {
        info!("reconciling with peers every {interval:?}");
        tokio::spawn(sync_loop(service.clone(), interval));
    }

    let app = router(AppState { service });
    let addr: SocketAddr = args.listen.parse()?;
    info!(difficulty = config.difficulty, "ledger-node listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
