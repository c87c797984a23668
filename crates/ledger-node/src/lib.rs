//! HTTP host for `ledger-core`: peer-facing routes, an HTTP chain fetcher and
//! the background reconciliation loop.
pub mod config;
mod constants;
pub mod fetcher;
pub mod routes;

use ledger_core::LedgerService;
use std::{sync::Arc, time::Duration};
use std::future::Future;
use tracing::{debug, error, info};

pub use config::Args;
pub use fetcher::HttpChainFetcher;
pub use routes::{router, AppState};

/// Reconciles with every known peer each `interval`, forever.
pub async fn sync_loop(service: Arc<LedgerService>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if service.reconcile().await {
            info!("background sync adopted a longer chain");
        } else {
            debug!("background sync kept the local chain");
        }
    }
}

/// Resolves on Ctrl+C. If the handler cannot be installed the node keeps
/// serving until it is killed instead of shutting down at once.
pub async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await
}

async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("shutting down"),
        Err(err) => {
            error!(error = %err, "cannot listen for Ctrl+C, serving until killed");
            std::future::pending::<()>().await
        }
    }
}
