use crate::constants::{DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_LISTEN};
use clap::Parser;
use ledger_core::{constants::DEFAULT_DIFFICULTY, LedgerConfig};
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "ledger-node")]
#[command(about = "Proof-of-work ledger node speaking the /get_chain peer protocol")]
pub struct Args {
    /// Address to listen on, e.g. 127.0.0.1:5000
    #[arg(long, default_value = DEFAULT_LISTEN)]
    pub listen: String,

    /// Leading zero hex characters required of every proof digest
    #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
    pub difficulty: usize,

    /// Peer to register at startup (repeatable), e.g. http://127.0.0.1:5001
    #[arg(long = "peer")]
    pub peers: Vec<String>,

    /// Seconds between background reconciliation passes; 0 disables them
    #[arg(long, default_value_t = 0)]
    pub sync_interval_secs: u64,

    /// Per-request timeout when fetching a peer's chain
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    pub fetch_timeout_secs: u64,
}

impl Args {
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig::with_difficulty(self.difficulty)
    }

    pub fn sync_interval(&self) -> Option<Duration> {
        (self.sync_interval_secs > 0).then(|| Duration::from_secs(self.sync_interval_secs))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
