//! Longest-valid-chain reconciliation against known peers.
use crate::{
    chain::validate_chain,
    error::FetchError,
    nodes::NodeRegistry,
    Block, Ledger,
};
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A peer's reply to a chain request: `{length, chain}` on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeerChain {
    pub length: u64,
    pub chain: Vec<Block>,
}

/// Capability to pull a peer's full chain. Implementations enforce their own
/// timeouts and surface them as [`FetchError::Unreachable`].
#[async_trait]
pub trait ChainFetcher: Send + Sync {
    async fn fetch_chain(&self, peer: &str) -> Result<PeerChain, FetchError>;
}

/// What one peer returned during a scan.
#[derive(Clone, Debug)]
pub struct PeerOutcome {
    pub peer: String,
    pub result: Result<PeerChain, FetchError>,
}

/// The chain a scan decided to adopt.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub peer: String,
    pub chain: Vec<Block>,
}

/// Queries every peer concurrently. Never fails as a whole; each failure is
/// kept in its peer's outcome.
pub async fn fetch_all<F>(peers: &[String], fetcher: &F) -> Vec<PeerOutcome>
where
    F: ChainFetcher + ?Sized,
{
    join_all(peers.iter().map(|peer| async move {
        let result = fetcher
            .fetch_chain(peer)
            .await
            .and_then(check_reported_length);
        PeerOutcome {
            peer: peer.clone(),
            result,
        }
    }))
    .await
}

fn check_reported_length(reply: PeerChain) -> Result<PeerChain, FetchError> {
    if reply.length != reply.chain.len() as u64 {
        return Err(FetchError::Malformed(format!(
            "reported length {} but sent {} blocks",
            reply.length,
            reply.chain.len()
        )));
    }
    Ok(reply)
}

/// Picks the longest valid chain strictly longer than `local_len`.
///
/// Among equally long winners the earliest outcome is kept, so the local chain
/// also wins ties against every peer.
pub fn select_longest_valid(
    local_len: usize,
    outcomes: Vec<PeerOutcome>,
    difficulty: usize,
) -> Option<Candidate> {
    let mut best = None;
    let mut max_len = local_len as u64;

    for PeerOutcome { peer, result } in outcomes {
        let reply = match result {
            Ok(reply) => reply,
            Err(err) => {
                warn!(%peer, error = %err, "skipping peer");
                continue;
            }
        };
        if reply.length <= max_len {
            debug!(%peer, length = reply.length, max_len, "peer chain not longer");
            continue;
        }
        match validate_chain(&reply.chain, difficulty) {
            Ok(()) => {
                max_len = reply.length;
                best = Some(Candidate {
                    peer,
                    chain: reply.chain,
                });
            }
            Err(violation) => warn!(%peer, %violation, "rejecting peer chain"),
        }
    }
    best
}

/// Scans every registered peer and adopts the longest valid chain, if any is
/// strictly longer than the local one. Returns whether the chain was replaced.
pub async fn reconcile<F>(ledger: &mut Ledger, nodes: &NodeRegistry, fetcher: &F) -> bool
where
    F: ChainFetcher + ?Sized,
{
    let peers: Vec<String> = nodes.iter().map(str::to_owned).collect();
    let outcomes = fetch_all(&peers, fetcher).await;
    match select_longest_valid(ledger.len(), outcomes, ledger.difficulty()) {
        Some(Candidate { peer, chain }) => {
            info!(%peer, length = chain.len(), "adopting peer chain");
            ledger.replace_chain(chain);
            true
        }
        None => false,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::{pow, LedgerConfig};
    use std::collections::HashMap;

    pub const DIFFICULTY: usize = 2;

    /// Serves canned replies keyed by peer location.
    #[derive(Default)]
    pub struct ScriptedFetcher {
        pub replies: HashMap<String, Result<PeerChain, FetchError>>,
    }

    impl ScriptedFetcher {
        pub fn serve(mut self, peer: &str, chain: Vec<Block>) -> Self {
            let reply = PeerChain {
                length: chain.len() as u64,
                chain,
            };
            self.replies.insert(peer.to_string(), Ok(reply));
            self
        }

        pub fn fail(mut self, peer: &str, err: FetchError) -> Self {
            self.replies.insert(peer.to_string(), Err(err));
            self
        }
    }

    #[async_trait]
    impl ChainFetcher for ScriptedFetcher {
        async fn fetch_chain(&self, peer: &str) -> Result<PeerChain, FetchError> {
            self.replies
                .get(peer)
                .cloned()
                .unwrap_or_else(|| Err(FetchError::Unreachable(format!("no route to {peer}"))))
        }
    }

    /// A valid chain of `len` blocks mined at [`DIFFICULTY`].
    pub fn mined_ledger(len: usize) -> Ledger {
        let mut ledger = Ledger::new(LedgerConfig::with_difficulty(DIFFICULTY));
        while ledger.len() < len {
            let amount = ledger.len() as f64;
            ledger.add_transaction("miner", "peer", amount).unwrap();
            let previous = ledger.previous_block().unwrap();
            let proof = pow::solve(previous.proof, DIFFICULTY);
            let hash = previous.hash().unwrap();
            ledger.create_block(proof, hash);
        }
        ledger
    }
}
